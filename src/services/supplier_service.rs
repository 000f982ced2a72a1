use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::users::DirectoryUserRequest,
    entity::{Products, Users, products, users::Role},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    routes::params::DirectoryQuery,
    services::directory,
    state::AppState,
};

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: DirectoryUserRequest,
) -> AppResult<ApiResponse<User>> {
    let supplier = directory::insert(state, Role::Supplier, payload).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::AddSupplier,
        format!("{} added supplier {}", user.name, supplier.name),
    )
    .await;

    Ok(ApiResponse::success("Supplier has been added.", supplier, None))
}

pub async fn list_suppliers(
    state: &AppState,
    query: DirectoryQuery,
) -> AppResult<ApiResponse<Vec<User>>> {
    let page = query.page();
    let (suppliers, total) = directory::page(state, Role::Supplier, page).await?;
    let meta = Meta::page(page.limit, page.offset, total);
    Ok(ApiResponse::success(
        format!("Total {} suppliers found.", suppliers.len()),
        suppliers,
        Some(meta),
    ))
}

pub async fn get_supplier(state: &AppState, id: Uuid) -> AppResult<ApiResponse<User>> {
    let supplier = directory::find_user(state, id, Role::Supplier).await?;
    Ok(ApiResponse::success(
        "Data has been fetched.",
        User::try_from(supplier)?,
        None,
    ))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: DirectoryUserRequest,
) -> AppResult<ApiResponse<User>> {
    let supplier =
        directory::replace(state, Role::Supplier, id, payload, "No changes found to update.")
            .await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::UpdateSupplier,
        format!("{} updated supplier {}", user.name, supplier.name),
    )
    .await;

    Ok(ApiResponse::success("Supplier has been updated.", supplier, None))
}

/// Refused while the supplier still has products.
pub async fn delete_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let supplier = directory::find_user(state, id, Role::Supplier).await?;
    let supplied = Products::find()
        .filter(products::Column::SupplierId.eq(supplier.id))
        .count(&state.orm)
        .await?;
    if supplied > 0 {
        return Err(AppError::Conflict(format!(
            "Supplier has {supplied} products and cannot be deleted."
        )));
    }

    Users::delete_by_id(supplier.id).exec(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::DeleteSupplier,
        format!("{} deleted supplier {}", user.name, supplier.name),
    )
    .await;

    Ok(ApiResponse::message("Supplier has been deleted."))
}
