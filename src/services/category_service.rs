use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::categories::{CategoryDetail, CategoryRequest, CategorySummary, ProductSummary},
    entity::{
        Categories, Products,
        categories::{self, Model as CategoryModel},
        products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::{CategoryQuery, CategorySortBy},
    state::AppState,
};

const NOT_FOUND: &str = "No category found with this id.";
const DUPLICATE_NAME: &str = "Category with this name already exists.";

pub async fn find_category(state: &AppState, id: Uuid) -> AppResult<CategoryModel> {
    Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

async fn ensure_unique_name(
    state: &AppState,
    name: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Categories::find().filter(categories::Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(categories::Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_NAME.into()));
    }
    Ok(())
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_unique_name(state, &payload.name, None).await?;

    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::CreateCategory,
        format!("{} created category {}", user.name, category.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Category has been added.",
        Category::from(category),
        None,
    ))
}

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
}

pub async fn list_categories(
    state: &AppState,
    query: CategoryQuery,
) -> AppResult<ApiResponse<Vec<CategorySummary>>> {
    let order = match query.sort_by.unwrap_or_default() {
        CategorySortBy::FirstToAdd => "c.created_at ASC",
        CategorySortBy::LastToAdd => "c.created_at DESC",
        CategorySortBy::MostProducts => "COUNT(p.id) DESC, c.created_at ASC",
    };

    let sql = format!(
        r#"
        SELECT c.id, c.name
        FROM categories c
        LEFT JOIN products p ON p.category_id = c.id
        GROUP BY c.id, c.name, c.created_at
        ORDER BY {order}
        "#
    );
    let items = sqlx::query_as::<_, CategoryRow>(&sql)
        .fetch_all(&state.pool)
        .await?
        .into_iter()
        .map(|row| CategorySummary {
            id: row.id,
            name: row.name,
        })
        .collect();

    Ok(ApiResponse::success("Data has been found.", items, None))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<CategoryDetail>> {
    let category = find_category(state, id).await?;
    let products = Products::find()
        .filter(products::Column::CategoryId.eq(category.id))
        .order_by_asc(products::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| ProductSummary {
            id: p.id,
            name: p.name,
        })
        .collect();

    Ok(ApiResponse::success(
        "Data has been fetched.",
        CategoryDetail {
            category: Category::from(category),
            products,
        },
        None,
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = find_category(state, id).await?;
    if existing.name == payload.name && existing.description == payload.description {
        return Err(AppError::Conflict(
            "No data found to update the category.".into(),
        ));
    }
    if existing.name != payload.name {
        ensure_unique_name(state, &payload.name, Some(id)).await?;
    }

    let mut active: categories::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.description = Set(payload.description);
    active.updated_at = Set(Utc::now().fixed_offset());
    let category = active.update(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::UpdateCategory,
        format!("{} updated category {}", user.name, category.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Category has been updated.",
        Category::from(category),
        None,
    ))
}

/// Refused while any product still belongs to the category.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let category = find_category(state, id).await?;
    let in_use = Products::find()
        .filter(products::Column::CategoryId.eq(category.id))
        .count(&state.orm)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Category is used by {in_use} products and cannot be deleted."
        )));
    }

    Categories::delete_by_id(category.id).exec(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::DeleteCategory,
        format!("{} deleted category {}", user.name, category.name),
    )
    .await;

    Ok(ApiResponse::message("Category has been deleted."))
}
