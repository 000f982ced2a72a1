use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::users::{CustomerDetail, CustomerSale, DirectoryUserRequest},
    entity::{
        SaleOrders, Users,
        sale_orders::{self, OrderStatus},
        users::{self, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    routes::params::DirectoryQuery,
    services::{directory, sale_service},
    state::AppState,
};

pub async fn create_customer(
    state: &AppState,
    user: &AuthUser,
    payload: DirectoryUserRequest,
) -> AppResult<ApiResponse<User>> {
    let customer = directory::insert(state, Role::Customer, payload).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::AddCustomer,
        format!("{} added customer {}", user.name, customer.name),
    )
    .await;

    Ok(ApiResponse::success("Customer has been added.", customer, None))
}

#[derive(FromRow)]
struct RankedCustomer {
    id: Uuid,
}

pub async fn list_customers(
    state: &AppState,
    query: DirectoryQuery,
) -> AppResult<ApiResponse<Vec<User>>> {
    let page = query.page();

    if !query.most_sold_to.unwrap_or(false) {
        let (customers, total) = directory::page(state, Role::Customer, page).await?;
        let meta = Meta::page(page.limit, page.offset, total);
        return Ok(ApiResponse::success(
            "Customers has been fetched.",
            customers,
            Some(meta),
        ));
    }

    let ranked = sqlx::query_as::<_, RankedCustomer>(
        r#"
        SELECT u.id
        FROM users u
        LEFT JOIN sale_orders so ON so.customer_id = u.id
        WHERE u.role = 'customer'
        GROUP BY u.id, u.created_at
        ORDER BY COUNT(so.id) DESC, u.created_at ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'customer'")
        .fetch_one(&state.pool)
        .await?;

    let ids: Vec<Uuid> = ranked.iter().map(|r| r.id).collect();
    let mut by_id: HashMap<Uuid, users::Model> = Users::find()
        .filter(users::Column::Id.is_in(ids.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let customers = ids
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .map(User::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::page(page.limit, page.offset, total.0);
    Ok(ApiResponse::success(
        "Customers has been fetched.",
        customers,
        Some(meta),
    ))
}

#[derive(FromRow)]
struct CustomerSaleRow {
    sale_order_id: Uuid,
    sale_order_item_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    total_price: i64,
    status: String,
    created_at: DateTime<Utc>,
}

pub async fn get_customer(state: &AppState, id: Uuid) -> AppResult<ApiResponse<CustomerDetail>> {
    let customer = User::try_from(directory::find_user(state, id, Role::Customer).await?)?;

    let rows = sqlx::query_as::<_, CustomerSaleRow>(
        r#"
        SELECT so.id AS sale_order_id, soi.id AS sale_order_item_id,
               p.id AS product_id, p.name AS product_name,
               soi.quantity, soi.total_price, so.status, so.created_at
        FROM sale_orders so
        JOIN sale_order_items soi ON soi.sale_order_id = so.id
        JOIN products p ON p.id = soi.product_id
        WHERE so.customer_id = $1
        ORDER BY so.created_at DESC
        "#,
    )
    .bind(customer.id)
    .fetch_all(&state.pool)
    .await?;

    let sales_data = rows
        .into_iter()
        .map(|row| {
            let status = OrderStatus::from_label(&row.status)
                .ok_or_else(|| AppError::inconsistent("unknown order status"))?;
            Ok(CustomerSale {
                sale_order_id: row.sale_order_id,
                sale_order_item_id: row.sale_order_item_id,
                product_id: row.product_id,
                product_name: row.product_name,
                quantity: row.quantity,
                total_price: row.total_price,
                status,
                created_at: row.created_at,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Customer data has been fetched.",
        CustomerDetail {
            customer,
            total_orders: sales_data.len(),
            sales_data,
        },
        None,
    ))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: DirectoryUserRequest,
) -> AppResult<ApiResponse<User>> {
    let customer = directory::replace(
        state,
        Role::Customer,
        id,
        payload,
        "No changes found to update customer.",
    )
    .await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::UpdateCustomer,
        format!("{} updated customer {}", user.name, customer.name),
    )
    .await;

    Ok(ApiResponse::success("Customer has been updated.", customer, None))
}

/// Deletes the customer with all of their orders. Stock held by orders that
/// were not delivered goes back to the products.
pub async fn delete_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let txn = state.orm.begin().await?;

    let customer = Users::find_by_id(id)
        .filter(users::Column::Role.eq(Role::Customer))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found with this id.".into()))?;

    let orders = SaleOrders::find()
        .filter(sale_orders::Column::CustomerId.eq(customer.id))
        .order_by_asc(sale_orders::Column::CreatedAt)
        .lock_exclusive()
        .all(&txn)
        .await?;

    let mut restored = 0;
    for order in &orders {
        let item = sale_service::item_of(&txn, order).await?;
        sale_service::remove_order(&txn, order, &item).await?;
        if !order.status.is_delivered() {
            restored += item.quantity;
        }
    }

    Users::delete_by_id(customer.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(customer_id = %customer.id, orders = orders.len(), restored, "customer deleted");
    audit::record(
        state,
        user.user_id,
        AuditAction::DeleteCustomer,
        format!(
            "{} deleted customer {} and {} sale orders",
            user.name,
            customer.name,
            orders.len()
        ),
    )
    .await;

    Ok(ApiResponse::message("Customer has been deleted."))
}
