use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::sales::{
        CreateSaleRequest, SaleCreated, SaleDetail, SaleRecord, SaleStatusChange,
        UpdateSaleRequest,
    },
    entity::{
        Categories, Products, SaleOrderItems, SaleOrders, Users,
        sale_order_items::{self, Model as SaleOrderItemModel},
        sale_orders::{self, Model as SaleOrderModel, OrderStatus},
        users::{self, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, SaleOrderItem, User},
    response::{ApiResponse, Meta},
    routes::params::SaleListQuery,
    services::stock_ledger,
    state::AppState,
};

const ORDER_NOT_FOUND: &str = "Sale order not found with this id.";

/// Inserts the order and its item and takes the stock, inside `txn`.
pub async fn commit_sale(
    txn: &DatabaseTransaction,
    payload: &CreateSaleRequest,
) -> AppResult<(SaleOrderModel, SaleOrderItemModel)> {
    // Customer before product, the same order customer deletion locks in.
    let customer = Users::find_by_id(payload.customer_id)
        .filter(users::Column::Role.eq(Role::Customer))
        .lock_shared()
        .one(txn)
        .await?;

    let product = Products::find_by_id(payload.product_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found with this id.".into()))?;

    let delta = stock_ledger::reserve(product.quantity, payload.quantity)?;

    customer.ok_or_else(|| AppError::NotFound("Customer not found with this id.".into()))?;

    let total_price = stock_ledger::line_total(product.price, payload.quantity)?;

    let order = sale_orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(payload.customer_id),
        status: Set(OrderStatus::Placed),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(txn)
    .await?;

    let item = sale_order_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        sale_order_id: Set(order.id),
        product_id: Set(product.id),
        quantity: Set(payload.quantity),
        total_price: Set(total_price),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(txn)
    .await?;

    stock_ledger::apply(txn, product.id, delta).await?;

    Ok((order, item))
}

/// Re-quantifies the order's item at the current product price, inside `txn`.
pub async fn commit_update(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    quantity: i32,
) -> AppResult<SaleOrderItemModel> {
    let order = SaleOrders::find_by_id(order_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;

    let item = item_of(txn, &order).await?;

    let product = Products::find_by_id(item.product_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::inconsistent("sale item without product"))?;

    let delta = stock_ledger::rebalance(product.quantity, item.quantity, quantity)?;
    let total_price = stock_ledger::line_total(product.price, quantity)?;

    let mut active: sale_order_items::ActiveModel = item.into();
    active.quantity = Set(quantity);
    active.total_price = Set(total_price);
    active.updated_at = Set(Utc::now().fixed_offset());
    let item = active.update(txn).await?;

    stock_ledger::apply(txn, product.id, delta).await?;

    Ok(item)
}

/// Removes the order and its item, returning stock unless it was delivered.
pub async fn commit_delete(
    txn: &DatabaseTransaction,
    order_id: Uuid,
) -> AppResult<(SaleOrderModel, SaleOrderItemModel)> {
    let order = SaleOrders::find_by_id(order_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;

    let item = item_of(txn, &order).await?;
    remove_order(txn, &order, &item).await?;
    Ok((order, item))
}

/// Shared by sale deletion and customer deletion.
pub(crate) async fn remove_order(
    txn: &DatabaseTransaction,
    order: &SaleOrderModel,
    item: &SaleOrderItemModel,
) -> AppResult<()> {
    let delta = stock_ledger::release(order.status, item.quantity);
    if delta > 0 {
        Products::find_by_id(item.product_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| AppError::inconsistent("sale item without product"))?;
        stock_ledger::apply(txn, item.product_id, delta).await?;
    }

    SaleOrderItems::delete_by_id(item.id).exec(txn).await?;
    SaleOrders::delete_by_id(order.id).exec(txn).await?;
    Ok(())
}

pub(crate) async fn item_of(
    txn: &DatabaseTransaction,
    order: &SaleOrderModel,
) -> AppResult<SaleOrderItemModel> {
    SaleOrderItems::find()
        .filter(sale_order_items::Column::SaleOrderId.eq(order.id))
        .one(txn)
        .await?
        .ok_or_else(|| AppError::inconsistent("sale order without item"))
}

pub async fn create_sale(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSaleRequest,
) -> AppResult<ApiResponse<SaleCreated>> {
    let txn = state.orm.begin().await?;
    let (order, item) = commit_sale(&txn, &payload).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, product_id = %item.product_id, quantity = item.quantity, "sale created");
    audit::record(
        state,
        user.user_id,
        AuditAction::CreateSale,
        format!(
            "{} created sale order {} of {} units of product {}",
            user.name, order.id, item.quantity, item.product_id
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Sale order created successfully.",
        SaleCreated { order_id: order.id },
        None,
    ))
}

pub async fn update_sale(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: UpdateSaleRequest,
) -> AppResult<ApiResponse<SaleOrderItem>> {
    let txn = state.orm.begin().await?;
    let item = commit_update(&txn, order_id, payload.quantity).await?;
    txn.commit().await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::UpdateSale,
        format!(
            "{} changed sale order {} to {} units",
            user.name, order_id, item.quantity
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Sale order updated successfully.",
        SaleOrderItem::from(item),
        None,
    ))
}

pub async fn delete_sale(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let txn = state.orm.begin().await?;
    let (order, item) = commit_delete(&txn, order_id).await?;
    txn.commit().await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::DeleteSale,
        format!(
            "{} deleted sale order {} ({}, {} units)",
            user.name,
            order.id,
            order.status.label(),
            item.quantity
        ),
    )
    .await;

    Ok(ApiResponse::message("Sale order deleted successfully."))
}

/// Flips the status of a locked order, inside `txn`.
pub async fn commit_toggle(
    txn: &DatabaseTransaction,
    order_id: Uuid,
) -> AppResult<SaleOrderModel> {
    let order = SaleOrders::find_by_id(order_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;

    let status = order.status.toggled();
    let mut active: sale_orders::ActiveModel = order.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now().fixed_offset());
    Ok(active.update(txn).await?)
}

/// Flips the status. No stock moves either way.
pub async fn toggle_status(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<SaleStatusChange>> {
    let txn = state.orm.begin().await?;
    let order = commit_toggle(&txn, order_id).await?;
    txn.commit().await?;
    let status = order.status;

    audit::record(
        state,
        user.user_id,
        AuditAction::UpdateSaleStatus,
        format!(
            "{} set sale order {} to {}",
            user.name,
            order.id,
            status.label()
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Sale order status updated successfully.",
        SaleStatusChange {
            order_id: order.id,
            status: order.status,
        },
        None,
    ))
}

#[derive(FromRow)]
struct SaleRow {
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    customer_id: Uuid,
    customer_name: String,
    quantity: i32,
    total_price: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for SaleRecord {
    type Error = AppError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_label(&row.status)
            .ok_or_else(|| AppError::inconsistent("unknown order status"))?;
        Ok(SaleRecord {
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            quantity: row.quantity,
            total_price: row.total_price,
            status,
            created_at: row.created_at,
        })
    }
}

pub async fn list_sales(
    state: &AppState,
    query: SaleListQuery,
) -> AppResult<ApiResponse<Vec<SaleRecord>>> {
    let page = query.page();
    let sort_by_price = query.sort_by_price.unwrap_or(false);

    let rows = sqlx::query_as::<_, SaleRow>(
        r#"
        SELECT so.id AS order_id, p.id AS product_id, p.name AS product_name,
               c.id AS customer_id, c.name AS customer_name,
               soi.quantity, soi.total_price, so.status, soi.created_at
        FROM sale_order_items soi
        JOIN sale_orders so ON so.id = soi.sale_order_id
        JOIN products p ON p.id = soi.product_id
        JOIN users c ON c.id = so.customer_id
        WHERE ($1::uuid IS NULL OR soi.product_id = $1)
        ORDER BY CASE WHEN $2 THEN soi.total_price END ASC, soi.created_at ASC, soi.id ASC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(query.product_id)
    .bind(sort_by_price)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sale_order_items WHERE ($1::uuid IS NULL OR product_id = $1)",
    )
    .bind(query.product_id)
    .fetch_one(&state.pool)
    .await?;

    let items = rows
        .into_iter()
        .map(SaleRecord::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::page(page.limit, page.offset, total.0);
    Ok(ApiResponse::success("Sales data fetched successfully.", items, Some(meta)))
}

pub async fn get_sale(state: &AppState, order_id: Uuid) -> AppResult<ApiResponse<SaleDetail>> {
    let order = SaleOrders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.into()))?;

    let item = SaleOrderItems::find()
        .filter(sale_order_items::Column::SaleOrderId.eq(order.id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::inconsistent("sale order without item"))?;

    let product = Products::find_by_id(item.product_id)
        .one(&state.orm)
        .await?
        .map(Product::from)
        .ok_or_else(|| AppError::inconsistent("sale item without product"))?;

    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::inconsistent("product without category"))?;

    let customer = Users::find_by_id(order.customer_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::inconsistent("sale order without customer"))?;
    let customer = User::try_from(customer)?;

    let detail = SaleDetail {
        order_id: order.id,
        product_id: product.id,
        product_name: product.name,
        category_id: category.id,
        category_name: category.name,
        ordered_quantity: item.quantity,
        ordered_price: item.total_price,
        order_status: order.status,
        remaining_quantity: product.quantity,
        product_price: product.price,
        customer_id: customer.id,
        customer_name: customer.name.clone(),
        phone_number: customer.phone_number.clone(),
        address: customer.address().cloned(),
        created_at: order.created_at.with_timezone(&Utc),
    };

    Ok(ApiResponse::success("Sale order fetched successfully.", detail, None))
}
