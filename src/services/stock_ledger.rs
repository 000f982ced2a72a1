//! Rules for how product stock moves with the sale lifecycle.
//!
//! Every function here returns a signed delta to add to `products.quantity`.
//! The only write is [`apply`], which refuses to take stock below zero even
//! when another transaction got there first.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    entity::{
        products::{Column, Entity as Products},
        sale_orders::OrderStatus,
    },
    error::{AppError, AppResult},
};

pub const NOT_ENOUGH_STOCK: &str = "Not enough product in stock.";
pub const NO_CHANGES: &str = "No changes found to update the order.";

/// Stock taken by a new sale of `requested` units.
pub fn reserve(available: i32, requested: i32) -> AppResult<i32> {
    if requested > available {
        return Err(AppError::Conflict(NOT_ENOUGH_STOCK.into()));
    }
    Ok(-requested)
}

/// Stock moved when a line changes from `current` to `requested` units.
///
/// The units already held by the line count as available to it.
pub fn rebalance(available: i32, current: i32, requested: i32) -> AppResult<i32> {
    if requested == current {
        return Err(AppError::Conflict(NO_CHANGES.into()));
    }
    let increase = i64::from(requested) - i64::from(current);
    if increase > i64::from(available) {
        return Err(AppError::Conflict(format!(
            "Only {available} more units are available in stock."
        )));
    }
    Ok(current - requested)
}

/// Stock returned when an order is removed. Delivered goods stay gone.
pub fn release(status: OrderStatus, quantity: i32) -> i32 {
    if status.is_delivered() { 0 } else { quantity }
}

pub fn line_total(unit_price: i64, quantity: i32) -> AppResult<i64> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| AppError::BadRequest("Order total is too large.".into()))
}

/// Adds `delta` to the product's stock, failing with 409 if the result
/// would be negative.
pub async fn apply<C>(conn: &C, product_id: Uuid, delta: i32) -> AppResult<()>
where
    C: ConnectionTrait,
{
    if delta == 0 {
        return Ok(());
    }

    let result = Products::update_many()
        .col_expr(Column::Quantity, Expr::col(Column::Quantity).add(delta))
        .col_expr(Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(Column::Id.eq(product_id))
        .filter(Expr::expr(Expr::col(Column::Quantity).add(delta)).gte(0))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict(NOT_ENOUGH_STOCK.into()));
    }

    tracing::debug!(%product_id, delta, "stock adjusted");
    Ok(())
}
