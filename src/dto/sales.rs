use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entity::sale_orders::OrderStatus,
    models::Address,
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub customer_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Invalid quantity."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleRequest {
    #[validate(range(min = 1, message = "Invalid quantity."))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreated {
    pub order_id: Uuid,
}

/// One row of the sales listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub quantity: i32,
    pub total_price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub ordered_quantity: i32,
    pub ordered_price: i64,
    pub order_status: OrderStatus,
    pub remaining_quantity: i32,
    pub product_price: i64,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub phone_number: String,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatusChange {
    pub order_id: Uuid,
    pub status: OrderStatus,
}
