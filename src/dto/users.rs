use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{validate_phone, validate_post_code};
use crate::{
    entity::sale_orders::OrderStatus,
    models::{Address, User},
};

/// Body for creating or replacing a supplier or customer.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUserRequest {
    #[validate(length(min = 2, max = 30, message = "Invalid name."))]
    pub name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "Invalid house."))]
    pub house: String,
    #[validate(length(min = 1, message = "Invalid street."))]
    pub street: String,
    #[validate(length(min = 1, message = "Invalid city."))]
    pub city: String,
    #[validate(length(min = 1, message = "Invalid state."))]
    pub state: String,
    #[validate(custom(function = "validate_post_code"))]
    pub post_code: String,
    #[validate(length(min = 1, message = "Invalid country."))]
    pub country: String,
}

impl DirectoryUserRequest {
    pub fn address(&self) -> Address {
        Address {
            house: self.house.clone(),
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            post_code: self.post_code.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSale {
    pub sale_order_id: Uuid,
    pub sale_order_item_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub total_price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: User,
    pub total_orders: usize,
    pub sales_data: Vec<CustomerSale>,
}
