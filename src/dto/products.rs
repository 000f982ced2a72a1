use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 3, max = 30, message = "Invalid name."))]
    pub name: String,
    #[validate(length(min = 30, message = "Invalid description."))]
    pub description: String,
    #[validate(range(min = 1, message = "Invalid price."))]
    pub price: i64,
    #[validate(range(min = 0, message = "Invalid quantity."))]
    pub quantity: i32,
    pub category_id: Uuid,
    pub supplier_id: Uuid,
}

/// Catalog fields of a product. Stock is not editable here.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 3, max = 30, message = "Invalid name."))]
    pub name: String,
    #[validate(length(min = 30, message = "Invalid description."))]
    pub description: String,
    #[validate(range(min = 1, message = "Invalid price."))]
    pub price: i64,
    pub category_id: Uuid,
    pub supplier_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i32,
    pub category_id: Uuid,
    pub category_name: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

