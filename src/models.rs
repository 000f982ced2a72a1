use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        categories::Model as CategoryModel,
        products::Model as ProductModel,
        sale_order_items::Model as SaleOrderItemModel,
        users::{Model as UserModel, Role},
    },
    error::AppError,
};

pub const DEFAULT_PROFILE_PICTURE: &str = "https://static.vecteezy.com/system/resources/thumbnails/009/292/244/small/default-avatar-icon-of-social-media-user-vector.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub house: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub post_code: String,
    pub country: String,
}

/// Role-specific part of a user record.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Admin {
        email: String,
        #[serde(rename = "profilePicture")]
        profile_picture: String,
        #[serde(rename = "isVerified")]
        is_verified: bool,
        #[serde(rename = "isApproved")]
        is_approved: bool,
    },
    Customer {
        address: Address,
    },
    Supplier {
        address: Address,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn address(&self) -> Option<&Address> {
        match &self.profile {
            Profile::Customer { address } | Profile::Supplier { address } => Some(address),
            Profile::Admin { .. } => None,
        }
    }
}

impl TryFrom<UserModel> for User {
    type Error = AppError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let profile = match model.role {
            Role::Admin => Profile::Admin {
                email: model
                    .email
                    .ok_or_else(|| AppError::inconsistent("admin without email"))?,
                profile_picture: model
                    .profile_picture
                    .unwrap_or_else(|| DEFAULT_PROFILE_PICTURE.to_string()),
                is_verified: model.is_verified,
                is_approved: model.is_approved,
            },
            Role::Customer => Profile::Customer {
                address: address_from_json(model.address)?,
            },
            Role::Supplier => Profile::Supplier {
                address: address_from_json(model.address)?,
            },
        };
        Ok(User {
            id: model.id,
            name: model.name,
            phone_number: model.phone_number,
            profile,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

fn address_from_json(value: Option<serde_json::Value>) -> Result<Address, AppError> {
    let value = value.ok_or_else(|| AppError::inconsistent("directory user without address"))?;
    serde_json::from_value(value).map_err(|e| AppError::Internal(e.into()))
}

pub fn address_to_json(address: &Address) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(address).map_err(|e| AppError::Internal(e.into()))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Category {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i32,
    pub category_id: Uuid,
    pub supplier_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
            category_id: model.category_id,
            supplier_id: model.supplier_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleOrderItem {
    pub id: Uuid,
    pub sale_order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SaleOrderItemModel> for SaleOrderItem {
    fn from(model: SaleOrderItemModel) -> Self {
        SaleOrderItem {
            id: model.id,
            sale_order_id: model.sale_order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            total_price: model.total_price,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
