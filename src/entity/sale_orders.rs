use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Order Placed")]
    #[serde(rename = "Order Placed")]
    Placed,
    #[sea_orm(string_value = "Order Delivered")]
    #[serde(rename = "Order Delivered")]
    Delivered,
}

impl OrderStatus {
    /// The status an explicit status update moves to. The transition is a
    /// plain toggle, so a delivered order can be put back to placed.
    pub fn toggled(self) -> Self {
        match self {
            OrderStatus::Placed => OrderStatus::Delivered,
            OrderStatus::Delivered => OrderStatus::Placed,
        }
    }

    pub fn is_delivered(self) -> bool {
        self == OrderStatus::Delivered
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Placed => "Order Placed",
            OrderStatus::Delivered => "Order Delivered",
        }
    }

    /// Parses the stored label, for rows read outside the ORM.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Order Placed" => Some(OrderStatus::Placed),
            "Order Delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sale_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CustomerId",
        to = "super::users::Column::Id"
    )]
    Customers,
    #[sea_orm(has_one = "super::sale_order_items::Entity")]
    SaleOrderItem,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::sale_order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleOrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
