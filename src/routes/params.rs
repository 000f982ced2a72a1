use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Offset pagination as accepted by every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SaleListQuery {
    pub product_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub off_set: Option<i64>,
    /// Sort by line total instead of insertion order.
    pub sort_by_price: Option<bool>,
}

impl SaleListQuery {
    pub fn page(&self) -> Page {
        Page::new(self.limit, self.off_set)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductQuery {
    pub fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CategorySortBy {
    #[default]
    FirstToAdd,
    LastToAdd,
    MostProducts,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    pub sort_by: Option<CategorySortBy>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DirectoryQuery {
    pub limit: Option<i64>,
    pub off_set: Option<i64>,
    /// Customers only: rank by number of orders placed.
    pub most_sold_to: Option<bool>,
}

impl DirectoryQuery {
    pub fn page(&self) -> Page {
        Page::new(self.limit, self.off_set)
    }
}
