use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod categories;
pub mod doc;
pub mod extract;
pub mod health;
pub mod params;
pub mod products;
pub mod sales;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/sale", sales::router())
        .nest("/product", products::router())
        .nest("/category", categories::router())
        .nest("/user", users::router())
}
