#![allow(dead_code)]

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use uuid::Uuid;
use warehouse_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::users::DirectoryUserRequest,
    entity::{categories, products},
    mailer::{Mailer, RecordingMailer},
    middleware::auth::AuthUser,
    services::{customer_service, supplier_service},
    state::AppState,
};

/// Connects to the test database, or returns `None` so the caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<(AppState, RecordingMailer)>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let mailer = RecordingMailer::new();
    let state = AppState::new(
        pool,
        AppConfig::for_database(database_url),
        Arc::new(mailer.clone()) as Arc<dyn Mailer>,
    );
    run_migrations(&state.orm).await?;

    Ok(Some((state, mailer)))
}

/// Tests run in parallel against one database, so every unique value gets a suffix.
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix} {}", &id[..8])
}

pub fn unique_phone() -> String {
    format!("{:011}", Uuid::new_v4().as_u128() % 100_000_000_000)
}

pub fn acting_admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        name: "Test Admin".into(),
        email: "test-admin@warehouse.local".into(),
    }
}

pub fn directory_request(name: &str) -> DirectoryUserRequest {
    DirectoryUserRequest {
        name: name.to_string(),
        phone_number: unique_phone(),
        house: "7".into(),
        street: "Quay Street".into(),
        city: "Bristol".into(),
        state: "Avon".into(),
        post_code: "54321".into(),
        country: "UK".into(),
    }
}

pub async fn create_category(state: &AppState) -> anyhow::Result<Uuid> {
    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(unique("Cat")),
        description: Set("A category created by the integration test suite.".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(category.id)
}

pub async fn create_supplier(state: &AppState, admin: &AuthUser) -> anyhow::Result<Uuid> {
    let resp =
        supplier_service::create_supplier(state, admin, directory_request("Test Supplier")).await?;
    Ok(resp.data.expect("supplier").id)
}

pub async fn create_customer(state: &AppState, admin: &AuthUser) -> anyhow::Result<Uuid> {
    let resp =
        customer_service::create_customer(state, admin, directory_request("Test Customer")).await?;
    Ok(resp.data.expect("customer").id)
}

/// Inserts a product with the given price and stock under a fresh category and supplier.
pub async fn create_product(
    state: &AppState,
    admin: &AuthUser,
    price: i64,
    quantity: i32,
) -> anyhow::Result<Uuid> {
    let category_id = create_category(state).await?;
    let supplier_id = create_supplier(state, admin).await?;
    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(unique("Widget")),
        description: Set("A product created by the integration test suite.".into()),
        price: Set(price),
        quantity: Set(quantity),
        category_id: Set(category_id),
        supplier_id: Set(supplier_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

pub async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    use sea_orm::EntityTrait;
    let product = warehouse_api::entity::Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product exists");
    Ok(product.quantity)
}
