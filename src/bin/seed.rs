use uuid::Uuid;
use warehouse_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    models::{Address, DEFAULT_PROFILE_PICTURE},
    password::hash_secret,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&create_orm_conn(&pool)).await?;

    let admin_id = ensure_admin(&pool, "admin@warehouse.local", "admin123").await?;
    let category_id = ensure_category(&pool).await?;
    let supplier_id = ensure_directory_user(&pool, "supplier", "Acme Supply", "01700000001").await?;
    let customer_id = ensure_directory_user(&pool, "customer", "Jane Buyer", "01800000001").await?;
    seed_products(&pool, category_id, supplier_id).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Supplier ID: {supplier_id}, Customer ID: {customer_id}"
    );
    Ok(())
}

/// A verified, approved admin that can log in straight away.
async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_secret(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, phone_number, role, email, password_hash,
                           profile_picture, is_verified, is_approved)
        VALUES ($1, 'Seed Admin', '01600000001', 'admin', $2, $3, $4, TRUE, TRUE)
        ON CONFLICT (email) DO UPDATE SET is_verified = TRUE, is_approved = TRUE
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(DEFAULT_PROFILE_PICTURE)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

async fn ensure_category(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, description)
        VALUES ($1, 'Hardware', 'Tools, fasteners and everything else that ships in a crate.')
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

async fn ensure_directory_user(
    pool: &sqlx::PgPool,
    role: &str,
    name: &str,
    phone_number: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE phone_number = $1 AND role = $2")
            .bind(phone_number)
            .bind(role)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let address = Address {
        house: "12".into(),
        street: "Dock Road".into(),
        city: "Portsmouth".into(),
        state: "Hampshire".into(),
        post_code: "12345".into(),
        country: "UK".into(),
    };
    // Bound as text and cast so no JSON codec is needed on the driver side.
    let address = serde_json::to_string(&address)?;

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, phone_number, role, address)
        VALUES ($1, $2, $3, $4, $5::jsonb)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(phone_number)
    .bind(role)
    .bind(address)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    category_id: Uuid,
    supplier_id: Uuid,
) -> anyhow::Result<()> {
    let products = vec![
        ("Claw Hammer", "Forged steel claw hammer with a fibreglass handle.", 1500, 40),
        ("Wood Screws 100", "Box of one hundred zinc plated countersunk wood screws.", 450, 250),
        ("Spirit Level", "Six hundred millimetre aluminium spirit level, three vials.", 2200, 15),
    ];

    for (name, desc, price, quantity) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, quantity, category_id, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price as i64)
        .bind(quantity as i32)
        .bind(category_id)
        .bind(supplier_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
