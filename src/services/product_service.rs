use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::products::{CreateProductRequest, ProductView, UpdateProductRequest},
    entity::{
        Products, SaleOrderItems,
        products::{self, Model as ProductModel},
        sale_order_items,
        users::Role,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    services::{category_service::find_category, directory::find_user},
    state::AppState,
};

const NOT_FOUND: &str = "No product found with this id.";
const DUPLICATE_NAME: &str = "Product already exists with this name.";

pub async fn find_product(state: &AppState, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

async fn ensure_unique_name(
    state: &AppState,
    name: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Products::find().filter(products::Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(products::Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_NAME.into()));
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_unique_name(state, &payload.name, None).await?;
    find_category(state, payload.category_id).await?;
    find_user(state, payload.supplier_id, Role::Supplier).await?;

    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        quantity: Set(payload.quantity),
        category_id: Set(payload.category_id),
        supplier_id: Set(payload.supplier_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::AddProduct,
        format!(
            "{} added product {} with {} units",
            user.name, product.name, product.quantity
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Product has been added.",
        Product::from(product),
        None,
    ))
}

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: i64,
    quantity: i32,
    category_id: Uuid,
    category_name: String,
    supplier_id: Uuid,
    supplier_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductView {
    fn from(row: ProductRow) -> Self {
        ProductView {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            category_id: row.category_id,
            category_name: row.category_name,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_VIEW_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.quantity,
           c.id AS category_id, c.name AS category_name,
           s.id AS supplier_id, s.name AS supplier_name,
           p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
    JOIN users s ON s.id = p.supplier_id
"#;

const PRODUCT_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR p.category_id = $1)
      AND ($2::uuid IS NULL OR p.supplier_id = $2)
      AND ($3::bigint IS NULL OR p.price >= $3)
      AND ($4::bigint IS NULL OR p.price <= $4)
"#;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<ProductView>>> {
    let page = query.page();
    if let (Some(min), Some(max)) = (query.price_min, query.price_max) {
        if min > max {
            return Err(AppError::BadRequest(
                "priceMin cannot be greater than priceMax.".into(),
            ));
        }
    }

    let sql = format!(
        "{PRODUCT_VIEW_SELECT} {PRODUCT_FILTER} ORDER BY p.price ASC, p.created_at ASC LIMIT $5 OFFSET $6"
    );
    let items: Vec<ProductView> = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(query.category_id)
        .bind(query.supplier_id)
        .bind(query.price_min)
        .bind(query.price_max)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&state.pool)
        .await?
        .into_iter()
        .map(ProductView::from)
        .collect();

    let count_sql = format!("SELECT COUNT(*) FROM products p {PRODUCT_FILTER}");
    let total: (i64,) = sqlx::query_as(&count_sql)
        .bind(query.category_id)
        .bind(query.supplier_id)
        .bind(query.price_min)
        .bind(query.price_max)
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::page(page.limit, page.offset, total.0);
    Ok(ApiResponse::success(
        format!("{} products has been fetched.", items.len()),
        items,
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductView>> {
    let sql = format!("{PRODUCT_VIEW_SELECT} WHERE p.id = $1");
    let product = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .map(ProductView::from)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;

    Ok(ApiResponse::success(
        "Product data has been fetched.",
        product,
        None,
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_product(state, id).await?;

    let unchanged = existing.name == payload.name
        && existing.description == payload.description
        && existing.price == payload.price
        && existing.category_id == payload.category_id
        && existing.supplier_id == payload.supplier_id;
    if unchanged {
        return Err(AppError::Conflict("No changes found to update product.".into()));
    }

    if existing.category_id != payload.category_id {
        find_category(state, payload.category_id).await?;
    }
    if existing.supplier_id != payload.supplier_id {
        find_user(state, payload.supplier_id, Role::Supplier).await?;
    }
    if existing.name != payload.name {
        ensure_unique_name(state, &payload.name, Some(id)).await?;
    }

    let mut active: products::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.description = Set(payload.description);
    active.price = Set(payload.price);
    active.category_id = Set(payload.category_id);
    active.supplier_id = Set(payload.supplier_id);
    active.updated_at = Set(Utc::now().fixed_offset());
    let product = active.update(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::UpdateProduct,
        format!("{} updated product {}", user.name, product.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Product has been updated.",
        Product::from(product),
        None,
    ))
}

/// Refused while sale items still point at the product.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    let product = find_product(state, id).await?;
    let sold = SaleOrderItems::find()
        .filter(sale_order_items::Column::ProductId.eq(product.id))
        .count(&state.orm)
        .await?;
    if sold > 0 {
        return Err(AppError::Conflict(format!(
            "Product is part of {sold} sale orders and cannot be deleted."
        )));
    }

    Products::delete_by_id(product.id).exec(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::RemoveProduct,
        format!("{} removed product {}", user.name, product.name),
    )
    .await;

    Ok(ApiResponse::message("Product has been deleted."))
}
