use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use uuid::Uuid;

use crate::{
    dto::users::{CustomerDetail, DirectoryUserRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::{
        admin,
        extract::{ApiPath, ApiQuery, ValidatedJson},
        params::DirectoryQuery,
    },
    services::{customer_service, supplier_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::router())
        .route("/supplier", get(list_suppliers).post(create_supplier))
        .route(
            "/supplier/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/customer", get(list_customers).post(create_customer))
        .route(
            "/customer/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

#[utoipa::path(
    post,
    path = "/user/supplier",
    request_body = DirectoryUserRequest,
    responses(
        (status = 201, description = "Supplier added", body = ApiResponse<User>),
        (status = 409, description = "Phone number in use"),
    ),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<DirectoryUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = supplier_service::create_supplier(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/user/supplier",
    params(DirectoryQuery),
    responses((status = 200, description = "Suppliers, oldest first", body = ApiResponse<Vec<User>>)),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<DirectoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let resp = supplier_service::list_suppliers(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/user/supplier/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier", body = ApiResponse<User>),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = supplier_service::get_supplier(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/user/supplier/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = DirectoryUserRequest,
    responses(
        (status = 200, description = "Supplier updated", body = ApiResponse<User>),
        (status = 404, description = "Supplier not found"),
        (status = 409, description = "No changes or phone number in use"),
    ),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<DirectoryUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = supplier_service::update_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/user/supplier/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier deleted"),
        (status = 409, description = "Supplier still has products"),
    ),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = supplier_service::delete_supplier(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/user/customer",
    request_body = DirectoryUserRequest,
    responses(
        (status = 201, description = "Customer added", body = ApiResponse<User>),
        (status = 409, description = "Phone number in use"),
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<DirectoryUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = customer_service::create_customer(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/user/customer",
    params(DirectoryQuery),
    responses((status = 200, description = "Customers", body = ApiResponse<Vec<User>>)),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<DirectoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let resp = customer_service::list_customers(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/user/customer/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer with sales history", body = ApiResponse<CustomerDetail>),
        (status = 404, description = "Customer not found"),
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<CustomerDetail>>> {
    let resp = customer_service::get_customer(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/user/customer/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = DirectoryUserRequest,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<User>),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "No changes or phone number in use"),
    ),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<DirectoryUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = customer_service::update_customer(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/user/customer/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer and their orders deleted"),
        (status = 404, description = "Customer not found"),
    ),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = customer_service::delete_customer(&state, &user, id).await?;
    Ok(Json(resp))
}
