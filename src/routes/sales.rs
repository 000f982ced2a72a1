use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::sales::{
        CreateSaleRequest, SaleCreated, SaleDetail, SaleRecord, SaleStatusChange,
        UpdateSaleRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::SaleOrderItem,
    response::ApiResponse,
    routes::{
        extract::{ApiPath, ApiQuery, ValidatedJson},
        params::SaleListQuery,
    },
    services::sale_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/status/{id}", put(toggle_status))
        .route("/{id}", get(get_sale).put(update_sale).delete(delete_sale))
}

#[utoipa::path(
    post,
    path = "/sale",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale order created", body = ApiResponse<SaleCreated>),
        (status = 404, description = "Product or customer not found"),
        (status = 409, description = "Not enough product in stock"),
    ),
    tag = "Sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateSaleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SaleCreated>>)> {
    let resp = sale_service::create_sale(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/sale",
    params(SaleListQuery),
    responses(
        (status = 200, description = "Page of sale items", body = ApiResponse<Vec<SaleRecord>>)
    ),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<SaleListQuery>,
) -> AppResult<Json<ApiResponse<Vec<SaleRecord>>>> {
    let resp = sale_service::list_sales(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/sale/{id}",
    params(("id" = Uuid, Path, description = "Sale order ID")),
    responses(
        (status = 200, description = "Sale order detail", body = ApiResponse<SaleDetail>),
        (status = 404, description = "Sale order not found"),
    ),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<SaleDetail>>> {
    let resp = sale_service::get_sale(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/sale/{id}",
    params(("id" = Uuid, Path, description = "Sale order ID")),
    request_body = UpdateSaleRequest,
    responses(
        (status = 200, description = "Sale order re-quantified", body = ApiResponse<SaleOrderItem>),
        (status = 404, description = "Sale order not found"),
        (status = 409, description = "No change or not enough stock"),
    ),
    tag = "Sales"
)]
pub async fn update_sale(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateSaleRequest>,
) -> AppResult<Json<ApiResponse<SaleOrderItem>>> {
    let resp = sale_service::update_sale(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/sale/{id}",
    params(("id" = Uuid, Path, description = "Sale order ID")),
    responses(
        (status = 200, description = "Sale order deleted"),
        (status = 404, description = "Sale order not found"),
    ),
    tag = "Sales"
)]
pub async fn delete_sale(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = sale_service::delete_sale(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/sale/status/{id}",
    params(("id" = Uuid, Path, description = "Sale order ID")),
    responses(
        (status = 200, description = "Status toggled", body = ApiResponse<SaleStatusChange>),
        (status = 404, description = "Sale order not found"),
    ),
    tag = "Sales"
)]
pub async fn toggle_status(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<SaleStatusChange>>> {
    let resp = sale_service::toggle_status(&state, &user, id).await?;
    Ok(Json(resp))
}
