use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    dto::auth::{
        AdminRequest, ApproveAdminRequest, ChangePasswordRequest, CreateAdminRequest, LoginData,
        LoginOutcome, LoginRequest, VerificationPending, VerifyEmailRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::extract::{ApiPath, ValidatedJson},
    services::{
        admin_service,
        auth_service::{expired_cookie, session_cookie},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/requests", get(list_requests))
        .route("/requests/{id}", put(approve_or_remove))
        .route("/verifyemail/{id}", post(verify_email))
        .route("/requestchangepassword", put(request_change_password))
        .route("/changepassword", put(change_password))
}

#[utoipa::path(
    post,
    path = "/user/admin",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin signed up, pending verification", body = ApiResponse<User>),
        (status = 409, description = "Email or phone number already in use"),
    ),
    security(()),
    tag = "Admin"
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = admin_service::create_admin(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/user/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = ApiResponse<LoginData>),
        (status = 401, description = "Invalid credentials, unapproved, or a verification code was sent", body = ApiResponse<VerificationPending>),
    ),
    security(()),
    tag = "Admin"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Response> {
    let response = match admin_service::login(&state, payload).await? {
        LoginOutcome::Authenticated { admin_id, token } => {
            let jar = jar.add(session_cookie(&state.config, token));
            let body = ApiResponse::success(
                "Admin logged in successfully.",
                LoginData { admin_id },
                None,
            );
            (jar, Json(body)).into_response()
        }
        LoginOutcome::VerificationSent { verification_id } => {
            let body = ApiResponse::error(
                "Verification code has been sent, check email.",
                Some(VerificationPending { verification_id }),
            );
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    };
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/user/admin/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "Admin"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse<()>>)> {
    let resp = admin_service::logout(&state, &user).await?;
    Ok((jar.add(expired_cookie(&state.config)), Json(resp)))
}

#[utoipa::path(
    get,
    path = "/user/admin/requests",
    responses(
        (status = 200, description = "Verified admins awaiting approval", body = ApiResponse<Vec<AdminRequest>>)
    ),
    tag = "Admin"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<AdminRequest>>>> {
    let resp = admin_service::list_requests(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/user/admin/requests/{id}",
    params(("id" = Uuid, Path, description = "Admin ID")),
    request_body = ApproveAdminRequest,
    responses(
        (status = 200, description = "Admin approved or removed"),
        (status = 404, description = "Admin not found"),
        (status = 409, description = "Already approved, or removing yourself"),
    ),
    tag = "Admin"
)]
pub async fn approve_or_remove(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ApproveAdminRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = admin_service::approve_or_remove(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/user/admin/verifyemail/{id}",
    params(("id" = Uuid, Path, description = "Verification ID returned by login")),
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified"),
        (status = 401, description = "Wrong code"),
        (status = 404, description = "Verification expired or unknown"),
    ),
    security(()),
    tag = "Admin"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<VerifyEmailRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = admin_service::verify_email(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/user/admin/requestchangepassword",
    responses((status = 200, description = "Reset code mailed")),
    tag = "Admin"
)]
pub async fn request_change_password(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = admin_service::request_password_change(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/user/admin/changepassword",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 404, description = "No live reset code"),
        (status = 409, description = "Wrong code"),
    ),
    tag = "Admin"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = admin_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}
