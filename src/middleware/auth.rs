use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::{
        Users,
        users::{Model as UserModel, Role},
    },
    error::AppError,
    state::AppState,
};

pub const TOKEN_COOKIE: &str = "token";

/// The admin performing the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl AuthUser {
    /// Only verified and approved admins may act.
    pub fn from_admin(user: UserModel) -> Result<Self, AppError> {
        if user.role != Role::Admin || !user.is_verified || !user.is_approved {
            return Err(AppError::unauthorized());
        }
        let email = user.email.ok_or_else(AppError::unauthorized)?;
        Ok(AuthUser {
            user_id: user.id,
            name: user.name,
            email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

pub fn decode_subject(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::unauthorized())?;

    Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::unauthorized())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| bearer_token(parts))
            .ok_or_else(AppError::unauthorized)?;

        let user_id = decode_subject(&token, &state.config.jwt_secret)?;

        let user = Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or_else(AppError::unauthorized)?;

        AuthUser::from_admin(user)
    }
}
