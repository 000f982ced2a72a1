use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{validate_phone, validate_verification_code};

#[derive(Deserialize, Debug, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    #[validate(length(min = 2, max = 30, message = "Invalid name."))]
    pub name: String,
    #[validate(email(message = "Invalid email."))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long."))]
    pub password: String,
    /// URL of an already uploaded image. A stock avatar is used when absent.
    #[validate(url(message = "Invalid profile picture url."))]
    pub profile_picture: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "login_has_identity"))]
pub struct LoginRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[validate(length(min = 6, message = "Password is required of 6 characters."))]
    pub password: String,
}

fn login_has_identity(req: &LoginRequest) -> Result<(), ValidationError> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if present(&req.email) || present(&req.phone_number) {
        Ok(())
    } else {
        Err(ValidationError::new("identity")
            .with_message("At least one field must be provided.".into()))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub admin_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationPending {
    /// Id to post the emailed code to, at `/user/admin/verifyemail/{id}`.
    pub verification_id: Uuid,
}

/// What a login attempt resolved to.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated { admin_id: Uuid, token: String },
    VerificationSent { verification_id: Uuid },
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[validate(custom(function = "validate_verification_code"))]
    pub verification_code: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAdminRequest {
    pub approve: bool,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "passwords_match"))]
pub struct ChangePasswordRequest {
    #[validate(custom(function = "validate_verification_code"))]
    pub verification_code: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long."))]
    pub new_password: String,
    pub confirm_password: String,
}

fn passwords_match(req: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if req.new_password == req.confirm_password {
        Ok(())
    } else {
        Err(ValidationError::new("confirm_password").with_message("Passwords do not match.".into()))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub profile_picture: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}
