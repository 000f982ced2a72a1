use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::auth::{
        AdminRequest, ApproveAdminRequest, ChangePasswordRequest, CreateAdminRequest,
        LoginOutcome, LoginRequest, VerifyEmailRequest,
    },
    entity::{
        Users,
        users::{self, Model as UserModel, Role},
    },
    error::{AppError, AppResult},
    mailer::{Email, Notice},
    middleware::auth::AuthUser,
    models::{DEFAULT_PROFILE_PICTURE, User},
    password::{hash_secret, verify_secret},
    response::ApiResponse,
    services::{auth_service::issue_token, directory::find_user, verification},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";
const CODE_INVALID: &str = "Code has expired or is invalid.";

pub async fn create_admin(
    state: &AppState,
    payload: CreateAdminRequest,
) -> AppResult<ApiResponse<User>> {
    let email_taken = Users::find()
        .filter(users::Column::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::Conflict("Email already exists.".into()));
    }

    let phone_taken = Users::find()
        .filter(users::Column::PhoneNumber.eq(payload.phone_number.as_str()))
        .filter(users::Column::Role.eq(Role::Admin))
        .one(&state.orm)
        .await?;
    if phone_taken.is_some() {
        return Err(AppError::Conflict("Phone number already exists.".into()));
    }

    let password_hash = hash_secret(&payload.password)?;
    let profile_picture = payload
        .profile_picture
        .unwrap_or_else(|| DEFAULT_PROFILE_PICTURE.to_string());

    let admin = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        phone_number: Set(payload.phone_number),
        role: Set(Role::Admin),
        email: Set(Some(payload.email)),
        password_hash: Set(Some(password_hash)),
        profile_picture: Set(Some(profile_picture)),
        address: Set(None),
        is_verified: Set(false),
        is_approved: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(admin_id = %admin.id, "admin signed up");
    Ok(ApiResponse::success(
        "Admin created successfully.",
        User::try_from(admin)?,
        None,
    ))
}

async fn find_admin_by_login(
    state: &AppState,
    payload: &LoginRequest,
) -> AppResult<Option<UserModel>> {
    let mut finder = Users::find().filter(users::Column::Role.eq(Role::Admin));
    finder = match (payload.email.as_deref(), payload.phone_number.as_deref()) {
        (Some(email), _) if !email.trim().is_empty() => {
            finder.filter(users::Column::Email.eq(email.trim()))
        }
        (_, Some(phone)) => finder.filter(users::Column::PhoneNumber.eq(phone.trim())),
        _ => return Ok(None),
    };
    Ok(finder.one(&state.orm).await?)
}

/// Checks credentials. Unverified admins get a fresh code instead of a session.
pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<LoginOutcome> {
    let admin = find_admin_by_login(state, &payload)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let hash = admin
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;
    if !verify_secret(&payload.password, hash)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    if !admin.is_verified {
        let email = admin
            .email
            .as_deref()
            .ok_or_else(|| AppError::inconsistent("admin without email"))?;
        let verification_id = verification::issue(state, admin.id, email, |code| {
            Notice::EmailVerification { code }
        })
        .await?;
        return Ok(LoginOutcome::VerificationSent { verification_id });
    }

    if !admin.is_approved {
        return Err(AppError::Unauthorized("You are not authenticated.".into()));
    }

    let token = issue_token(&state.config, admin.id)?;

    audit::record(
        state,
        admin.id,
        AuditAction::LoginAdmin,
        format!("Admin {} logged in", admin.id),
    )
    .await;

    Ok(LoginOutcome::Authenticated {
        admin_id: admin.id,
        token,
    })
}

pub async fn logout(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<()>> {
    audit::record(
        state,
        user.user_id,
        AuditAction::LogoutAdmin,
        format!("Admin {} logged out", user.user_id),
    )
    .await;
    Ok(ApiResponse::message("You are logged out."))
}

/// Admins who verified their email and wait for approval.
pub async fn list_requests(state: &AppState) -> AppResult<ApiResponse<Vec<AdminRequest>>> {
    let requests = Users::find()
        .filter(users::Column::Role.eq(Role::Admin))
        .filter(users::Column::IsVerified.eq(true))
        .filter(users::Column::IsApproved.eq(false))
        .order_by_asc(users::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|admin| AdminRequest {
            id: admin.id,
            name: admin.name,
            email: admin.email.unwrap_or_default(),
            phone_number: admin.phone_number,
            profile_picture: admin
                .profile_picture
                .unwrap_or_else(|| DEFAULT_PROFILE_PICTURE.to_string()),
        })
        .collect::<Vec<_>>();

    Ok(ApiResponse::success(
        format!("New {} admin requests found.", requests.len()),
        requests,
        None,
    ))
}

async fn notify(state: &AppState, to: Option<&str>, notice: Notice) {
    let Some(to) = to else {
        return;
    };
    let email = Email::notice(&state.config.mail_from, to, &notice);
    if let Err(err) = state.mailer.send(email).await {
        tracing::warn!(error = %err, subject = notice.subject(), "notification mail failed");
    }
}

/// `approve = true` admits a pending admin; `approve = false` removes the admin.
pub async fn approve_or_remove(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ApproveAdminRequest,
) -> AppResult<ApiResponse<()>> {
    let admin = find_user(state, id, Role::Admin).await?;
    if !admin.is_verified {
        return Err(AppError::NotFound("Admin not found.".into()));
    }

    if payload.approve {
        if admin.is_approved {
            return Err(AppError::Conflict("Admin is already approved.".into()));
        }
        let email = admin.email.clone();
        let mut active: users::ActiveModel = admin.into();
        active.is_approved = Set(true);
        active.updated_at = Set(Utc::now().fixed_offset());
        let admin = active.update(&state.orm).await?;

        notify(state, email.as_deref(), Notice::AccountApproved).await;
        audit::record(
            state,
            user.user_id,
            AuditAction::NewAdminAdded,
            format!("{} approved admin {}", user.name, admin.id),
        )
        .await;

        return Ok(ApiResponse::message("New admin has been added."));
    }

    if admin.id == user.user_id {
        return Err(AppError::Conflict("You cannot remove your own account.".into()));
    }

    Users::delete_by_id(admin.id).exec(&state.orm).await?;

    notify(state, admin.email.as_deref(), Notice::AccountRemoved).await;
    audit::record(
        state,
        user.user_id,
        AuditAction::RemoveAdmin,
        format!("{} removed admin {}", user.name, admin.id),
    )
    .await;

    Ok(ApiResponse::message("Admin has been removed."))
}

pub async fn verify_email(
    state: &AppState,
    verification_id: Uuid,
    payload: VerifyEmailRequest,
) -> AppResult<ApiResponse<()>> {
    let record = verification::find_live(state, verification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session is invalid or expired.".into()))?;

    if !verification::matches(&record, &payload.verification_code)? {
        return Err(AppError::Unauthorized(
            "Verification code is incorrect.".into(),
        ));
    }
    verification::consume(state, &record).await?;

    let admin = Users::find_by_id(record.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::inconsistent("verification without user"))?;
    let mut active: users::ActiveModel = admin.into();
    active.is_verified = Set(true);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&state.orm).await?;

    Ok(ApiResponse::message("Your email has been verified."))
}

pub async fn request_password_change(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<()>> {
    verification::issue(state, user.user_id, &user.email, |code| Notice::PasswordReset {
        code,
    })
    .await?;
    Ok(ApiResponse::message("Code has been sent to your email."))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let record = verification::latest_for_user(state, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(CODE_INVALID.into()))?;

    if !verification::matches(&record, &payload.verification_code)? {
        return Err(AppError::Conflict(CODE_INVALID.into()));
    }
    verification::consume(state, &record).await?;

    let admin = find_user(state, user.user_id, Role::Admin).await?;
    let mut active: users::ActiveModel = admin.into();
    active.password_hash = Set(Some(hash_secret(&payload.new_password)?));
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&state.orm).await?;

    audit::record(
        state,
        user.user_id,
        AuditAction::ChangePassword,
        format!("{} changed their password", user.name),
    )
    .await;

    Ok(ApiResponse::message("Your password has been updated."))
}
