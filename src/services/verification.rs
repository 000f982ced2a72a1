//! One-time codes mailed to admins for email verification and password reset.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    entity::{
        EmailVerifications,
        email_verifications::{self, Model as VerificationModel},
    },
    error::{AppError, AppResult},
    mailer::{Email, Notice},
    password::{generate_code, hash_secret, verify_secret},
    state::AppState,
};

fn cutoff(state: &AppState) -> chrono::DateTime<chrono::FixedOffset> {
    (Utc::now() - Duration::minutes(state.config.verification_ttl_minutes)).fixed_offset()
}

/// Creates a fresh code for `user_id`, mails it and returns the record id.
///
/// Earlier codes for the same user and every expired code are dropped first.
pub async fn issue(
    state: &AppState,
    user_id: Uuid,
    email: &str,
    notice: fn(String) -> Notice,
) -> AppResult<Uuid> {
    EmailVerifications::delete_many()
        .filter(
            Condition::any()
                .add(email_verifications::Column::UserId.eq(user_id))
                .add(email_verifications::Column::CreatedAt.lt(cutoff(state))),
        )
        .exec(&state.orm)
        .await?;

    let code = generate_code();
    let record = email_verifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        hashed_code: Set(hash_secret(&code)?),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let message = Email::notice(&state.config.mail_from, email, &notice(code));
    state.mailer.send(message).await?;

    tracing::debug!(verification_id = %record.id, %user_id, "verification code issued");
    Ok(record.id)
}

/// Finds a live verification record by its id.
pub async fn find_live(state: &AppState, id: Uuid) -> AppResult<Option<VerificationModel>> {
    Ok(EmailVerifications::find_by_id(id)
        .filter(email_verifications::Column::CreatedAt.gte(cutoff(state)))
        .one(&state.orm)
        .await?)
}

/// The newest live code issued to `user_id`.
pub async fn latest_for_user(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<Option<VerificationModel>> {
    Ok(EmailVerifications::find()
        .filter(email_verifications::Column::UserId.eq(user_id))
        .filter(email_verifications::Column::CreatedAt.gte(cutoff(state)))
        .order_by_desc(email_verifications::Column::CreatedAt)
        .one(&state.orm)
        .await?)
}

pub fn matches(record: &VerificationModel, code: &str) -> AppResult<bool> {
    verify_secret(code, &record.hashed_code)
}

/// Deletes a used code so it cannot be replayed.
pub async fn consume(state: &AppState, record: &VerificationModel) -> AppResult<()> {
    let result = EmailVerifications::delete_by_id(record.id)
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Session is invalid or expired.".into()));
    }
    Ok(())
}
