//! Storage shared by the supplier and customer books.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::users::DirectoryUserRequest,
    entity::{
        Users,
        users::{self, Model as UserModel, Role},
    },
    error::{AppError, AppResult},
    models::{User, address_to_json},
    routes::params::Page,
    state::AppState,
};

fn not_found(role: Role) -> AppError {
    let message = match role {
        Role::Admin => "Admin not found.",
        Role::Customer => "Customer not found with this id.",
        Role::Supplier => "No supplier found with this id.",
    };
    AppError::NotFound(message.into())
}

/// Loads a user that must hold `role`. Any other role reads as missing.
pub async fn find_user(state: &AppState, id: Uuid, role: Role) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .filter(users::Column::Role.eq(role))
        .one(&state.orm)
        .await?
        .ok_or_else(|| not_found(role))
}

async fn ensure_unique_phone(
    state: &AppState,
    phone: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Users::find()
        .filter(users::Column::PhoneNumber.eq(phone))
        .filter(users::Column::Role.ne(Role::Admin));
    if let Some(id) = except {
        finder = finder.filter(users::Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(
            "This phone number is already in use.".into(),
        ));
    }
    Ok(())
}

pub async fn insert(
    state: &AppState,
    role: Role,
    payload: DirectoryUserRequest,
) -> AppResult<User> {
    ensure_unique_phone(state, &payload.phone_number, None).await?;

    let address = address_to_json(&payload.address())?;
    let model = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        phone_number: Set(payload.phone_number),
        role: Set(role),
        email: Set(None),
        password_hash: Set(None),
        profile_picture: Set(None),
        address: Set(Some(address)),
        is_verified: Set(false),
        is_approved: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    User::try_from(model)
}

/// Replaces name, phone and address. A request identical to the stored
/// record is a conflict.
pub async fn replace(
    state: &AppState,
    role: Role,
    id: Uuid,
    payload: DirectoryUserRequest,
    unchanged_message: &str,
) -> AppResult<User> {
    let existing = find_user(state, id, role).await?;
    let current = User::try_from(existing.clone())?;
    let address = payload.address();

    if current.name == payload.name
        && current.phone_number == payload.phone_number
        && current.address() == Some(&address)
    {
        return Err(AppError::Conflict(unchanged_message.to_string()));
    }
    if current.phone_number != payload.phone_number {
        ensure_unique_phone(state, &payload.phone_number, Some(id)).await?;
    }

    let mut active: users::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.phone_number = Set(payload.phone_number);
    active.address = Set(Some(address_to_json(&address)?));
    active.updated_at = Set(Utc::now().fixed_offset());
    let model = active.update(&state.orm).await?;

    User::try_from(model)
}

/// One page of users with `role`, oldest first, plus the total count.
pub async fn page(state: &AppState, role: Role, page: Page) -> AppResult<(Vec<User>, i64)> {
    let finder = Users::find()
        .filter(users::Column::Role.eq(role))
        .order_by_asc(users::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let users = finder
        .limit(page.limit as u64)
        .offset(page.offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok((users, total))
}
