use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use super::auth_service::{hash_password, normalize_email};
use crate::{
    audit::log_audit,
    entity::{
        Users,
        users::{self, Column},
    },
    error::{AppError, AppResult},
    middleware::auth::Caller,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

pub async fn get_user(state: &AppState, user_id: i32) -> AppResult<Option<users::Model>> {
    let user = Users::find_by_id(user_id).one(&state.orm).await?;
    Ok(user)
}

pub async fn find_by_username(state: &AppState, username: &str) -> AppResult<Option<users::Model>> {
    let user = Users::find()
        .filter(Column::Username.eq(username))
        .one(&state.orm)
        .await?;
    Ok(user)
}

pub async fn create_user(
    state: &AppState,
    caller: &Caller,
    input: NewUser,
) -> AppResult<users::Model> {
    let email = normalize_email(&input.email);

    let email_taken = Users::find()
        .filter(Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::Validation("Email is already taken".into()));
    }

    let username_taken = Users::find()
        .filter(Column::Username.eq(input.username.as_str()))
        .one(&state.orm)
        .await?;
    if username_taken.is_some() {
        return Err(AppError::Validation("Username is already taken".into()));
    }

    let password_hash = hash_password(&input.password)?;

    let user = users::ActiveModel {
        id: NotSet,
        username: Set(input.username),
        email: Set(email),
        password_hash: Set(password_hash),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        is_staff: Set(input.is_staff.unwrap_or(false)),
        is_superuser: Set(false),
        is_active: Set(input.is_active.unwrap_or(true)),
        date_joined: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit(state, caller, "user_create", user.id).await;
    Ok(user)
}

/// The target is addressed by username; only supplied fields change. A new
/// email is re-normalized, a new password re-hashed.
pub async fn edit_user(
    state: &AppState,
    caller: &Caller,
    username: &str,
    changes: UserChanges,
) -> AppResult<users::Model> {
    let existing = find_by_username(state, username).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::not_found("User")),
    };

    let user_id = existing.id;
    let mut active: users::ActiveModel = existing.into();
    if let Some(email) = changes.email {
        let email = normalize_email(&email);
        let taken = Users::find()
            .filter(Column::Email.eq(email.as_str()))
            .filter(Column::Id.ne(user_id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Validation("Email is already taken".into()));
        }
        active.email = Set(email);
    }
    if let Some(password) = changes.password {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(first_name) = changes.first_name {
        active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = changes.last_name {
        active.last_name = Set(Some(last_name));
    }
    if let Some(is_staff) = changes.is_staff {
        active.is_staff = Set(is_staff);
    }
    if let Some(is_active) = changes.is_active {
        active.is_active = Set(is_active);
    }

    let user = active.update(&state.orm).await?;

    audit(state, caller, "user_update", user.id).await;
    Ok(user)
}

pub async fn delete_user(state: &AppState, caller: &Caller, username: &str) -> AppResult<()> {
    let existing = find_by_username(state, username).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::not_found("User")),
    };

    Users::delete_by_id(existing.id).exec(&state.orm).await?;

    audit(state, caller, "user_delete", existing.id).await;
    Ok(())
}

async fn audit(state: &AppState, caller: &Caller, action: &str, user_id: i32) {
    if let Err(err) = log_audit(
        &state.pool,
        Some(caller.user_id),
        action,
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}
