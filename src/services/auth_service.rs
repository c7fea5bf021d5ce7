use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entity::{
        revoked_tokens,
        users::{self, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::Caller,
    state::AppState,
};

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub jti: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Lowercase the domain part of an email address; the local part is preserved.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn issue_token(secret: &str, user: &users::Model) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        jti: Uuid::new_v4().to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Validation("Invalid or expired token".into()))?;

    Ok(decoded.claims)
}

/// Exchange valid credentials for a signed token.
pub async fn token_auth(state: &AppState, username: &str, password: &str) -> AppResult<String> {
    let user = Users::find()
        .filter(users::Column::Username.eq(username))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) if u.is_active => u,
        _ => return Err(AppError::Validation("Invalid username or password".into())),
    };

    if !verify_password(password, &user.password_hash) {
        return Err(AppError::Validation("Invalid username or password".into()));
    }

    issue_token(&state.jwt_secret, &user)
}

/// Decode a token and reject it when its `jti` is on the revocation list.
pub async fn verify_token(state: &AppState, token: &str) -> AppResult<Claims> {
    let claims = decode_token(&state.jwt_secret, token)?;
    if is_revoked(state, &claims).await? {
        return Err(AppError::Validation("Token has been revoked".into()));
    }
    Ok(claims)
}

/// Issue a fresh token for the holder of a still-valid one.
pub async fn refresh_token(state: &AppState, token: &str) -> AppResult<String> {
    let claims = verify_token(state, token).await?;
    let user = user_for_claims(state, &claims).await?;
    issue_token(&state.jwt_secret, &user)
}

/// Put the token's `jti` on the revocation list. Revoking twice is a no-op.
pub async fn revoke_token(state: &AppState, token: &str) -> AppResult<()> {
    let claims = decode_token(&state.jwt_secret, token)?;
    let jti = parse_jti(&claims)?;

    if revoked_tokens::Entity::find_by_id(jti)
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Ok(());
    }

    revoked_tokens::ActiveModel {
        jti: Set(jti),
        revoked_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(())
}

/// Resolve a bearer token into the caller it represents. The user row is
/// re-read so deactivation takes effect before the token expires.
pub async fn caller_from_token(state: &AppState, token: &str) -> AppResult<Caller> {
    let claims = verify_token(state, token).await?;
    let user = user_for_claims(state, &claims).await?;
    Ok(Caller {
        user_id: user.id,
        username: user.username,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
    })
}

async fn user_for_claims(state: &AppState, claims: &Claims) -> AppResult<users::Model> {
    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Validation("Invalid user id in token".into()))?;

    let user = Users::find_by_id(user_id).one(&state.orm).await?;
    match user {
        Some(u) if u.is_active => Ok(u),
        _ => Err(AppError::Validation("Invalid or expired token".into())),
    }
}

async fn is_revoked(state: &AppState, claims: &Claims) -> AppResult<bool> {
    let jti = parse_jti(claims)?;
    let hit = revoked_tokens::Entity::find_by_id(jti)
        .one(&state.orm)
        .await?;
    Ok(hit.is_some())
}

fn parse_jti(claims: &Claims) -> AppResult<Uuid> {
    Uuid::parse_str(&claims.jti).map_err(|_| AppError::Validation("Invalid token id".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("Jo.Doe@EXAMPLE.Com"), "Jo.Doe@example.com");
        assert_eq!(normalize_email("plain"), "plain");
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn token_round_trip_carries_identity() {
        let user = users::Model {
            id: 7,
            username: "carol".into(),
            email: "carol@example.com".into(),
            password_hash: "x".into(),
            first_name: None,
            last_name: None,
            is_staff: true,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now().into(),
        };

        let token = issue_token("test-secret", &user).unwrap();
        let claims = decode_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "carol");
        assert!(Uuid::parse_str(&claims.jti).is_ok());

        assert!(decode_token("other-secret", &token).is_err());
    }
}
