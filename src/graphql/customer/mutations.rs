use async_graphql::{Context, Object, Result};

use crate::graphql::context::AuthSession;
use crate::graphql::types::{DeleteResult, TokenPayload, UserPayload, VerifyTokenPayload};
use crate::middleware::auth::Capability;
use crate::services::{
    auth_service,
    user_service::{self, NewUser, UserChanges},
};
use crate::state::AppState;

#[derive(Default)]
pub struct CustomerMutation;

#[Object]
impl CustomerMutation {
    /// Create a user. The password is hashed before it is stored and never
    /// leaves the server. Superuser only.
    #[allow(clippy::too_many_arguments)]
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: String,
        password: String,
        first_name: Option<String>,
        last_name: Option<String>,
        is_staff: Option<bool>,
        is_active: Option<bool>,
    ) -> Result<UserPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Superuser)?;

        let state = ctx.data_unchecked::<AppState>();
        let input = NewUser {
            username,
            email,
            password,
            first_name,
            last_name,
            is_staff,
            is_active,
        };
        match user_service::create_user(state, caller, input).await {
            Ok(user) => Ok(UserPayload::ok(user.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(UserPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Partial user update, addressed by username. Superuser only.
    #[allow(clippy::too_many_arguments)]
    async fn edit_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        email: Option<String>,
        password: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        is_staff: Option<bool>,
        is_active: Option<bool>,
    ) -> Result<UserPayload> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Superuser)?;

        let state = ctx.data_unchecked::<AppState>();
        let changes = UserChanges {
            email,
            password,
            first_name,
            last_name,
            is_staff,
            is_active,
        };
        match user_service::edit_user(state, caller, &username, changes).await {
            Ok(user) => Ok(UserPayload::ok(user.into())),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(UserPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Delete a user by username. Superuser only.
    async fn delete_user(&self, ctx: &Context<'_>, username: String) -> Result<DeleteResult> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Superuser)?;

        let state = ctx.data_unchecked::<AppState>();
        match user_service::delete_user(state, caller, &username).await {
            Ok(()) => Ok(DeleteResult::ok()),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(DeleteResult::failure(reason)),
                None => Err(err.into()),
            },
        }
    }
}

/// Token issuance and lifecycle, passed through to the auth service.
#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    /// Exchange credentials for a bearer token.
    async fn token_auth(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<TokenPayload> {
        let state = ctx.data_unchecked::<AppState>();
        match auth_service::token_auth(state, &username, &password).await {
            Ok(token) => Ok(TokenPayload::ok(token)),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(TokenPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Check a token's signature, expiry and revocation status.
    async fn verify_token(&self, ctx: &Context<'_>, token: String) -> Result<VerifyTokenPayload> {
        let state = ctx.data_unchecked::<AppState>();
        match auth_service::verify_token(state, &token).await {
            Ok(claims) => Ok(VerifyTokenPayload::ok(claims.username)),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(VerifyTokenPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Issue a fresh token for the holder of a still-valid one.
    async fn refresh_token(&self, ctx: &Context<'_>, token: String) -> Result<TokenPayload> {
        let state = ctx.data_unchecked::<AppState>();
        match auth_service::refresh_token(state, &token).await {
            Ok(token) => Ok(TokenPayload::ok(token)),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(TokenPayload::failure(reason)),
                None => Err(err.into()),
            },
        }
    }

    /// Permanently revoke a token. Verification rejects it from then on.
    async fn revoke_token(&self, ctx: &Context<'_>, token: String) -> Result<DeleteResult> {
        let state = ctx.data_unchecked::<AppState>();
        match auth_service::revoke_token(state, &token).await {
            Ok(()) => Ok(DeleteResult::ok()),
            Err(err) => match err.failure_reason() {
                Some(reason) => Ok(DeleteResult::failure(reason)),
                None => Err(err.into()),
            },
        }
    }
}
