pub mod mutations;

use async_graphql::{Context, Object, Result};

use super::context::AuthSession;
use super::types::GqlUser;
use crate::middleware::auth::Capability;
use crate::services::user_service;
use crate::state::AppState;

#[derive(Default)]
pub struct CustomerQuery;

#[Object]
impl CustomerQuery {
    /// The authenticated caller's own record.
    async fn me(&self, ctx: &Context<'_>) -> Result<GqlUser> {
        let session = ctx.data_unchecked::<AuthSession>();
        let caller = session.require(Capability::Authenticated)?;

        let state = ctx.data_unchecked::<AppState>();
        let user = user_service::get_user(state, caller.user_id).await?;
        let user = user.ok_or_else(|| async_graphql::Error::new("User does not exist."))?;
        Ok(GqlUser::from(user))
    }
}
