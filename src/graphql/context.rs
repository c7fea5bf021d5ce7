use async_graphql::Result;

use crate::error::PERMISSION_DENIED;
use crate::middleware::auth::{Caller, Capability, ensure_capability};

/// The verified caller behind the current GraphQL execution.
/// `None` when no valid bearer token was presented.
pub struct AuthSession(pub Option<Caller>);

impl AuthSession {
    /// Capability gate. Invoked as the first statement of every gated
    /// resolver; on failure the resolver body never runs and the request
    /// fails with the uniform denial message.
    pub fn require(&self, capability: Capability) -> Result<&Caller> {
        ensure_capability(self.0.as_ref(), capability)
            .map_err(|_| async_graphql::Error::new(PERMISSION_DENIED))?;
        self.0
            .as_ref()
            .ok_or_else(|| async_graphql::Error::new(PERMISSION_DENIED))
    }
}
