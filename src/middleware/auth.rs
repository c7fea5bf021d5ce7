use axum::http::{HeaderMap, header};

use crate::error::{AppError, AppResult};

/// The verified identity behind a request, rebuilt from the user row on every
/// call so flag changes take effect without waiting for token expiry.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i32,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Privilege levels, weakest to strongest. Every gated operation declares the
/// minimum level it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    Anonymous,
    Authenticated,
    Staff,
    Superuser,
}

impl Caller {
    pub fn capability(&self) -> Capability {
        if self.is_superuser {
            Capability::Superuser
        } else if self.is_staff {
            Capability::Staff
        } else {
            Capability::Authenticated
        }
    }
}

pub fn ensure_capability(caller: Option<&Caller>, required: Capability) -> AppResult<()> {
    let held = caller.map_or(Capability::Anonymous, Caller::capability);
    if held < required {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

/// Pull the token out of an `Authorization: Bearer` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(is_staff: bool, is_superuser: bool) -> Caller {
        Caller {
            user_id: 1,
            username: "tester".into(),
            is_staff,
            is_superuser,
        }
    }

    #[test]
    fn anonymous_caller_only_passes_anonymous_gate() {
        assert!(ensure_capability(None, Capability::Anonymous).is_ok());
        assert!(ensure_capability(None, Capability::Authenticated).is_err());
        assert!(ensure_capability(None, Capability::Staff).is_err());
        assert!(ensure_capability(None, Capability::Superuser).is_err());
    }

    #[test]
    fn staff_passes_staff_gate_but_not_superuser() {
        let staff = caller(true, false);
        assert!(ensure_capability(Some(&staff), Capability::Staff).is_ok());
        assert!(ensure_capability(Some(&staff), Capability::Superuser).is_err());
    }

    #[test]
    fn superuser_passes_every_gate() {
        let root = caller(false, true);
        for required in [
            Capability::Anonymous,
            Capability::Authenticated,
            Capability::Staff,
            Capability::Superuser,
        ] {
            assert!(ensure_capability(Some(&root), required).is_ok());
        }
    }

    #[test]
    fn bearer_token_requires_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }
}
