use thiserror::Error;

pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", PERMISSION_DENIED)]
    PermissionDenied,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{entity} does not exist."))
    }

    /// Expected domain failures are reported inside mutation payloads; anything
    /// else aborts the whole request. Returns the payload message for the former.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            AppError::NotFound(reason) | AppError::Validation(reason) => Some(reason),
            _ => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
