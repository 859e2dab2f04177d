pub mod auth_service;
pub mod content_service;
pub mod review_stats;
pub mod submission_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthSession, AuthUser, LoginRequest, RefreshRequest, RefreshedToken, RegisterRequest};
pub use content_service::ContentService;
pub use review_stats::{RatingBucket, RatingStats, ReviewStatsService};
pub use submission_service::{StatusUpdate, SubmissionForm, SubmissionService};
pub use user_service::{UpdateUser, UserService};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::error::FieldError;
use crate::utils::PageMeta;

/// Business-level failures. Translated to HTTP by [`crate::error::ApiError`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is inactive")]
    AccountInactive,
    #[error("{0}")]
    InvalidToken(String),
    #[error("{0}")]
    TokenExpired(String),
    #[error("User not found or inactive")]
    UserInactive,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            StoreError::Conflict(constraint) => {
                tracing::warn!("Unique constraint violated: {}", constraint);
                ServiceError::Conflict("A record with the same unique value already exists".to_string())
            }
            StoreError::InvalidReference(constraint) => {
                tracing::warn!("Foreign key violated: {}", constraint);
                ServiceError::field("reference", "Referenced record does not exist")
            }
            StoreError::Unavailable(msg) => ServiceError::Unavailable(msg),
            StoreError::Internal(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => ServiceError::InvalidToken("Invalid token".to_string()),
            AuthError::TokenExpired => ServiceError::TokenExpired("Token expired".to_string()),
            AuthError::TokenGeneration(msg) | AuthError::Hashing(msg) => ServiceError::Internal(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// One page of results. `degraded` is set when the store was unreachable and
/// the page was answered empty instead of failing.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
    pub degraded: bool,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, meta: PageMeta) -> Self {
        Self { items, meta, degraded: false }
    }

    pub fn degraded(page: i64, limit: i64) -> Self {
        Self {
            items: Vec::new(),
            meta: PageMeta::new(page, limit, 0),
            degraded: true,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
            degraded: self.degraded,
        }
    }
}

/// Run a list read, answering an empty page when the store is down
pub(crate) fn degrade<T>(result: ServiceResult<Listing<T>>, page: i64, limit: i64) -> ServiceResult<Listing<T>> {
    match result {
        Err(ServiceError::Unavailable(msg)) => {
            tracing::warn!("Store unavailable, serving empty page: {}", msg);
            Ok(Listing::degraded(page, limit))
        }
        other => other,
    }
}
