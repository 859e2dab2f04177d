use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{ContactSubmission, NewSubmission, NewUser, SubmissionStatus, User, UserPatch};
use crate::resources::{EntityDraft, EntityPatch, ResourceSchema};
use crate::types::{Language, SortOrder};

/// Errors from a [`ContentStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Conflict(String),

    #[error("Referenced record does not exist: {0}")]
    InvalidReference(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => StoreError::Conflict(db.constraint().unwrap_or("unique").to_string()),
                Some("23503") => StoreError::InvalidReference(db.constraint().unwrap_or("foreign key").to_string()),
                _ => StoreError::Internal(err.to_string()),
            },
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Internal(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    Id(Uuid),
    Slug(&'a str),
}

/// Resolved list request against one resource table
#[derive(Debug, Clone)]
pub struct EntityQuery {
    pub language: Language,
    /// Equality filters on base columns, values already typed
    pub filters: Vec<(&'static str, Value)>,
    /// Case-insensitive substring over the language's search columns
    pub search: Option<String>,
    pub sort_column: &'static str,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

/// Persistence handle shared by every service. Constructed once at startup
/// and passed down as `Arc<dyn ContentStore>`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    /// Insert base row, translations and children in one unit. `draft.base`
    /// must already carry the resolved slug for slugged resources.
    async fn insert_entity(&self, schema: &'static ResourceSchema, id: Uuid, draft: EntityDraft) -> StoreResult<()>;

    /// Base row plus translations (only `language` when given) and children
    async fn fetch_entity(
        &self,
        schema: &'static ResourceSchema,
        lookup: Lookup<'_>,
        language: Option<Language>,
    ) -> StoreResult<Option<Value>>;

    /// One page of rows with the requested language's translation, plus the
    /// total number of matching rows
    async fn list_entities(&self, schema: &'static ResourceSchema, query: &EntityQuery) -> StoreResult<(Vec<Value>, i64)>;

    /// Slugs equal to `base` or of the form `base-…`
    async fn existing_slugs(&self, schema: &'static ResourceSchema, base: &str) -> StoreResult<Vec<String>>;

    /// Upsert translations per language, replace children when given, patch
    /// base columns. `NotFound` when the id does not exist.
    async fn update_entity(&self, schema: &'static ResourceSchema, id: Uuid, patch: EntityPatch) -> StoreResult<()>;

    /// Remove the entity with its translations and children
    async fn delete_entity(&self, schema: &'static ResourceSchema, id: Uuid) -> StoreResult<()>;

    async fn increment_counter(&self, schema: &'static ResourceSchema, id: Uuid, column: &'static str) -> StoreResult<()>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// `Conflict` when the email is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<(Vec<User>, i64)>;

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<User>;

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<ContactSubmission>;

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<ContactSubmission>, i64)>;

    async fn update_submission_status(&self, id: Uuid, status: SubmissionStatus) -> StoreResult<ContactSubmission>;

    /// Ratings of approved reviews for one product
    async fn approved_ratings(&self, product_id: Uuid) -> StoreResult<Vec<i32>>;
}
