//! Resource definitions: one schema plus create/update payloads per content type.
//!
//! Every content type shares the generic CRUD machinery in
//! [`crate::services::ContentService`] and [`crate::handlers::content`]; the
//! modules here only say which columns, translations, filters and sort keys a
//! resource has and how its payloads map onto them.

pub mod contact;
pub mod news;
pub mod partner;
pub mod product;
pub mod query;
pub mod review;
pub mod schema;

pub use query::{parse_language, ListQuery};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::types::Language;

pub use schema::{ChildSchema, Column, ColumnDefault, FieldKind, FilterSpec, ResourceSchema, SlugSource, TranslationSchema};

pub const PUBLISH_STATUSES: &[&str] = &["draft", "published", "archived"];

/// Editorial state shared by products and news
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Column name → value, in storage (snake_case) naming
pub type Record = Map<String, Value>;

/// Text fields for one language
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationInput {
    pub language: Language,
    pub fields: Record,
}

/// Everything needed to insert a new entity
#[derive(Debug, Clone, Default)]
pub struct EntityDraft {
    /// Explicit slug from the payload, if any
    pub slug: Option<String>,
    pub base: Record,
    pub translations: Vec<TranslationInput>,
    pub children: Option<Vec<Record>>,
}

/// Partial update: only keys present are written
#[derive(Debug, Clone, Default)]
pub struct EntityPatch {
    pub base: Record,
    pub translations: Vec<TranslationInput>,
    pub children: Option<Vec<Record>>,
}

/// A translatable content type served under `/api/v1/{path}`
pub trait Resource: Send + Sync + 'static {
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn schema() -> &'static ResourceSchema;

    fn draft(input: Self::Create) -> EntityDraft;

    fn patch(input: Self::Update) -> EntityPatch;
}

/// Implemented by translation payloads so their language can be split off
pub trait Translated: Serialize {
    fn language(&self) -> Language;
}

/// Serialize a payload struct into a storage record, dropping skipped keys
pub fn record_of<T: Serialize>(value: &T) -> Record {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}

pub fn translation_inputs<T: Translated>(items: &[T]) -> Vec<TranslationInput> {
    items
        .iter()
        .map(|item| {
            let mut fields = record_of(item);
            fields.remove("language");
            TranslationInput {
                language: item.language(),
                fields,
            }
        })
        .collect()
}

pub fn child_records<T: Serialize>(items: &[T]) -> Vec<Record> {
    items.iter().map(record_of).collect()
}

/// Custom validator for explicit slugs
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if crate::utils::slug::is_valid(slug) {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("Slug may only contain lowercase letters, digits and single hyphens".into());
        Err(err)
    }
}
