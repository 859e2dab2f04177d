use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    record_of, translation_inputs, Column, ColumnDefault, EntityDraft, EntityPatch, FieldKind, FilterSpec, Resource,
    ResourceSchema, Translated, TranslationSchema,
};
use crate::types::{double_option, Language, SortOrder};

pub const REVIEW_STATUSES: &[&str] = &["pending", "approved", "rejected"];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    name: "review",
    label: "Review",
    table: "reviews",
    columns: &[
        Column::new("product_id", FieldKind::Uuid),
        Column::with_default("author_name", FieldKind::Text, ColumnDefault::Text("")),
        Column::new("author_email", FieldKind::Text),
        Column::new("author_avatar_url", FieldKind::Text),
        Column::with_default("rating", FieldKind::Int, ColumnDefault::Int(5)),
        Column::with_default("status", FieldKind::Enum(REVIEW_STATUSES), ColumnDefault::Text("pending")),
        Column::with_default("is_featured", FieldKind::Bool, ColumnDefault::Bool(false)),
    ],
    translations: TranslationSchema {
        table: "review_translations",
        foreign_key: "review_id",
        columns: &[
            Column::new("title", FieldKind::Text),
            Column::with_default("content", FieldKind::Text, ColumnDefault::Text("")),
        ],
        required: true,
    },
    children: None,
    slug: None,
    author_column: None,
    views_column: None,
    filters: &[
        FilterSpec { param: "productId", column: "product_id", kind: FieldKind::Uuid },
        FilterSpec { param: "status", column: "status", kind: FieldKind::Enum(REVIEW_STATUSES) },
        FilterSpec { param: "isFeatured", column: "is_featured", kind: FieldKind::Bool },
    ],
    search_columns: &["title", "content"],
    sort_columns: &["created_at", "updated_at", "rating", "status"],
    default_sort: ("created_at", SortOrder::Desc),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ReviewTranslation {
    pub language: Language,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: String,
}

impl Translated for ReviewTranslation {
    fn language(&self) -> Language {
        self.language
    }
}

/// Public submission; moderation fields are not accepted here
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct CreateReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub author_name: String,
    #[validate(email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[validate(url)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar_url: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    #[serde(default, skip_serializing)]
    pub translations: Vec<ReviewTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ReviewTranslationPatch {
    pub language: Language,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[validate(length(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Translated for ReviewTranslationPatch {
    fn language(&self) -> Language {
        self.language
    }
}

/// Moderation update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct UpdateReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[validate(nested)]
    #[serde(default, skip_serializing)]
    pub translations: Option<Vec<ReviewTranslationPatch>>,
}

pub struct Reviews;

impl Resource for Reviews {
    type Create = CreateReview;
    type Update = UpdateReview;

    fn schema() -> &'static ResourceSchema {
        &SCHEMA
    }

    fn draft(input: CreateReview) -> EntityDraft {
        EntityDraft {
            base: record_of(&input),
            slug: None,
            translations: translation_inputs(&input.translations),
            children: None,
        }
    }

    fn patch(input: UpdateReview) -> EntityPatch {
        EntityPatch {
            base: record_of(&input),
            translations: input.translations.as_deref().map(translation_inputs).unwrap_or_default(),
            children: None,
        }
    }
}
