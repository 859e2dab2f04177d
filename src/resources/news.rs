use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::{
    record_of, translation_inputs, validate_slug, Column, ColumnDefault, EntityDraft, EntityPatch, FieldKind,
    FilterSpec, PublishStatus, Resource, ResourceSchema, SlugSource, Translated, TranslationSchema, PUBLISH_STATUSES,
};
use crate::types::{double_option, Language, SortOrder};

pub static SCHEMA: ResourceSchema = ResourceSchema {
    name: "news",
    label: "News",
    table: "news",
    columns: &[
        Column::new("slug", FieldKind::Text),
        Column::new("featured_image_id", FieldKind::Uuid),
        Column::new("author_id", FieldKind::Uuid),
        Column::with_default("status", FieldKind::Enum(PUBLISH_STATUSES), ColumnDefault::Text("draft")),
        Column::new("published_at", FieldKind::Timestamp),
        Column::with_default("views_count", FieldKind::Int, ColumnDefault::Int(0)),
    ],
    translations: TranslationSchema {
        table: "news_translations",
        foreign_key: "news_id",
        columns: &[
            Column::with_default("title", FieldKind::Text, ColumnDefault::Text("")),
            Column::with_default("content", FieldKind::Text, ColumnDefault::Text("")),
            Column::new("excerpt", FieldKind::Text),
            Column::new("meta_title", FieldKind::Text),
            Column::new("meta_description", FieldKind::Text),
        ],
        required: true,
    },
    children: None,
    slug: Some(SlugSource { translation_field: "title" }),
    author_column: Some("author_id"),
    views_column: Some("views_count"),
    filters: &[FilterSpec { param: "status", column: "status", kind: FieldKind::Enum(PUBLISH_STATUSES) }],
    search_columns: &["title", "content"],
    sort_columns: &["published_at", "created_at", "updated_at", "views_count", "status", "slug"],
    default_sort: ("published_at", SortOrder::Desc),
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct NewsTranslation {
    pub language: Language,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

impl Translated for NewsTranslation {
    fn language(&self) -> Language {
        self.language
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct CreateNews {
    #[validate(length(min = 1, max = 255), custom(function = "validate_slug"))]
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub featured_image_id: Option<Uuid>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    #[serde(default, skip_serializing)]
    pub translations: Vec<NewsTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct NewsTranslationPatch {
    pub language: Language,
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<Option<String>>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<Option<String>>,
}

impl Translated for NewsTranslationPatch {
    fn language(&self) -> Language {
        self.language
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct UpdateNews {
    #[validate(length(min = 1, max = 255), custom(function = "validate_slug"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub featured_image_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Option<DateTime<Utc>>>,
    #[validate(nested)]
    #[serde(default, skip_serializing)]
    pub translations: Option<Vec<NewsTranslationPatch>>,
}

/// Form posts send `""` for untouched optional fields
fn blank_as_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::de::DeserializeOwned,
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(other) => serde_json::from_value(other).map(Some).map_err(serde::de::Error::custom),
    }
}

pub struct NewsArticles;

impl Resource for NewsArticles {
    type Create = CreateNews;
    type Update = UpdateNews;

    fn schema() -> &'static ResourceSchema {
        &SCHEMA
    }

    fn draft(input: CreateNews) -> EntityDraft {
        let mut base = record_of(&input);
        if input.status == PublishStatus::Published && input.published_at.is_none() {
            base.insert("published_at".into(), Value::String(Utc::now().to_rfc3339()));
        }
        EntityDraft {
            base,
            slug: input.slug,
            translations: translation_inputs(&input.translations),
            children: None,
        }
    }

    fn patch(input: UpdateNews) -> EntityPatch {
        EntityPatch {
            base: record_of(&input),
            translations: input.translations.as_deref().map(translation_inputs).unwrap_or_default(),
            children: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publishing_on_create_stamps_published_at() {
        let input: CreateNews = serde_json::from_value(json!({
            "status": "published",
            "translations": [{ "language": "en", "title": "Launch", "content": "Body" }]
        }))
        .unwrap();
        let draft = NewsArticles::draft(input);
        assert!(draft.base["published_at"].is_string());
    }

    #[test]
    fn drafts_have_no_publication_date() {
        let input: CreateNews = serde_json::from_value(json!({
            "translations": [{ "language": "en", "title": "Soon", "content": "Body" }]
        }))
        .unwrap();
        let draft = NewsArticles::draft(input);
        assert_eq!(draft.base["status"], "draft");
        assert!(!draft.base.contains_key("published_at"));
    }

    #[test]
    fn blank_optional_fields_are_ignored() {
        let input: CreateNews = serde_json::from_value(json!({
            "slug": "",
            "featuredImageId": "",
            "translations": [{ "language": "ru", "title": "Новости", "content": "Текст" }]
        }))
        .unwrap();
        assert!(input.slug.is_none());
        assert!(input.featured_image_id.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn content_is_required_per_translation() {
        let input: CreateNews = serde_json::from_value(json!({
            "translations": [{ "language": "en", "title": "Empty", "content": "" }]
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }
}
