use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    record_of, translation_inputs, Column, ColumnDefault, EntityDraft, EntityPatch, FieldKind, FilterSpec, Resource,
    ResourceSchema, Translated, TranslationSchema,
};
use crate::types::{double_option, Language, SortOrder};

pub static SCHEMA: ResourceSchema = ResourceSchema {
    name: "partner",
    label: "Partner",
    table: "partners",
    columns: &[
        Column::with_default("name", FieldKind::Text, ColumnDefault::Text("")),
        Column::new("logo_id", FieldKind::Uuid),
        Column::new("website_url", FieldKind::Text),
        Column::with_default("display_order", FieldKind::Int, ColumnDefault::Int(0)),
        Column::with_default("is_active", FieldKind::Bool, ColumnDefault::Bool(true)),
    ],
    translations: TranslationSchema {
        table: "partner_translations",
        foreign_key: "partner_id",
        columns: &[Column::new("description", FieldKind::Text)],
        required: true,
    },
    children: None,
    slug: None,
    author_column: None,
    views_column: None,
    filters: &[FilterSpec { param: "isActive", column: "is_active", kind: FieldKind::Bool }],
    search_columns: &["description"],
    sort_columns: &["display_order", "name", "created_at", "updated_at"],
    default_sort: ("display_order", SortOrder::Asc),
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct PartnerTranslation {
    pub language: Language,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl Translated for PartnerTranslation {
    fn language(&self) -> Language {
        self.language
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct CreatePartner {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_id: Option<Uuid>,
    #[validate(url)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    #[serde(default, skip_serializing)]
    pub translations: Vec<PartnerTranslation>,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct UpdatePartner {
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub logo_id: Option<Option<Uuid>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub website_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[validate(nested)]
    #[serde(default, skip_serializing)]
    pub translations: Option<Vec<PartnerTranslation>>,
}

pub struct Partners;

impl Resource for Partners {
    type Create = CreatePartner;
    type Update = UpdatePartner;

    fn schema() -> &'static ResourceSchema {
        &SCHEMA
    }

    fn draft(input: CreatePartner) -> EntityDraft {
        EntityDraft {
            base: record_of(&input),
            slug: None,
            translations: translation_inputs(&input.translations),
            children: None,
        }
    }

    fn patch(input: UpdatePartner) -> EntityPatch {
        EntityPatch {
            base: record_of(&input),
            translations: input.translations.as_deref().map(translation_inputs).unwrap_or_default(),
            children: None,
        }
    }
}
