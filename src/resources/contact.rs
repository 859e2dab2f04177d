use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    record_of, translation_inputs, Column, ColumnDefault, EntityDraft, EntityPatch, FieldKind, FilterSpec, Resource,
    ResourceSchema, Translated, TranslationSchema,
};
use crate::types::{double_option, Language, SortOrder};

pub const CONTACT_TYPES: &[&str] = &["phone", "email", "address", "social"];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    name: "contact",
    label: "Contact",
    table: "contacts",
    columns: &[
        Column::new("type", FieldKind::Enum(CONTACT_TYPES)),
        Column::with_default("value", FieldKind::Text, ColumnDefault::Text("")),
        Column::with_default("display_order", FieldKind::Int, ColumnDefault::Int(0)),
        Column::with_default("is_active", FieldKind::Bool, ColumnDefault::Bool(true)),
    ],
    translations: TranslationSchema {
        table: "contact_translations",
        foreign_key: "contact_id",
        columns: &[Column::new("label", FieldKind::Text)],
        required: true,
    },
    children: None,
    slug: None,
    author_column: None,
    views_column: None,
    filters: &[
        FilterSpec { param: "type", column: "type", kind: FieldKind::Enum(CONTACT_TYPES) },
        FilterSpec { param: "isActive", column: "is_active", kind: FieldKind::Bool },
    ],
    search_columns: &["label"],
    sort_columns: &["display_order", "type", "created_at", "updated_at"],
    default_sort: ("display_order", SortOrder::Asc),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Phone,
    Email,
    Address,
    Social,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ContactTranslation {
    pub language: Language,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub label: Option<Option<String>>,
}

impl Translated for ContactTranslation {
    fn language(&self) -> Language {
        self.language
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct CreateContact {
    #[serde(rename = "type")]
    pub kind: ContactType,
    #[validate(length(min = 1))]
    pub value: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    #[serde(default, skip_serializing)]
    pub translations: Vec<ContactTranslation>,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct UpdateContact {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContactType>,
    #[validate(length(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[validate(nested)]
    #[serde(default, skip_serializing)]
    pub translations: Option<Vec<ContactTranslation>>,
}

pub struct Contacts;

impl Resource for Contacts {
    type Create = CreateContact;
    type Update = UpdateContact;

    fn schema() -> &'static ResourceSchema {
        &SCHEMA
    }

    fn draft(input: CreateContact) -> EntityDraft {
        EntityDraft {
            base: record_of(&input),
            slug: None,
            translations: translation_inputs(&input.translations),
            children: None,
        }
    }

    fn patch(input: UpdateContact) -> EntityPatch {
        EntityPatch {
            base: record_of(&input),
            translations: input.translations.as_deref().map(translation_inputs).unwrap_or_default(),
            children: None,
        }
    }
}
