use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    child_records, record_of, translation_inputs, validate_slug, ChildSchema, Column, ColumnDefault, EntityDraft,
    EntityPatch, FieldKind, FilterSpec, PublishStatus, Resource, ResourceSchema, SlugSource, Translated,
    TranslationSchema, PUBLISH_STATUSES,
};
use crate::types::{double_option, Language, SortOrder};

pub const PRODUCT_TYPES: &[&str] = &["upper_limb", "lower_limb"];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    name: "product",
    label: "Product",
    table: "products",
    columns: &[
        Column::new("parent_id", FieldKind::Uuid),
        Column::new("type", FieldKind::Enum(PRODUCT_TYPES)),
        Column::new("slug", FieldKind::Text),
        Column::new("sku", FieldKind::Text),
        Column::with_default("status", FieldKind::Enum(PUBLISH_STATUSES), ColumnDefault::Text("draft")),
        Column::new("featured_image_id", FieldKind::Uuid),
        Column::new("created_by", FieldKind::Uuid),
    ],
    translations: TranslationSchema {
        table: "product_translations",
        foreign_key: "product_id",
        columns: &[
            Column::with_default("name", FieldKind::Text, ColumnDefault::Text("")),
            Column::new("description", FieldKind::Text),
            Column::new("short_description", FieldKind::Text),
            Column::new("meta_title", FieldKind::Text),
            Column::new("meta_description", FieldKind::Text),
        ],
        required: true,
    },
    children: Some(ChildSchema {
        key: "specs",
        table: "product_specs",
        foreign_key: "product_id",
        columns: &[
            Column::new("spec_key", FieldKind::Text),
            Column::new("spec_value", FieldKind::Text),
            Column::with_default("display_order", FieldKind::Int, ColumnDefault::Int(0)),
        ],
        order_by: "display_order",
    }),
    slug: Some(SlugSource { translation_field: "name" }),
    author_column: Some("created_by"),
    views_column: None,
    filters: &[
        FilterSpec { param: "type", column: "type", kind: FieldKind::Enum(PRODUCT_TYPES) },
        FilterSpec { param: "status", column: "status", kind: FieldKind::Enum(PUBLISH_STATUSES) },
    ],
    search_columns: &["name", "description"],
    sort_columns: &["created_at", "updated_at", "type", "status", "sku", "slug"],
    default_sort: ("created_at", SortOrder::Desc),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    UpperLimb,
    LowerLimb,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ProductTranslation {
    pub language: Language,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[validate(length(max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

impl Translated for ProductTranslation {
    fn language(&self) -> Language {
        self.language
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ProductSpecInput {
    #[serde(default, skip_serializing)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub spec_key: String,
    #[validate(length(min = 1))]
    pub spec_value: String,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct CreateProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: ProductType,
    #[validate(length(min = 1, max = 255), custom(function = "validate_slug"))]
    #[serde(skip_serializing)]
    pub slug: Option<String>,
    #[validate(length(max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image_id: Option<Uuid>,
    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    #[serde(default, skip_serializing)]
    pub translations: Vec<ProductTranslation>,
    #[validate(nested)]
    #[serde(default, skip_serializing)]
    pub specs: Option<Vec<ProductSpecInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct ProductTranslationPatch {
    pub language: Language,
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub short_description: Option<Option<String>>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<Option<String>>,
}

impl Translated for ProductTranslationPatch {
    fn language(&self) -> Language {
        self.language
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct UpdateProduct {
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProductType>,
    #[validate(length(min = 1, max = 255), custom(function = "validate_slug"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub sku: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub featured_image_id: Option<Option<Uuid>>,
    #[validate(nested)]
    #[serde(default, skip_serializing)]
    pub translations: Option<Vec<ProductTranslationPatch>>,
    #[validate(nested)]
    #[serde(default, skip_serializing)]
    pub specs: Option<Vec<ProductSpecInput>>,
}

pub struct Products;

impl Resource for Products {
    type Create = CreateProduct;
    type Update = UpdateProduct;

    fn schema() -> &'static ResourceSchema {
        &SCHEMA
    }

    fn draft(input: CreateProduct) -> EntityDraft {
        EntityDraft {
            base: record_of(&input),
            slug: input.slug,
            translations: translation_inputs(&input.translations),
            children: input.specs.as_deref().map(child_records),
        }
    }

    fn patch(input: UpdateProduct) -> EntityPatch {
        EntityPatch {
            base: record_of(&input),
            translations: input.translations.as_deref().map(translation_inputs).unwrap_or_default(),
            children: input.specs.as_deref().map(child_records),
        }
    }
}
