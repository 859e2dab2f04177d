use serde_json::Value;
use uuid::Uuid;

use crate::types::SortOrder;

/// Storage type of a column. Drives SQL casts and query-string coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uuid,
    Text,
    Int,
    Bool,
    Timestamp,
    Enum(&'static [&'static str]),
}

impl FieldKind {
    pub fn pg_cast(&self) -> &'static str {
        match self {
            FieldKind::Uuid => "uuid",
            FieldKind::Text | FieldKind::Enum(_) => "text",
            FieldKind::Int => "int4",
            FieldKind::Bool => "bool",
            FieldKind::Timestamp => "timestamptz",
        }
    }

    /// Turn a raw query-string value into a typed JSON value
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        match self {
            FieldKind::Uuid => Uuid::parse_str(raw)
                .map(|id| Value::String(id.to_string()))
                .map_err(|_| "Invalid uuid".to_string()),
            FieldKind::Text | FieldKind::Timestamp => Ok(Value::String(raw.to_string())),
            FieldKind::Int => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "Expected integer".to_string()),
            FieldKind::Bool => match raw {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err("Expected boolean".to_string()),
            },
            FieldKind::Enum(values) => {
                if values.contains(&raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(format!("Invalid enum value. Expected {}", values.join(" | ")))
                }
            }
        }
    }
}

/// Value a column takes when an insert leaves it out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    Null,
    Text(&'static str),
    Int(i64),
    Bool(bool),
}

impl ColumnDefault {
    pub fn to_value(&self) -> Value {
        match self {
            ColumnDefault::Null => Value::Null,
            ColumnDefault::Text(s) => Value::String((*s).to_string()),
            ColumnDefault::Int(i) => Value::from(*i),
            ColumnDefault::Bool(b) => Value::Bool(*b),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: ColumnDefault,
}

impl Column {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, default: ColumnDefault::Null }
    }

    pub const fn with_default(name: &'static str, kind: FieldKind, default: ColumnDefault) -> Self {
        Self { name, kind, default }
    }
}

/// Per-language text rows, unique on `(foreign_key, language)`
#[derive(Debug)]
pub struct TranslationSchema {
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub columns: &'static [Column],
    /// Create payloads must carry at least one translation
    pub required: bool,
}

/// Owned rows replaced wholesale on update (product specs)
#[derive(Debug)]
pub struct ChildSchema {
    pub key: &'static str,
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub columns: &'static [Column],
    pub order_by: &'static str,
}

/// Slug derived from a translation field
#[derive(Debug)]
pub struct SlugSource {
    pub translation_field: &'static str,
}

/// Query-string parameter mapped onto an equality filter
#[derive(Debug)]
pub struct FilterSpec {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub struct ResourceSchema {
    /// Singular name; also the slug fallback
    pub name: &'static str,
    /// Capitalised name used in messages
    pub label: &'static str,
    pub table: &'static str,
    /// Base columns other than `id`, `created_at`, `updated_at`
    pub columns: &'static [Column],
    pub translations: TranslationSchema,
    pub children: Option<ChildSchema>,
    pub slug: Option<SlugSource>,
    /// Column stamped with the acting user's id on create
    pub author_column: Option<&'static str>,
    /// Counter bumped when a published record is read
    pub views_column: Option<&'static str>,
    pub filters: &'static [FilterSpec],
    pub search_columns: &'static [&'static str],
    pub sort_columns: &'static [&'static str],
    pub default_sort: (&'static str, SortOrder),
}

pub const SYSTEM_COLUMNS: &[Column] = &[
    Column::new("id", FieldKind::Uuid),
    Column::new("created_at", FieldKind::Timestamp),
    Column::new("updated_at", FieldKind::Timestamp),
];

impl ResourceSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .chain(SYSTEM_COLUMNS.iter())
            .find(|c| c.name == name)
    }

    pub fn translation_column(&self, name: &str) -> Option<&Column> {
        self.translations.columns.iter().find(|c| c.name == name)
    }

    /// `products` → `Products`, for list messages
    pub fn collection_label(&self) -> String {
        let mut chars = self.table.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn has_slug(&self) -> bool {
        self.slug.is_some()
    }

    /// Resolve a client `sortBy` (snake or camel case) to an allowed column
    pub fn sort_column(&self, requested: &str) -> Option<&'static str> {
        let normalized = crate::api::format::to_snake_case(requested);
        self.sort_columns.iter().copied().find(|c| *c == normalized)
    }

    pub fn default_sort_order(&self) -> SortOrder {
        self.default_sort.1
    }
}
