use std::collections::HashMap;

use serde_json::Value;

use super::ResourceSchema;
use crate::database::EntityQuery;
use crate::error::FieldError;
use crate::types::Language;
use crate::utils::{PageRequest, Pagination};

/// List request after query-string validation: what to fetch and how to page it
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub query: EntityQuery,
    pub pagination: Pagination,
}

/// `language` query parameter; absent means English
pub fn parse_language(params: &HashMap<String, String>) -> Result<Language, FieldError> {
    match params.get("language").map(|s| s.trim()) {
        None | Some("") => Ok(Language::default()),
        Some(raw) => raw.parse().map_err(|_| {
            FieldError::new("language", "Invalid enum value. Expected 'en' | 'ru' | 'arm'")
        }),
    }
}

impl ListQuery {
    /// Resolve raw query parameters against a resource's filters and sort keys.
    /// Every invalid parameter is reported, not just the first.
    pub fn parse(schema: &ResourceSchema, params: &HashMap<String, String>) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let raw = PageRequest {
            page: params.get("page").cloned(),
            limit: params.get("limit").cloned(),
            sort_by: params.get("sortBy").cloned(),
            sort_order: params.get("sortOrder").cloned(),
        };
        let (default_sort, default_order) = schema.default_sort;
        let pagination = Pagination::parse(&raw, default_sort, default_order);

        let language = parse_language(params).unwrap_or_else(|e| {
            errors.push(e);
            Language::default()
        });

        let sort_column = schema.sort_column(&pagination.sort_by).unwrap_or_else(|| {
            errors.push(FieldError::new(
                "sortBy",
                format!("Cannot sort by '{}'. Allowed: {}", pagination.sort_by, schema.sort_columns.join(", ")),
            ));
            default_sort
        });

        let mut filters: Vec<(&'static str, Value)> = Vec::new();
        for spec in schema.filters {
            let Some(raw) = params.get(spec.param).map(|s| s.trim()).filter(|s| !s.is_empty()) else {
                continue;
            };
            match spec.kind.coerce(raw) {
                Ok(value) => filters.push((spec.column, value)),
                Err(message) => errors.push(FieldError::new(spec.param, message)),
            }
        }

        let search = params
            .get("search")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            query: EntityQuery {
                language,
                filters,
                search,
                sort_column,
                sort_order: pagination.sort_order,
                limit: pagination.limit,
                offset: pagination.skip,
            },
            pagination,
        })
    }
}
