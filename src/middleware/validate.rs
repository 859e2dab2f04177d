//! Request-boundary validation: JSON bodies, path ids.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::api::format::wire_path;
use crate::error::{ApiError, FieldError};

/// JSON body that has passed its `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::field("body", rejection.body_text()))?;
        value.validate().map_err(|errors| ApiError::validation(flatten(&errors)))?;
        Ok(Self(value))
    }
}

/// Flatten nested validator output into `{field, message}` pairs with dotted,
/// camelCased paths such as `translations.0.metaTitle`
pub fn flatten(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    out.push(FieldError::new(wire_path(&path), describe(error)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{}.{}", path, index), inner, out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |name: &str| error.params.get(name).map(|v| v.to_string());
    match error.code.as_ref() {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {} characters", min, max),
            (Some(min), None) => format!("Must be at least {} characters", min),
            (None, Some(max)) => format!("Must be at most {} characters", max),
            _ => "Invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {}", min, max),
            _ => "Out of range".to_string(),
        },
        "email" => "Invalid email".to_string(),
        "url" => "Invalid url".to_string(),
        _ => "Invalid value".to_string(),
    }
}

/// Parse a path id, rejecting anything that is not a UUID
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::field("id", "Invalid uuid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::product::CreateProduct;
    use serde_json::json;

    #[test]
    fn nested_errors_get_wire_paths() {
        let input: CreateProduct = serde_json::from_value(json!({
            "type": "upper_limb",
            "sku": "x".repeat(101),
            "translations": [
                { "language": "en", "name": "Hand" },
                { "language": "ru", "name": "", "metaTitle": "t".repeat(300) }
            ]
        }))
        .unwrap();
        let errors = flatten(&input.validate().unwrap_err());
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sku", "translations.1.metaTitle", "translations.1.name"]);
        assert_eq!(errors[0].message, "Must be at most 100 characters");
    }

    #[test]
    fn custom_messages_win() {
        let input: CreateProduct = serde_json::from_value(json!({ "type": "upper_limb" })).unwrap();
        let errors = flatten(&input.validate().unwrap_err());
        assert_eq!(errors[0].field, "translations");
        assert_eq!(errors[0].message, "At least one translation is required");
    }

    #[test]
    fn ids_must_be_uuids() {
        assert!(parse_id("8a6e0804-2bd0-4672-b79d-d97027f9071a").is_ok());
        assert_eq!(parse_id("42").unwrap_err().status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
