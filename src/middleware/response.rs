use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::services::Listing;
use crate::utils::PageMeta;

/// Message used when list reads run without a reachable store
pub const DEGRADED_MESSAGE: &str = "Database not connected - showing empty results";

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: Option<String>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
            status_code: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            message: None,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => return serialization_failure(e),
        };

        let mut envelope = Map::new();
        envelope.insert("success".into(), Value::Bool(true));
        envelope.insert("data".into(), data_value);
        if let Some(message) = self.message {
            envelope.insert("message".into(), Value::String(message));
        }

        (status, Json(Value::Object(envelope))).into_response()
    }
}

/// Paged list envelope: `{success, data: [...], message?, pagination}`
#[derive(Debug)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
    pub message: Option<String>,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, pagination: PageMeta) -> Self {
        Self {
            data,
            pagination,
            message: None,
        }
    }

    /// Empty page served while the store is unreachable
    pub fn degraded(page: i64, limit: i64) -> Self {
        Self {
            data: Vec::new(),
            pagination: PageMeta::new(page, limit, 0),
            message: Some(DEGRADED_MESSAGE.to_string()),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Page from a service listing; `message` is replaced by the degraded
    /// notice when the store was unreachable
    pub fn from_listing(listing: Listing<T>, message: impl Into<String>) -> Self {
        if listing.degraded {
            Self::degraded(listing.meta.page, listing.meta.limit)
        } else {
            Self::new(listing.items, listing.meta).message(message)
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => return serialization_failure(e),
        };

        let mut envelope = json!({
            "success": true,
            "data": data_value,
            "pagination": self.pagination,
        });
        if let Some(message) = self.message {
            envelope["message"] = Value::String(message);
        }

        (StatusCode::OK, Json(envelope)).into_response()
    }
}

fn serialization_failure(e: serde_json::Error) -> Response {
    tracing::error!("Failed to serialize response data: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Failed to serialize response data",
            "error": "INTERNAL_SERVER_ERROR"
        })),
    )
        .into_response()
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
pub type PageResult<T> = Result<Paginated<T>, crate::error::ApiError>;
