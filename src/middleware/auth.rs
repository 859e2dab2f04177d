use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::services::{AuthUser, ServiceError};
use crate::state::AppState;

/// Bearer-token authentication. Verifies the access token, reloads the user and
/// stores an [`AuthUser`] in the request extensions.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(request.headers()).map(str::to_owned) else {
        warn!("{} {}: no bearer token", request.method(), request.uri().path());
        return Err(ApiError::unauthorized("No token provided"));
    };

    let user = match state.auth.authenticate(&token).await {
        Ok(user) => user,
        Err(e) => {
            match &e {
                ServiceError::Unavailable(_) | ServiceError::Internal(_) => {}
                other => warn!("{} {}: authentication failed: {}", request.method(), request.uri().path(), other),
            }
            return Err(ApiError::from(e));
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
