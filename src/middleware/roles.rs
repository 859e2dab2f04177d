use axum::{extract::Request, middleware::Next, response::Response};
use tracing::warn;

use crate::error::ApiError;
use crate::services::AuthUser;
use crate::types::Role;

/// Let the request through only when the authenticated role is in `allowed`.
/// Must run after [`super::auth::authenticate`].
pub async fn require_roles(allowed: &'static [Role], request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return Err(ApiError::unauthorized("Authentication required"));
    };

    if !allowed.contains(&user.role) {
        warn!("User {} ({}) denied {} {}", user.id, user.role, request.method(), request.uri().path());
        return Err(ApiError::forbidden(denied_message(allowed)));
    }

    Ok(next.run(request).await)
}

pub fn denied_message(allowed: &[Role]) -> String {
    let roles: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    format!("Insufficient permissions. Required roles: {}", roles.join(", "))
}
