// handlers/auth.rs - login, registration, token refresh and the current user

use axum::extract::State;

use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};
use crate::services::{AuthSession, AuthUser, LoginRequest, RefreshRequest, RefreshedToken, RegisterRequest};
use crate::state::AppState;

/// POST /api/v1/auth/login - token pair plus profile
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.login(request).await?;
    Ok(ApiResponse::success(session).message("Login successful"))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<AuthSession> {
    let session = state.auth.register(request).await?;
    Ok(ApiResponse::created(session).message("Registration successful"))
}

/// POST /api/v1/auth/refresh - new access token; the refresh token is kept
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> ApiResult<RefreshedToken> {
    let token = state.auth.refresh(request).await?;
    Ok(ApiResponse::success(token).message("Token refreshed successfully"))
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<PublicUser> {
    let profile = state.auth.me(user.id).await?;
    Ok(ApiResponse::success(profile).message("User retrieved successfully"))
}
