// handlers/users.rs - account administration

use axum::extract::{Path, Query, State};

use crate::database::models::PublicUser;
use crate::middleware::{parse_id, ApiResponse, ApiResult, PageResult, Paginated, ValidatedJson};
use crate::services::UpdateUser;
use crate::state::AppState;
use crate::types::SortOrder;
use crate::utils::{PageRequest, Pagination};

/// GET /api/v1/users
pub async fn list(State(state): State<AppState>, Query(page): Query<PageRequest>) -> PageResult<PublicUser> {
    let pagination = Pagination::parse(&page, "created_at", SortOrder::Desc);
    let listing = state.users.list(&pagination).await?;
    Ok(Paginated::from_listing(listing, "Users retrieved successfully"))
}

/// PATCH /api/v1/users/:id - role, activation and name changes
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> ApiResult<PublicUser> {
    let id = parse_id(&id)?;
    let user = state.users.update(id, input).await?;
    Ok(ApiResponse::success(user).message("User updated successfully"))
}
