// handlers/contacts.rs - public contact form and its staff inbox

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::database::models::{ContactSubmission, SubmissionStatus};
use crate::error::ApiError;
use crate::middleware::{parse_id, ApiResponse, ApiResult, PageResult, Paginated, ValidatedJson};
use crate::services::{StatusUpdate, SubmissionForm};
use crate::state::AppState;
use crate::types::SortOrder;
use crate::utils::{PageRequest, Pagination};

#[derive(Debug, Deserialize)]
pub struct SubmissionQuery {
    #[serde(flatten)]
    pub page: PageRequest,
    pub status: Option<String>,
}

/// POST /api/v1/contacts/submit
pub async fn submit(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<SubmissionForm>,
) -> ApiResult<ContactSubmission> {
    let submission = state.submissions.submit(form).await?;
    Ok(ApiResponse::created(submission).message("Contact form submitted successfully"))
}

/// GET /api/v1/contacts/submissions/list - newest first, optional `status`
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> PageResult<ContactSubmission> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(SubmissionStatus::try_from(raw.to_string()).map_err(|_| {
            ApiError::field("status", "Invalid enum value. Expected 'new' | 'read' | 'handled'")
        })?),
    };
    let pagination = Pagination::parse(&query.page, "created_at", SortOrder::Desc);
    let listing = state.submissions.list(status, &pagination).await?;
    Ok(Paginated::from_listing(listing, "Submissions retrieved successfully"))
}

/// PATCH /api/v1/contacts/submissions/:id - move a submission to a new status
pub async fn update_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<StatusUpdate>,
) -> ApiResult<ContactSubmission> {
    let id = parse_id(&id)?;
    let submission = state.submissions.set_status(id, update.status).await?;
    Ok(ApiResponse::success(submission).message("Submission updated successfully"))
}
