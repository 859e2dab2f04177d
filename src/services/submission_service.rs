use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{degrade, Listing, ServiceResult};
use crate::database::models::{ContactSubmission, NewSubmission, SubmissionStatus};
use crate::database::ContentStore;
use crate::utils::Pagination;

/// Public contact form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmissionForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub subject: Option<String>,
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusUpdate {
    pub status: SubmissionStatus,
}

#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn ContentStore>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, form: SubmissionForm) -> ServiceResult<ContactSubmission> {
        let blank_to_none = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let submission = self
            .store
            .insert_submission(NewSubmission {
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                phone: blank_to_none(form.phone),
                subject: blank_to_none(form.subject),
                message: form.message,
            })
            .await?;
        info!("Contact form submission {} received", submission.id);
        Ok(submission)
    }

    /// Newest first, optionally narrowed to one status
    pub async fn list(
        &self,
        status: Option<SubmissionStatus>,
        pagination: &Pagination,
    ) -> ServiceResult<Listing<ContactSubmission>> {
        let result = self
            .store
            .list_submissions(status, pagination.limit, pagination.skip)
            .await
            .map(|(rows, total)| Listing::new(rows, pagination.meta(total)))
            .map_err(Into::into);
        degrade(result, pagination.page, pagination.limit)
    }

    pub async fn set_status(&self, id: Uuid, status: SubmissionStatus) -> ServiceResult<ContactSubmission> {
        let updated = self.store.update_submission_status(id, status).await?;
        info!("Submission {} marked {}", id, status.as_str());
        Ok(updated)
    }
}
