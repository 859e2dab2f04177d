use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{degrade, Listing, ServiceError, ServiceResult};
use crate::database::models::{PublicUser, UserPatch};
use crate::database::ContentStore;
use crate::types::{double_option, Role};
use crate::utils::Pagination;

/// Admin edit of an account: promotion, deactivation, display name
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
}

impl From<UpdateUser> for UserPatch {
    fn from(input: UpdateUser) -> Self {
        Self {
            role: input.role,
            is_active: input.is_active,
            first_name: input.first_name,
            last_name: input.last_name,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn ContentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, pagination: &Pagination) -> ServiceResult<Listing<PublicUser>> {
        let result = self
            .store
            .list_users(pagination.limit, pagination.skip)
            .await
            .map(|(users, total)| Listing::new(users, pagination.meta(total)).map(PublicUser::from))
            .map_err(Into::into);
        degrade(result, pagination.page, pagination.limit)
    }

    pub async fn update(&self, id: Uuid, input: UpdateUser) -> ServiceResult<PublicUser> {
        let patch = UserPatch::from(input);
        if patch.is_empty() {
            return Err(ServiceError::field("body", "No fields to update"));
        }
        let user = self.store.update_user(id, patch).await?;
        info!("User {} updated (role={}, active={})", user.id, user.role, user.is_active);
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;
    use crate::types::SortOrder;
    use crate::utils::PageRequest;
    use serde_json::json;

    async fn setup() -> (UserService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                email: "editor@bionic.am".into(),
                password_hash: "$2b$10$hash".into(),
                first_name: Some("Ani".into()),
                last_name: None,
                role: Role::User,
            })
            .await
            .unwrap();
        (UserService::new(store), user.id)
    }

    #[tokio::test]
    async fn admin_edits_apply_partially() {
        let (service, id) = setup().await;
        let input: UpdateUser = serde_json::from_value(json!({ "role": "editor", "firstName": null })).unwrap();
        let updated = service.update(id, input).await.unwrap();
        assert_eq!(updated.role, Role::Editor);
        assert!(updated.is_active);
        assert_eq!(updated.first_name, None);
    }

    #[tokio::test]
    async fn empty_edit_is_rejected() {
        let (service, id) = setup().await;
        assert!(matches!(
            service.update(id, UpdateUser::default()).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn listing_hides_password_hashes() {
        let (service, _) = setup().await;
        let pagination = Pagination::parse(&PageRequest::default(), "created_at", SortOrder::Desc);
        let listing = service.list(&pagination).await.unwrap();
        assert_eq!(listing.meta.total, 1);
        let body = serde_json::to_value(&listing.items).unwrap();
        assert!(body[0].get("passwordHash").is_none());
        assert_eq!(body[0]["email"], "editor@bionic.am");
    }
}
