use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::ContentStore;
use crate::resources::Resource;
use crate::services::{AuthService, ContentService, ReviewStatsService, SubmissionService, UserService};

/// Shared handles for every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ContentStore>,
    pub auth: AuthService,
    pub submissions: SubmissionService,
    pub users: UserService,
    pub review_stats: ReviewStatsService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ContentStore>) -> Self {
        let tokens = TokenService::new(&config.security);
        Self {
            auth: AuthService::new(store.clone(), tokens, config.security.bcrypt_cost),
            submissions: SubmissionService::new(store.clone()),
            users: UserService::new(store.clone()),
            review_stats: ReviewStatsService::new(store.clone()),
            config: Arc::new(config),
            store,
        }
    }

    pub fn content<R: Resource>(&self) -> ContentService {
        ContentService::for_resource::<R>(self.store.clone())
    }
}
