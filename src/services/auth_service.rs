use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::auth::{hash_password, verify_password, AuthError, TokenKind, TokenService};
use crate::database::models::{NewUser, PublicUser, User};
use crate::database::{ContentStore, StoreError};
use crate::types::Role;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Self-service sign-up. Accounts always start with the `user` role.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    pub access_token: String,
}

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn ContentStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn ContentStore>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self { store, tokens, bcrypt_cost }
    }

    fn session(&self, user: User) -> ServiceResult<AuthSession> {
        let pair = self.tokens.issue_pair(user.id, &user.email, user.role)?;
        Ok(AuthSession {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: user.into(),
        })
    }

    async fn active_user(&self, id: Uuid) -> ServiceResult<User> {
        match self.store.find_user_by_id(id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(ServiceError::UserInactive),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthSession> {
        let email = normalize_email(&request.email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!("Login failed: unknown account");
            return Err(ServiceError::InvalidCredentials);
        };
        if !user.is_active {
            warn!("Login refused for inactive account {}", user.id);
            return Err(ServiceError::AccountInactive);
        }
        if !verify_password(request.password, user.password_hash.clone()).await? {
            warn!("Login failed: bad password for {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        self.session(user)
    }

    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthSession> {
        let email = normalize_email(&request.email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("User with this email already exists".to_string()));
        }

        let user = self
            .create_user(email, request.password, request.first_name, request.last_name, Role::User)
            .await?;
        info!("Registered user {}", user.id);
        self.session(user)
    }

    /// Create an account with an explicit role (registration, seeding)
    pub async fn create_user(
        &self,
        email: String,
        password: String,
        first_name: Option<String>,
        last_name: Option<String>,
        role: Role,
    ) -> ServiceResult<User> {
        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        self.store
            .insert_user(NewUser {
                email: normalize_email(&email),
                password_hash,
                first_name,
                last_name,
                role,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::Conflict("User with this email already exists".to_string()),
                other => other.into(),
            })
    }

    /// New access token for a valid refresh token. The refresh token itself
    /// is returned to the client unchanged.
    pub async fn refresh(&self, request: RefreshRequest) -> ServiceResult<RefreshedToken> {
        let claims = self
            .tokens
            .verify(&request.refresh_token, TokenKind::Refresh)
            .map_err(|e| match e {
                AuthError::TokenExpired => ServiceError::TokenExpired("Refresh token expired".to_string()),
                _ => ServiceError::InvalidToken("Invalid refresh token".to_string()),
            })?;

        let user = self.active_user(claims.sub).await?;
        let access_token = self.tokens.issue(user.id, &user.email, user.role, TokenKind::Access)?;
        Ok(RefreshedToken { access_token })
    }

    /// Verify an access token and reload its user. The stored role wins over
    /// the role baked into the token.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<AuthUser> {
        let claims = self.tokens.verify(token, TokenKind::Access)?;
        let user = self.active_user(claims.sub).await?;
        Ok(AuthUser::from(&user))
    }

    pub async fn me(&self, id: Uuid) -> ServiceResult<PublicUser> {
        self.store
            .find_user_by_id(id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::UserPatch;
    use crate::database::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, AuthService, TokenService) {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig::for_tests();
        let tokens = TokenService::new(&config.security);
        let service = AuthService::new(store.clone(), tokens.clone(), config.security.bcrypt_cost);
        (store, service, tokens)
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    async fn seed(service: &AuthService, role: Role) -> User {
        service
            .create_user("Staff@Bionic.am".into(), "admin123".into(), None, None, role)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn login_issues_tokens_for_the_user() {
        let (_, service, tokens) = setup();
        let user = seed(&service, Role::Editor).await;

        let session = service.login(login("staff@bionic.am", "admin123")).await.unwrap();
        assert_eq!(session.user.id, user.id);
        let claims = tokens.verify(&session.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Editor);
        assert!(tokens.verify(&session.refresh_token, TokenKind::Refresh).is_ok());
    }

    #[tokio::test]
    async fn unknown_account_and_bad_password_look_the_same() {
        let (_, service, _) = setup();
        seed(&service, Role::User).await;

        let unknown = service.login(login("ghost@bionic.am", "admin123")).await.unwrap_err();
        let wrong = service.login(login("staff@bionic.am", "nope-nope")).await.unwrap_err();
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn inactive_account_is_reported_distinctly() {
        let (store, service, _) = setup();
        let user = seed(&service, Role::User).await;
        store
            .update_user(user.id, UserPatch { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(matches!(
            service.login(login("staff@bionic.am", "admin123")).await,
            Err(ServiceError::AccountInactive)
        ));
    }

    #[tokio::test]
    async fn register_creates_plain_users_once() {
        let (_, service, _) = setup();
        let request = RegisterRequest {
            email: "New@Example.com".into(),
            password: "secret1".into(),
            first_name: Some("Ani".into()),
            last_name: None,
        };
        let session = service.register(request.clone()).await.unwrap();
        assert_eq!(session.user.role, Role::User);
        assert_eq!(session.user.email, "new@example.com");

        assert!(matches!(service.register(request).await, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn refresh_reissues_access_only() {
        let (store, service, tokens) = setup();
        let user = seed(&service, Role::Admin).await;
        let session = service.login(login("staff@bionic.am", "admin123")).await.unwrap();

        let refreshed = service
            .refresh(RefreshRequest { refresh_token: session.refresh_token.clone() })
            .await
            .unwrap();
        assert_eq!(tokens.verify(&refreshed.access_token, TokenKind::Access).unwrap().sub, user.id);

        let misuse = service
            .refresh(RefreshRequest { refresh_token: session.access_token.clone() })
            .await
            .unwrap_err();
        assert!(matches!(misuse, ServiceError::InvalidToken(_)));

        store
            .update_user(user.id, UserPatch { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert!(matches!(
            service.refresh(RefreshRequest { refresh_token: session.refresh_token }).await,
            Err(ServiceError::UserInactive)
        ));
    }

    #[tokio::test]
    async fn authenticate_uses_current_role() {
        let (store, service, _) = setup();
        let user = seed(&service, Role::Editor).await;
        let session = service.login(login("staff@bionic.am", "admin123")).await.unwrap();

        store
            .update_user(user.id, UserPatch { role: Some(Role::User), ..Default::default() })
            .await
            .unwrap();
        let current = service.authenticate(&session.access_token).await.unwrap();
        assert_eq!(current.role, Role::User);

        assert!(matches!(
            service.authenticate(&session.refresh_token).await,
            Err(ServiceError::InvalidToken(_))
        ));
    }
}
