#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use bionic_cms::config::AppConfig;
use bionic_cms::database::{ContentStore, DatabaseManager, MemoryStore, PgStore};
use bionic_cms::types::Role;
use bionic_cms::{app, AppState};

pub const PASSWORD: &str = "password123";

static TRACING: Once = Once::new();

/// Route server logs through the test writer; `RUST_LOG` picks the level.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// One in-process server per test, backed by its own memory store or by the
/// database named in `DATABASE_URL`
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub memory: Option<Arc<MemoryStore>>,
    pub state: AppState,
}

impl TestApp {
    /// Toggle the memory store's availability to simulate an outage
    pub fn set_store_available(&self, available: bool) {
        self.memory
            .as_ref()
            .expect("outages can only be simulated on the memory store")
            .set_available(available);
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create an account with `role` directly through the service layer
    pub async fn create_user(&self, email: &str, role: Role) -> Result<()> {
        self.state
            .auth
            .create_user(email.to_string(), PASSWORD.to_string(), None, None, role)
            .await
            .context("failed to seed user")?;
        Ok(())
    }

    /// Log in over HTTP and return the access token
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["accessToken"]
            .as_str()
            .map(str::to_string)
            .context("login response without accessToken")
    }

    /// Seed an account with `role` and return its access token
    pub async fn token_for(&self, role: Role) -> Result<String> {
        let email = format!("{}@bionic.test", role);
        self.create_user(&email, role).await?;
        self.login(&email).await
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(token).json(body).send().await?)
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> Result<Response> {
        Ok(self.client.put(self.url(path)).bearer_auth(token).json(body).send().await?)
    }

    pub async fn patch_auth(&self, path: &str, token: &str, body: &Value) -> Result<Response> {
        Ok(self.client.patch(self.url(path)).bearer_auth(token).json(body).send().await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn spawn_app() -> Result<TestApp> {
    let store = Arc::new(MemoryStore::new());
    spawn_with(AppConfig::for_tests(), store.clone(), Some(store)).await
}

/// Server over a migrated Postgres database, or `None` when `DATABASE_URL`
/// is not set.
pub async fn spawn_pg_app() -> Result<Option<TestApp>> {
    init_tracing();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        tracing::warn!("DATABASE_URL not set, skipping Postgres-backed test");
        return Ok(None);
    };

    let mut config = AppConfig::for_tests();
    config.database.url = url;
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    DatabaseManager::migrate(&pool).await.context("failed to migrate test database")?;

    let app = spawn_with(config, Arc::new(PgStore::new(pool)), None).await?;
    Ok(Some(app))
}

async fn spawn_with(config: AppConfig, store: Arc<dyn ContentStore>, memory: Option<Arc<MemoryStore>>) -> Result<TestApp> {
    init_tracing();
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(config, store);
    let router = app(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test port")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let test_app = TestApp {
        base_url,
        client: Client::new(),
        memory,
        state,
    };
    test_app.wait_ready(Duration::from_secs(5)).await?;
    Ok(test_app)
}

/// Minimal valid product payload with an English translation
pub fn product_payload(name: &str) -> Value {
    json!({
        "type": "upper_limb",
        "status": "published",
        "translations": [{ "language": "en", "name": name, "description": "Prosthetic device" }]
    })
}

pub async fn body(res: Response) -> Result<Value> {
    Ok(res.json::<Value>().await?)
}
