// routes.rs - router assembly: public reads, staff writes, global layers

use std::any::Any;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{self, content};
use crate::middleware::{authenticate, require_roles};
use crate::resources::{contact::Contacts, news::NewsArticles, partner::Partners, product::Products, review::Reviews, Resource};
use crate::state::AppState;
use crate::types::{Role, ADMIN_ONLY, STAFF};

/// Full application router
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/products", content_routes::<Products>(&state, true).merge(slug_route::<Products>()))
        .nest("/news", content_routes::<NewsArticles>(&state, true).merge(slug_route::<NewsArticles>()))
        .nest("/partners", content_routes::<Partners>(&state, true))
        .nest("/reviews", content_routes::<Reviews>(&state, false).merge(review_routes()))
        .nest("/contacts", content_routes::<Contacts>(&state, true).merge(submission_routes(&state)))
        .nest("/users", user_routes(&state));

    let router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes)),
        );

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// Wrap `router` so every route requires a token whose role is in `roles`.
/// The auth layer is added last so it runs first.
fn guarded(router: Router<AppState>, state: &AppState, roles: &'static [Role]) -> Router<AppState> {
    router
        .route_layer(from_fn(move |req: Request, next: Next| require_roles(roles, req, next)))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

/// CRUD for one translatable resource. `staff_create` false leaves POST public.
fn content_routes<R: Resource>(state: &AppState, staff_create: bool) -> Router<AppState> {
    let mut public = Router::new()
        .route("/", get(content::list::<R>))
        .route("/:id", get(content::get_one::<R>));
    let mut staff = Router::new().route("/:id", put(content::update::<R>).delete(content::delete::<R>));

    if staff_create {
        staff = staff.route("/", post(content::create::<R>));
    } else {
        public = public.route("/", post(content::create::<R>));
    }

    public.merge(guarded(staff, state, STAFF))
}

fn slug_route<R: Resource>() -> Router<AppState> {
    Router::new().route("/slug/:slug", get(content::get_by_slug::<R>))
}

fn review_routes() -> Router<AppState> {
    Router::new().route("/product/:product_id/stats", get(handlers::reviews::product_stats))
}

fn submission_routes(state: &AppState) -> Router<AppState> {
    use handlers::contacts;

    let public = Router::new().route("/submit", post(contacts::submit));
    let staff = Router::new()
        .route("/submissions/list", get(contacts::list_submissions))
        .route("/submissions/:id", patch(contacts::update_submission));

    public.merge(guarded(staff, state, STAFF))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/refresh", post(auth::refresh))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route_layer(from_fn_with_state(state.clone(), authenticate)),
        )
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use handlers::users;

    let admin = Router::new()
        .route("/", get(users::list))
        .route("/:id", patch(users::update));
    guarded(admin, state, ADMIN_ONLY)
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origins = if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(AnyOrigin)
    } else {
        let parsed: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);
    ApiError::internal_server_error("Internal server error").into_response()
}
