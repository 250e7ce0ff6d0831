use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::config;
use crate::database::DatabaseManager;
use crate::handlers::{auth, companies, jobs, users};
use crate::middleware::{authenticate_jwt, ensure_admin, ensure_admin_or_user, ensure_logged_in};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Full application router with global middleware applied.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(public_routes())
        .merge(admin_routes())
        .merge(account_routes())
        .with_state(state)
        .layer(from_fn(authenticate_jwt))
        .layer(cors_layer());

    if config().api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn auth_routes() -> Router<AppState> {
    let whoami = Router::new()
        .route("/auth/whoami", get(auth::whoami))
        .route_layer(from_fn(ensure_logged_in));

    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
        .merge(whoami)
}

/// Anonymous reads of companies and jobs
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(companies::list))
        .route("/companies/:handle", get(companies::get))
        .route("/companies/:handle/jobs", get(companies::jobs))
        .route("/jobs", get(jobs::list))
        .route("/jobs/:title", get(jobs::get))
}

/// Writes to companies and jobs, plus user administration
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", post(companies::create))
        .route(
            "/companies/:handle",
            axum::routing::patch(companies::update).delete(companies::delete),
        )
        .route("/jobs", post(jobs::create))
        .route("/jobs/:title", axum::routing::patch(jobs::update).delete(jobs::delete))
        .route("/users", post(users::create).get(users::list))
        .route_layer(from_fn(ensure_admin))
}

/// Per-account routes open to the account owner and admins
fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/users/:username/jobs/:id", post(users::apply))
        .route_layer(from_fn(ensure_admin_or_user))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Jobly API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/token, /auth/register (public), /auth/whoami (logged in)",
                "companies": "/companies[/:handle[/jobs]] (reads public, writes admin)",
                "jobs": "/jobs[/:title] (reads public, writes admin)",
                "users": "/users (admin), /users/:username[/jobs/:id] (admin or self)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
