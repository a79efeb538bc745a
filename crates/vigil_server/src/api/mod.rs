//! # HTTP API
//!
//! JSON routes for telemetry reporters and dashboards.
//!
//! ## Endpoints
//!
//! - `POST /api/update` - Report one agent's state, returns its warning
//! - `GET /api/devices` - List stored agents
//! - `GET /api/warnings` - Current warnings snapshot
//! - `POST /api/mode` - Change system and/or control mode
//! - `GET /api/status` - Health and counters
//! - `POST /api/simulate` - Replace all agents with a demo fleet
//! - `POST|DELETE /api/clear` - Drop all agents and warnings

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Route table, logged at startup.
pub const ROUTES: [&str; 7] = [
    "POST   /api/update",
    "GET    /api/devices",
    "GET    /api/warnings",
    "POST   /api/mode",
    "GET    /api/status",
    "POST   /api/simulate",
    "POST   /api/clear (also DELETE)",
];

/// Builds the router with every endpoint, permissive CORS and request tracing.
///
/// # Example
///
/// ```rust,no_run
/// use vigil_server::api::{create_router, AppState};
///
/// #[tokio::main]
/// async fn main() {
///     let app = create_router(AppState::default());
///     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await.unwrap();
///     axum::serve(listener, app).await.unwrap();
/// }
/// ```
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Telemetry
        .route("/api/update", post(handlers::update_agent))
        // Queries
        .route("/api/devices", get(handlers::list_devices))
        .route("/api/warnings", get(handlers::list_warnings))
        .route("/api/status", get(handlers::status))
        // Control
        .route("/api/mode", post(handlers::set_mode))
        .route("/api/simulate", post(handlers::simulate))
        .route("/api/clear", post(handlers::clear).delete(handlers::clear))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
