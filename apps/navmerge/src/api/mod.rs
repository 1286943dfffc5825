//! # navmerge HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /menus` - Menu list and grouped item options
//! - `POST /render` - Render a menu against its stored configuration
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `NAVMERGE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `NAVMERGE_RATE_LIMIT`: Listing requests per second (default: 100, 0 to disable)
//! - `NAVMERGE_RENDER_RATE_LIMIT`: Render requests per second (default: the listing budget)
//! - `NAVMERGE_API_KEY`: Bearer token required for privileged renders

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::{CallerAuth, get_api_key_from_env};
pub use middleware::{RateLimits, RouteClass, RouteLimiters};
// Re-export handlers and types for integration tests (via `navmerge::api::*`)
#[allow(unused_imports)]
pub use handlers::{health_handler, menus_handler, render_handler};
#[allow(unused_imports)]
pub use types::{HealthResponse, MenusResponse, RenderRequest, RenderResponse};

use crate::config::AppConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use navmerge_core::{MenuCatalog, MenuError, MenuPlatform, MenuRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the platform snapshot and where stored items live.
#[derive(Clone)]
pub struct AppState {
    /// The menu platform adapter.
    pub platform: Arc<dyn MenuPlatform>,
    /// Lazily loaded menu list of `platform`.
    pub catalog: Arc<RwLock<MenuCatalog>>,
    /// Directory holding `<menu>.json` stored items.
    pub stored_dir: PathBuf,
    pub config: Arc<AppConfig>,
    pub renderer: MenuRenderer,
}

impl AppState {
    /// Create new app state over a platform.
    #[must_use]
    pub fn new(platform: Box<dyn MenuPlatform>, stored_dir: PathBuf, config: AppConfig) -> Self {
        let renderer = config.renderer();
        Self {
            platform: Arc::from(platform),
            catalog: Arc::new(RwLock::new(MenuCatalog::new())),
            stored_dir,
            config: Arc::new(config),
            renderer,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `NAVMERGE_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("NAVMERGE_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (NAVMERGE_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in NAVMERGE_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No NAVMERGE_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit - 2 MB
/// 4. Rate Limiting - separate render and listing budgets (if enabled)
/// 5. Authentication - classifies the caller for privileged renders
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let limits = RateLimits::from_env();
    let rate_limiter = if !limits.is_disabled() {
        tracing::info!(
            render = limits.render,
            listing = limits.listing,
            "Rate limiting enabled (requests/second, 0 = unlimited)"
        );
        Some(RouteLimiters::new(limits))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    if get_api_key_from_env().is_some() {
        tracing::info!("API key configured: privileged renders require a Bearer token");
    } else {
        tracing::warn!(
            "No NAVMERGE_API_KEY set: privileged renders are refused. \
             Set NAVMERGE_API_KEY to enable them."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/menus", get(handlers::menus_handler))
        .route("/render", post(handlers::render_handler))
        .layer(axum_middleware::from_fn(auth::api_key_auth_middleware));

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), MenuError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MenuError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("navmerge HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| MenuError::IoError(format!("Server error: {}", e)))
}
