//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState, CallerAuth,
    types::{HealthResponse, MenusResponse, RenderRequest, RenderResponse},
};
use crate::{events, files};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use navmerge_core::{MenuError, grouped_items};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// MENUS HANDLER
// =============================================================================

/// List menus and their grouped item options.
pub async fn menus_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut catalog = state.catalog.write().await;
    let menus = catalog.menus(&*state.platform).to_vec();

    match grouped_items(&*state.platform, &mut catalog) {
        Ok(groups) => (StatusCode::OK, Json(MenusResponse::success(menus, groups))),
        Err(e) => (
            error_status(&e),
            Json(MenusResponse::error(format!("Menu listing failed: {}", e))),
        ),
    }
}

// =============================================================================
// RENDER HANDLER
// =============================================================================

/// Render a menu.
///
/// Stored items are read from `<stored_dir>/<menu>.json`; a missing file
/// renders the platform tree as is. Renames are reported, never written.
/// An empty menu name renders the active menu, then the default one.
pub async fn render_handler(
    State(state): State<AppState>,
    auth: Option<Extension<CallerAuth>>,
    Json(request): Json<RenderRequest>,
) -> impl IntoResponse {
    let authorized = auth.is_some_and(|Extension(caller)| caller.authorized);
    if request.context.privileged && !authorized {
        tracing::warn!(
            event = "auth_failure",
            reason = "privileged_render_without_key",
            menu = %request.menu,
            "Privileged render refused"
        );
        return (
            StatusCode::UNAUTHORIZED,
            Json(RenderResponse::error("Privileged render requires an API key")),
        );
    }

    match render(&state, &request).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => (
            error_status(&e),
            Json(RenderResponse::error(format!("Render failed: {}", e))),
        ),
    }
}

async fn render(state: &AppState, request: &RenderRequest) -> Result<RenderResponse, MenuError> {
    let menu = state.platform.resolve_menu(&request.menu).ok_or_else(|| {
        MenuError::InvalidRequest("no menu named and no active or default menu".to_string())
    })?;
    let path = files::stored_path(&state.stored_dir, &menu)?;
    let stored = tokio::task::spawn_blocking(move || files::load_stored_or_empty(&path))
        .await
        .map_err(|e| MenuError::IoError(format!("Stored items task failed: {}", e)))??;
    let params = state.config.render.params(&menu, &request.params);

    let rendered = state
        .renderer
        .render(&*state.platform, &params, &stored, &request.context)?;
    events::log_rendered(&rendered);

    Ok(RenderResponse::success(&rendered))
}

/// HTTP status for an engine error.
fn error_status(error: &MenuError) -> StatusCode {
    match error {
        MenuError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        MenuError::Configuration { .. }
        | MenuError::Cycle { .. }
        | MenuError::SerializationError(_)
        | MenuError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
