//! Integration tests for the navmerge HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use navmerge::api::{
    AppState, HealthResponse, MenusResponse, RenderRequest, RenderResponse, create_router,
};
use navmerge::config::{AppConfig, RenderOverrides};
use navmerge_core::{MenuId, PlatformSnapshot, RequestContext};
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Mutex to serialize tests since they modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

const PLATFORM: &str = r#"{
    "kind": "flat",
    "active": 3,
    "menus": {
        "main": {
            "title": "Main Menu",
            "items": [
                {"id": 1, "type": "component", "route": "home", "title": "Home",
                 "link": "index.php?option=com_content&view=featured"},
                {"id": 2, "type": "component", "route": "blog", "title": "Blog",
                 "link": "index.php?option=com_content&amp;view=category&amp;id=8"},
                {"id": 3, "ancestors": [2], "type": "alias", "route": "blog/latest",
                 "title": "Latest", "alias_target": 1},
                {"id": 4, "type": "url", "route": "docs", "title": "Docs",
                 "link": "https://docs.example.com", "access": 3}
            ]
        }
    }
}"#;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
    dir: TempDir,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("NAVMERGE_API_KEY") };
    }
}

fn write_stored(dir: &Path, menu: &str, body: serde_json::Value) {
    std::fs::write(dir.join(format!("{menu}.json")), body.to_string()).unwrap();
}

/// Create a test server over the sample platform, optionally with an API
/// key. Returns a guard that must be kept alive during the test.
fn create_test_server(
    api_key: Option<&str>,
    stored: Option<serde_json::Value>,
) -> (TestServer, TestGuard) {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe {
        match api_key {
            Some(key) => std::env::set_var("NAVMERGE_API_KEY", key),
            None => std::env::remove_var("NAVMERGE_API_KEY"),
        }
    }

    let dir = tempfile::tempdir().unwrap();
    if let Some(body) = stored {
        write_stored(dir.path(), "main", body);
    }

    let platform = PlatformSnapshot::from_json(PLATFORM)
        .unwrap()
        .into_platform()
        .unwrap();
    let state = AppState::new(platform, dir.path().to_path_buf(), AppConfig::default());
    let router = create_router(state);
    (
        TestServer::new(router).unwrap(),
        TestGuard {
            _guard: guard,
            dir,
        },
    )
}

fn render_request(menu: &str) -> RenderRequest {
    RenderRequest {
        menu: menu.to_string(),
        params: RenderOverrides::default(),
        context: RequestContext::default(),
    }
}

fn bearer(key: &str) -> HeaderValue {
    format!("Bearer {}", key).parse::<HeaderValue>().unwrap()
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server(None, None);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// MENUS ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_menus_lists_groups() {
    let (server, _guard) = create_test_server(None, None);

    let response = server.get("/menus").await;

    response.assert_status_ok();
    let menus: MenusResponse = response.json();
    assert!(menus.success);
    assert_eq!(menus.menus.len(), 1);
    assert_eq!(menus.menus[0].name, "main");

    // Editors see restricted items too.
    let options = &menus.groups["main"];
    assert_eq!(options.len(), 4);
    assert_eq!(options[2].id, MenuId(3));
    assert_eq!(options[2].depth, 1);
}

// =============================================================================
// RENDER ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_render_public_menu() {
    let (server, _guard) = create_test_server(None, None);

    let response = server.post("/render").json(&render_request("main")).await;

    response.assert_status_ok();
    let rendered: RenderResponse = response.json();
    assert!(rendered.success);
    assert_eq!(rendered.base, Some(MenuId(3)));
    assert_eq!(rendered.cache_id, Some(3));
    assert!(rendered.cache_key.is_some());

    let ids: Vec<MenuId> = rendered.items.iter().map(|i| i.item.id).collect();
    assert_eq!(ids, vec![MenuId(1), MenuId(2), MenuId(3)]);
    assert_eq!(
        rendered.items[1].item.url.as_deref(),
        Some("index.php?option=com_content&view=category&id=8&Itemid=2")
    );
    assert!(rendered.items[1].active);
    assert!(rendered.items[2].current);
    assert!(!rendered.items[0].current);
}

#[tokio::test]
async fn test_render_reports_renames() {
    let stored = json!({
        "old-blog": {"id": 2, "title": "News"},
        "home": {"object_id": "1", "link_title": "Start here"}
    });
    let (server, _guard) = create_test_server(None, Some(stored));

    let response = server.post("/render").json(&render_request("main")).await;

    response.assert_status_ok();
    let rendered: RenderResponse = response.json();
    assert_eq!(rendered.renames.len(), 1);
    assert_eq!(rendered.renames[0].old_path, "old-blog");
    assert_eq!(rendered.renames[0].new_path, "blog");
    assert_eq!(rendered.items[1].item.title, "News");
    assert_eq!(rendered.items[0].item.link_title, "Start here");
}

#[tokio::test]
async fn test_render_with_access_levels() {
    let (server, _guard) = create_test_server(None, None);

    let response = server
        .post("/render")
        .json(&json!({
            "menu": "main",
            "context": {"anonymous": false, "access_levels": [3]}
        }))
        .await;

    response.assert_status_ok();
    let rendered: RenderResponse = response.json();
    assert_eq!(rendered.items.len(), 4);
    assert_eq!(rendered.cache_id, None);
}

#[tokio::test]
async fn test_render_window_override() {
    let (server, _guard) = create_test_server(None, None);

    let response = server
        .post("/render")
        .json(&json!({"menu": "main", "params": {"start_level": 1}}))
        .await;

    response.assert_status_ok();
    let rendered: RenderResponse = response.json();
    let ids: Vec<MenuId> = rendered.items.iter().map(|i| i.item.id).collect();
    assert_eq!(ids, vec![MenuId(3)]);
}

#[tokio::test]
async fn test_render_unknown_menu_is_empty() {
    let (server, _guard) = create_test_server(None, None);

    let response = server.post("/render").json(&render_request("footer")).await;

    response.assert_status_ok();
    let rendered: RenderResponse = response.json();
    assert!(rendered.success);
    assert!(rendered.items.is_empty());
}

#[tokio::test]
async fn test_render_without_menu_uses_active_menu() {
    let stored = json!({"blog": {"title": "News"}});
    let (server, _guard) = create_test_server(None, Some(stored));

    let response = server.post("/render").json(&json!({})).await;

    response.assert_status_ok();
    let rendered: RenderResponse = response.json();
    assert_eq!(rendered.menu, "main");
    assert_eq!(rendered.items.len(), 3);
    // Stored items of the resolved menu are applied.
    assert_eq!(rendered.items[1].item.title, "News");
}

#[tokio::test]
async fn test_render_rejects_bad_menu_name() {
    let (server, _guard) = create_test_server(None, None);

    let response = server
        .post("/render")
        .json(&render_request("../secrets"))
        .await;

    response.assert_status_bad_request();
    let rendered: RenderResponse = response.json();
    assert!(!rendered.success);
    assert!(rendered.error.is_some());
}

#[tokio::test]
async fn test_render_rejects_deep_window() {
    let (server, _guard) = create_test_server(None, None);

    let response = server
        .post("/render")
        .json(&json!({"menu": "main", "params": {"start_level": 1000}}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_render_invalid_stored_file() {
    let (server, guard) = create_test_server(None, None);
    std::fs::write(guard.dir.path().join("main.json"), "{ not json").unwrap();

    let response = server.post("/render").json(&render_request("main")).await;

    assert_eq!(response.status_code().as_u16(), 500);
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let (server, _guard) = create_test_server(None, None);

    let response = server.get("/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (server, _guard) = create_test_server(None, None);

    let response = server.get("/render").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let (server, _guard) = create_test_server(None, None);

    let response = server
        .post("/render")
        .text("not valid json")
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// AUTHENTICATION TESTS
// =============================================================================

fn privileged_request() -> RenderRequest {
    RenderRequest {
        context: RequestContext::privileged(),
        ..render_request("main")
    }
}

#[tokio::test]
async fn test_privileged_render_without_key_configured() {
    let (server, _guard) = create_test_server(None, None);

    let response = server.post("/render").json(&privileged_request()).await;

    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn test_privileged_render_missing_header() {
    let (server, _guard) = create_test_server(Some("required-key"), None);

    let response = server.post("/render").json(&privileged_request()).await;

    assert_eq!(
        response.status_code().as_u16(),
        401,
        "Privileged render without a key should return 401 Unauthorized"
    );
}

#[tokio::test]
async fn test_privileged_render_valid_bearer() {
    let api_key = "test-secret-key-12345";
    let (server, _guard) = create_test_server(Some(api_key), None);

    let response = server
        .post("/render")
        .add_header(axum::http::header::AUTHORIZATION, bearer(api_key))
        .json(&privileged_request())
        .await;

    response.assert_status_ok();
    let rendered: RenderResponse = response.json();
    // Unfiltered view includes the restricted item.
    assert_eq!(rendered.items.len(), 4);
    assert_eq!(rendered.cache_id, None);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (server, _guard) = create_test_server(Some("correct-key"), None);

    let response = server
        .post("/render")
        .add_header(axum::http::header::AUTHORIZATION, bearer("wrong-key"))
        .json(&render_request("main"))
        .await;

    assert_eq!(
        response.status_code().as_u16(),
        401,
        "Invalid token should return 401 Unauthorized"
    );
}

#[tokio::test]
async fn test_bearer_prefix_only_rejected() {
    let (server, _guard) = create_test_server(Some("actual-key"), None);

    let response = server
        .post("/render")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer ".parse::<HeaderValue>().unwrap(),
        )
        .json(&privileged_request())
        .await;

    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn test_public_render_needs_no_key() {
    let (server, _guard) = create_test_server(Some("some-key"), None);

    let response = server.post("/render").json(&render_request("main")).await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_with_key_configured() {
    let (server, _guard) = create_test_server(Some("secret-key"), None);

    let response = server.get("/health").await;

    response.assert_status_ok();
}
