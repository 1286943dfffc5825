//! # Authentication Module
//!
//! API key check for privileged renders.
//!
//! ## Configuration
//!
//! - `NAVMERGE_API_KEY`: the key a privileged render must present. Without
//!   it no caller is ever authorized and privileged renders are refused.
//!
//! ## Usage
//!
//! Send the API key in the Authorization header:
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```
//!
//! Requests without the header pass through as unauthorized callers and may
//! still render public menus. A wrong key is rejected outright.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

// =============================================================================
// CALLER CLASSIFICATION
// =============================================================================

/// Request extension set by [`api_key_auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallerAuth {
    /// The caller presented the configured API key.
    pub authorized: bool,
}

/// Get API key from environment variable.
///
/// Returns `Some(key)` if `NAVMERGE_API_KEY` is set and non-empty.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("NAVMERGE_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Constant-time key comparison.
///
/// Both keys are padded to the same length so `ct_eq` always runs over the
/// same number of bytes.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided_bytes.len() == expected_bytes.len()
}

/// API key authentication middleware.
///
/// - No `Authorization` header: continues as an unauthorized caller.
/// - Header matching `NAVMERGE_API_KEY`: continues as an authorized caller.
/// - Any other header: 401.
pub async fn api_key_auth_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).to_string());

    let Some(provided) = provided else {
        request.extensions_mut().insert(CallerAuth::default());
        return Ok(next.run(request).await);
    };

    let authorized = get_api_key_from_env().is_some_and(|expected| keys_match(&provided, &expected));
    if !authorized {
        tracing::warn!(
            event = "auth_failure",
            reason = "invalid_api_key",
            "Authentication failed: invalid API key"
        );
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    request
        .extensions_mut()
        .insert(CallerAuth { authorized: true });
    Ok(next.run(request).await)
}

// =============================================================================
// TESTS
// =============================================================================
