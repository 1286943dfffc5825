//! # Middleware Module
//!
//! Per-route rate limiting for the navmerge HTTP API.
//!
//! Renders read stored items and merge a whole menu, so they draw from
//! their own budget. Listing and health checks share a second one.
//!
//! ## Configuration
//!
//! - `NAVMERGE_RATE_LIMIT`: Listing requests per second (default: 100, 0 disables)
//! - `NAVMERGE_RENDER_RATE_LIMIT`: Render requests per second (default: the
//!   listing budget, 0 disables)

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default budget: 100 requests per second.
const DEFAULT_RATE_LIMIT: u32 = 100;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// =============================================================================
// ROUTE CLASSES
// =============================================================================

/// Which budget a request draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// `POST /render`
    Render,
    /// Everything else: `/menus`, `/health`.
    Listing,
}

impl RouteClass {
    /// Classify a request path.
    pub fn of(path: &str) -> Self {
        if path.trim_end_matches('/') == "/render" {
            Self::Render
        } else {
            Self::Listing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Listing => "listing",
        }
    }
}

// =============================================================================
// BUDGETS
// =============================================================================

/// Requests per second per route class. `0` disables limiting for that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub render: u32,
    pub listing: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            render: DEFAULT_RATE_LIMIT,
            listing: DEFAULT_RATE_LIMIT,
        }
    }
}

impl RateLimits {
    /// Read `NAVMERGE_RATE_LIMIT` and `NAVMERGE_RENDER_RATE_LIMIT`.
    ///
    /// Unset or unparsable values fall back to the defaults. The render
    /// budget defaults to the listing budget.
    pub fn from_env() -> Self {
        let listing = env_rate("NAVMERGE_RATE_LIMIT").unwrap_or(DEFAULT_RATE_LIMIT);
        let render = env_rate("NAVMERGE_RENDER_RATE_LIMIT").unwrap_or(listing);
        Self { render, listing }
    }

    pub fn is_disabled(&self) -> bool {
        self.render == 0 && self.listing == 0
    }
}

fn env_rate(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

// =============================================================================
// RATE LIMITER
// =============================================================================

/// One governor limiter per route class.
pub struct RouteLimiters {
    render: Option<DirectLimiter>,
    listing: Option<DirectLimiter>,
}

/// Shared handle passed to the middleware as state.
pub type SharedRouteLimiters = Arc<RouteLimiters>;

fn limiter(requests_per_second: u32) -> Option<DirectLimiter> {
    NonZeroU32::new(requests_per_second).map(|rps| RateLimiter::direct(Quota::per_second(rps)))
}

impl RouteLimiters {
    pub fn new(limits: RateLimits) -> SharedRouteLimiters {
        Arc::new(Self {
            render: limiter(limits.render),
            listing: limiter(limits.listing),
        })
    }

    /// Take one request from the class budget. Unlimited classes always pass.
    pub fn check(&self, class: RouteClass) -> bool {
        let limiter = match class {
            RouteClass::Render => &self.render,
            RouteClass::Listing => &self.listing,
        };
        limiter.as_ref().is_none_or(|l| l.check().is_ok())
    }
}

/// Rate limiting middleware.
///
/// Returns 429 Too Many Requests when the route's budget is spent.
pub async fn rate_limit_middleware(
    State(limiters): State<SharedRouteLimiters>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let class = RouteClass::of(request.uri().path());
    if limiters.check(class) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        event = "rate_limited",
        budget = class.as_str(),
        path = %request.uri().path(),
        "Rate limit exceeded"
    );
    Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
}

// =============================================================================
// TESTS
// =============================================================================
