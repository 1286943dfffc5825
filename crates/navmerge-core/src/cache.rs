//! # Cache Contract
//!
//! Keys for an external memoization layer. No cache lives here.
//!
//! Rendered output depends on platform-side filtering, which depends on
//! the caller's access levels, so the key carries them in normalized form
//! next to every parameter that shapes the tree.

use crate::request::MenuParams;
use crate::MenuId;
use serde::Serialize;
use std::fmt;

/// Cache id hint of a render.
///
/// `None` for signed-in callers, whose output may be personalized.
/// Otherwise the active node's id, or `0` without one.
#[must_use]
pub fn cache_id(anonymous: bool, active: Option<MenuId>) -> Option<u64> {
    if !anonymous {
        return None;
    }
    Some(active.map_or(0, MenuId::value))
}

/// Stable key of a render's output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for `params` rendered for `access_levels` under `base`.
    ///
    /// Access levels are sorted and de-duplicated, so equivalent contexts
    /// share one key.
    #[must_use]
    pub fn new(params: &MenuParams, access_levels: &[u32], base: Option<MenuId>) -> Self {
        let mut levels = access_levels.to_vec();
        levels.sort_unstable();
        levels.dedup();
        let levels = levels
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        Self(format!(
            "menu={};base={};start={};max={};alias={};parent_alias={};levels=[{}];resolved={}",
            params.menu,
            params.base.map_or(String::new(), |id| id.to_string()),
            params.start_level,
            params.max_levels,
            u8::from(params.highlight_alias),
            u8::from(params.highlight_parent_alias),
            levels,
            base.map_or(0, MenuId::value),
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_in_callers_are_not_cached() {
        assert_eq!(cache_id(false, Some(MenuId(4))), None);
    }

    #[test]
    fn anonymous_callers_key_on_active() {
        assert_eq!(cache_id(true, Some(MenuId(4))), Some(4));
        assert_eq!(cache_id(true, None), Some(0));
    }

    #[test]
    fn access_levels_are_normalized() {
        let params = MenuParams::new("main");
        let a = CacheKey::new(&params, &[3, 1, 2, 1], Some(MenuId(7)));
        let b = CacheKey::new(&params, &[1, 2, 3], Some(MenuId(7)));
        assert_eq!(a, b);
    }

    #[test]
    fn key_covers_window_and_base() {
        let params = MenuParams::new("main");
        let base = CacheKey::new(&params, &[1], None);
        assert_ne!(base, CacheKey::new(&params.clone().with_window(1, 2), &[1], None));
        assert_ne!(base, CacheKey::new(&params, &[1], Some(MenuId(2))));
        assert_ne!(base, CacheKey::new(&MenuParams::new("footer"), &[1], None));
        assert!(base.as_str().starts_with("menu=main;"));
    }
}
