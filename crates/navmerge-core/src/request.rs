//! # Render Requests
//!
//! Parameters of one menu render and the identity of the caller.

use crate::window::LevelWindow;
use crate::MenuId;
use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// What to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuParams {
    /// Platform menu name.
    pub menu: String,
    /// Explicit base override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<MenuId>,
    #[serde(default)]
    pub start_level: usize,
    /// `0` means unlimited.
    #[serde(default)]
    pub max_levels: usize,
    #[serde(default = "default_true")]
    pub highlight_alias: bool,
    #[serde(default = "default_true")]
    pub highlight_parent_alias: bool,
}

impl MenuParams {
    /// Render all of `menu` with default highlighting.
    #[must_use]
    pub fn new(menu: impl Into<String>) -> Self {
        Self {
            menu: menu.into(),
            base: None,
            start_level: 0,
            max_levels: 0,
            highlight_alias: true,
            highlight_parent_alias: true,
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: MenuId) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_window(mut self, start_level: usize, max_levels: usize) -> Self {
        self.start_level = start_level;
        self.max_levels = max_levels;
        self
    }

    #[must_use]
    pub const fn window(&self) -> LevelWindow {
        LevelWindow::new(self.start_level, self.max_levels)
    }
}

/// Who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Administrative context: may render without a base and sees
    /// unfiltered nodes.
    #[serde(default)]
    pub privileged: bool,
    /// No signed-in user. Only anonymous output is cacheable.
    #[serde(default = "default_true")]
    pub anonymous: bool,
    /// Access levels granted to the caller.
    #[serde(default)]
    pub access_levels: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            privileged: false,
            anonymous: true,
            access_levels: Vec::new(),
            language: None,
        }
    }
}

impl RequestContext {
    /// An administrative context.
    #[must_use]
    pub fn privileged() -> Self {
        Self {
            privileged: true,
            anonymous: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_decode_with_defaults() {
        let params: MenuParams = serde_json::from_str(r#"{"menu":"main"}"#).expect("decode");
        assert_eq!(params, MenuParams::new("main"));
        assert_eq!(params.window(), LevelWindow::unbounded());
    }

    #[test]
    fn context_defaults_to_anonymous_visitor() {
        let ctx: RequestContext = serde_json::from_str("{}").expect("decode");
        assert!(ctx.anonymous);
        assert!(!ctx.privileged);
        assert!(!RequestContext::privileged().anonymous);
    }
}
