//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use crate::config::RenderOverrides;
use navmerge_core::platform::GroupedOption;
use navmerge_core::{
    IdentityConflict, Item, MenuDescriptor, MenuId, PathRename, RenderedMenu, RequestContext,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// MENUS RESPONSE
// =============================================================================

/// Menu list with each menu's items as grouped options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenusResponse {
    pub success: bool,
    #[serde(default)]
    pub menus: Vec<MenuDescriptor>,
    /// Item options keyed by menu title.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<GroupedOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MenusResponse {
    pub fn success(
        menus: Vec<MenuDescriptor>,
        groups: BTreeMap<String, Vec<GroupedOption>>,
    ) -> Self {
        Self {
            success: true,
            menus,
            groups,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// RENDER REQUEST/RESPONSE
// =============================================================================

/// Render request body.
///
/// ```json
/// { "menu": "main", "params": { "base": 12, "start_level": 2 }, "context": { "anonymous": true } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Menu name. Empty or absent targets the active menu, then the default.
    #[serde(default)]
    pub menu: String,
    /// Overrides of the configured `[render]` defaults.
    #[serde(default)]
    pub params: RenderOverrides,
    #[serde(default)]
    pub context: RequestContext,
}

/// An item with its trail state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedItem {
    #[serde(flatten)]
    pub item: Item,
    pub active: bool,
    pub current: bool,
}

/// Render response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderResponse {
    pub success: bool,
    #[serde(default)]
    pub menu: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<MenuId>,
    #[serde(default)]
    pub items: Vec<RenderedItem>,
    /// Stored entries whose path changed since they were saved.
    #[serde(default)]
    pub renames: Vec<PathRename>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<IdentityConflict>,
    /// Cache identifier; absent when the output must not be cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderResponse {
    pub fn success(rendered: &RenderedMenu) -> Self {
        Self {
            success: true,
            menu: rendered.menu.clone(),
            base: rendered.base,
            items: rendered
                .items
                .iter()
                .map(|item| RenderedItem {
                    item: item.clone(),
                    active: rendered.is_active(item),
                    current: rendered.is_current(item),
                })
                .collect(),
            renames: rendered.renames.renames().cloned().collect(),
            conflicts: rendered.conflicts.clone(),
            cache_id: rendered.cache_id,
            cache_key: rendered
                .cache_key
                .as_ref()
                .map(|key| key.as_str().to_string()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            ..Self::default()
        }
    }
}
