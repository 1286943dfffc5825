//! # Configuration
//!
//! `navmerge.toml` settings for render defaults, link addressing and the
//! HTTP server.
//!
//! ```toml
//! [render]
//! start_level = 0
//! max_levels = 0
//! highlight_alias = true
//! highlight_parent_alias = true
//!
//! [links]
//! entry_prefix = "index.php?"
//! item_param = "Itemid"
//! language_param = "lang"
//! sef_suffix = false
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! ```
//!
//! A missing file yields the defaults above (without `language_param`).

use navmerge_core::primitives::{DEFAULT_ENTRY_PREFIX, DEFAULT_ITEM_PARAM};
use navmerge_core::{
    LinkContext, LinkResolver, MenuError, MenuId, MenuParams, MenuRenderer, QueryLinkScheme,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "navmerge.toml";

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// `[render]`: defaults for every render request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    pub start_level: usize,
    pub max_levels: usize,
    pub highlight_alias: bool,
    pub highlight_parent_alias: bool,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            start_level: 0,
            max_levels: 0,
            highlight_alias: true,
            highlight_parent_alias: true,
        }
    }
}

/// Per-request overrides of [`RenderDefaults`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOverrides {
    pub base: Option<u64>,
    pub start_level: Option<usize>,
    pub max_levels: Option<usize>,
    pub highlight_alias: Option<bool>,
    pub highlight_parent_alias: Option<bool>,
}

impl RenderDefaults {
    /// Parameters for rendering `menu`, overrides first.
    #[must_use]
    pub fn params(&self, menu: &str, overrides: &RenderOverrides) -> MenuParams {
        MenuParams {
            menu: menu.to_string(),
            base: overrides.base.map(MenuId),
            start_level: overrides.start_level.unwrap_or(self.start_level),
            max_levels: overrides.max_levels.unwrap_or(self.max_levels),
            highlight_alias: overrides.highlight_alias.unwrap_or(self.highlight_alias),
            highlight_parent_alias: overrides
                .highlight_parent_alias
                .unwrap_or(self.highlight_parent_alias),
        }
    }
}

/// `[links]`: how the platform addresses menu items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub entry_prefix: String,
    pub item_param: String,
    pub language_param: Option<String>,
    pub sef_suffix: bool,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            entry_prefix: DEFAULT_ENTRY_PREFIX.to_string(),
            item_param: DEFAULT_ITEM_PARAM.to_string(),
            language_param: None,
            sef_suffix: false,
        }
    }
}

impl LinkSettings {
    /// Link resolver for these settings.
    #[must_use]
    pub fn resolver(&self) -> LinkResolver {
        LinkResolver::new(
            QueryLinkScheme {
                entry_prefix: self.entry_prefix.clone(),
                item_param: self.item_param.clone(),
                language_param: self.language_param.clone(),
            },
            LinkContext {
                language: None,
                sef_suffix: self.sef_suffix,
            },
        )
    }
}

/// `[server]`: bind address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// The whole `navmerge.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub render: RenderDefaults,
    pub links: LinkSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, MenuError> {
        toml::from_str(text)
            .map_err(|e| MenuError::SerializationError(format!("Invalid configuration: {}", e)))
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, MenuError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| MenuError::IoError(format!("Cannot read file metadata: {}", e)))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(MenuError::SerializationError(format!(
                "Configuration file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| MenuError::IoError(format!("Cannot read '{}': {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Menu renderer using the configured link addressing.
    #[must_use]
    pub fn renderer(&self) -> MenuRenderer {
        MenuRenderer::new(self.links.resolver())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::from_toml("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert!(config.render.highlight_alias);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn overrides_take_precedence() {
        let defaults = RenderDefaults {
            start_level: 1,
            max_levels: 2,
            ..RenderDefaults::default()
        };
        let overrides = RenderOverrides {
            base: Some(4),
            max_levels: Some(0),
            highlight_alias: Some(false),
            ..RenderOverrides::default()
        };

        let params = defaults.params("main", &overrides);
        assert_eq!(params.base, Some(MenuId(4)));
        assert_eq!(params.start_level, 1);
        assert_eq!(params.max_levels, 0);
        assert!(!params.highlight_alias);
        assert!(params.highlight_parent_alias);
    }

    #[test]
    fn invalid_toml_is_a_serialization_error() {
        let err = AppConfig::from_toml("[render\nstart_level = 1").expect_err("invalid");
        assert!(matches!(err, MenuError::SerializationError(_)));
    }
}
