//! # Primitives
//!
//! Hardcoded constants for the navmerge reconciliation engine.
//!
//! These are compiled into the binary and are immutable at runtime.
//! Collaborator-specific addressing (entry prefix, item parameter) has a
//! default here but is configurable through `QueryLinkScheme`.

/// Separator between segments of a hierarchical path.
pub const PATH_SEPARATOR: char = '/';

/// Connector inserted between path segments when a rename is expressed
/// against a nested configuration tree.
pub const CHILDREN_SEGMENT: &str = "children";

/// Terminal key of a rename record in a nested configuration tree.
pub const PATH_KEY: &str = "path";

/// Anchor target for in-page (parent window) navigation.
pub const TARGET_SELF: &str = "_self";

/// Anchor target for new-window navigation.
pub const TARGET_BLANK: &str = "_blank";

/// Raw links that mark a custom entry as a placeholder.
///
/// A custom entry whose link is one of these is emitted as a separator.
pub const PLACEHOLDER_LINKS: [&str; 2] = ["", "#"];

/// Link prefix marking a custom entry as an embedded particle.
///
/// The rest of the link names the particle kind: `#particle-search`.
pub const PARTICLE_LINK_PREFIX: &str = "#particle-";

/// Option key carrying the kind of a newly seeded particle.
pub const PARTICLE_KIND_OPTION: &str = "particle_kind";

/// Default prefix of an internal platform link.
pub const DEFAULT_ENTRY_PREFIX: &str = "index.php?";

/// Default query parameter carrying a menu item's identity.
pub const DEFAULT_ITEM_PARAM: &str = "Itemid";

/// Query parameter carrying the output format hint.
pub const FORMAT_PARAM: &str = "format";

/// Language tag meaning "all languages".
pub const ALL_LANGUAGES: &str = "*";

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum number of nodes accepted for a single menu.
///
/// Snapshots larger than this are rejected by the platform adapters.
pub const MAX_MENU_NODES: usize = 10_000;

/// Maximum depth of a menu tree.
///
/// Bounds the depth-first flattening of linked records.
pub const MAX_MENU_DEPTH: usize = 64;
