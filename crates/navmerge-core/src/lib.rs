//! # navmerge-core
//!
//! The deterministic menu reconciliation engine for navmerge - THE LOGIC.
//!
//! This crate merges the ordered menu hierarchy of a content platform with
//! persisted, user-authored configuration into one ordered list of items
//! ready for display, and reports structural drift (renames) as data.
//!
//! ## Pipeline
//!
//! ```text
//! MenuPlatform ──► BaseResolver ──► MenuTreeBuilder ──► RenderedMenu
//!                                       │    ▲
//!                         IdentityIndex ┘    └ LinkResolver
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: NO async, NO network, NO I/O, NO logging
//! - Deterministic: `BTreeMap` only, same inputs give the same outputs
//! - Caller data is never mutated; every call builds fresh values
//! - The merge exists once; platform adapters only supply data

// =============================================================================
// MODULES
// =============================================================================

pub mod base;
pub mod builder;
pub mod cache;
pub mod identity;
pub mod links;
pub mod path_map;
pub mod platform;
pub mod primitives;
pub mod renderer;
pub mod request;
pub mod trail;
pub mod types;
pub mod window;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BrowserNav, DisplayParams, Item, ItemType, MenuError, MenuId, NativeMenuNode, StoredItem,
    StoredItems,
};

// =============================================================================
// RE-EXPORTS: Reconciliation Engine
// =============================================================================

pub use base::{BaseOutcome, BaseResolver};
pub use builder::{MenuTreeBuilder, Reconciliation};
pub use cache::{CacheKey, cache_id};
pub use identity::{IdentityConflict, IdentityIndex, IdentityMatch};
pub use links::{LinkContext, LinkResolver, LinkScheme, QueryLinkScheme, canonicalize};
pub use path_map::{AppliedRenames, PathMap, PathRename, RenameCollision};
pub use renderer::{MenuRenderer, RenderedMenu};
pub use request::{MenuParams, RequestContext};
pub use trail::TrailEvaluator;
pub use window::LevelWindow;

// =============================================================================
// RE-EXPORTS: Platform (from platform module)
// =============================================================================

pub use platform::{
    FetchOptions, FlatMenuSource, LinkedMenuSource, MenuCatalog, MenuDescriptor, MenuPlatform,
    PlatformSnapshot, grouped_items,
};
