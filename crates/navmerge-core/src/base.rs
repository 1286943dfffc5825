//! # Base Resolver
//!
//! Picks the subtree root a render is confined to.

use crate::platform::MenuPlatform;
use crate::{MenuId, NativeMenuNode};

/// Outcome of base resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseOutcome {
    /// Render under this node.
    Node(NativeMenuNode),
    /// No base, but the caller is privileged: render without one.
    Unbased,
    /// No base and not privileged: the render yields nothing.
    Abort,
}

/// Resolves the base node from an explicit override, the active node or
/// the configured default, in that order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseResolver;

impl BaseResolver {
    /// First present candidate.
    ///
    /// `explicit` only counts when it resolved to a real node.
    #[must_use]
    pub fn choose(
        explicit: Option<NativeMenuNode>,
        active: Option<NativeMenuNode>,
        default: Option<NativeMenuNode>,
    ) -> Option<NativeMenuNode> {
        explicit.or(active).or(default)
    }

    /// Resolve against `platform` and decide how the render proceeds.
    pub fn resolve<P: MenuPlatform + ?Sized>(
        platform: &P,
        explicit: Option<MenuId>,
        privileged: bool,
    ) -> BaseOutcome {
        let explicit = explicit.and_then(|id| platform.node(id));
        match Self::choose(explicit, platform.active(), platform.default_node()) {
            Some(node) => BaseOutcome::Node(node),
            None if privileged => BaseOutcome::Unbased,
            None => BaseOutcome::Abort,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
