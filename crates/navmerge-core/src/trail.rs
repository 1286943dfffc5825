//! # Active Trail
//!
//! Answers whether an item lies on the path to the displayed page, and
//! whether it is the displayed page itself. Alias items count through
//! their target.

use crate::{Item, ItemType, MenuId, NativeMenuNode};
use serde::{Deserialize, Serialize};

/// Snapshot of one request's trail and highlight flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrailEvaluator {
    /// Root to base node, base included.
    pub trail: Vec<MenuId>,
    pub active: Option<MenuId>,
    pub highlight_alias: bool,
    pub highlight_parent_alias: bool,
}

impl TrailEvaluator {
    #[must_use]
    pub fn new(
        base: Option<&NativeMenuNode>,
        active: Option<&NativeMenuNode>,
        highlight_alias: bool,
        highlight_parent_alias: bool,
    ) -> Self {
        Self {
            trail: base.map(NativeMenuNode::trail).unwrap_or_default(),
            active: active.map(|node| node.id),
            highlight_alias,
            highlight_parent_alias,
        }
    }

    /// True when `item` is on the trail, directly or as an alias of a
    /// trail node.
    ///
    /// An alias of the last trail node follows `highlight_alias`; an alias
    /// of any earlier trail node follows `highlight_parent_alias`.
    #[must_use]
    pub fn is_active(&self, item: &Item) -> bool {
        if self.trail.contains(&item.id) {
            return true;
        }

        if item.item_type != ItemType::Alias {
            return false;
        }
        let Some(target) = item.alias_target else {
            return false;
        };

        if self.trail.last() == Some(&target) {
            return self.highlight_alias;
        }
        self.highlight_parent_alias && self.trail.contains(&target)
    }

    /// True when `item` is the displayed page, or an alias of it.
    #[must_use]
    pub fn is_current(&self, item: &Item) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        item.id == active
            || (item.item_type == ItemType::Alias && item.alias_target == Some(active))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LevelWindow, MenuTreeBuilder, StoredItems};

    fn item(node: NativeMenuNode) -> Item {
        MenuTreeBuilder::default()
            .build(&[node], &StoredItems::new(), None, LevelWindow::unbounded())
            .items
            .remove(0)
    }

    fn base() -> NativeMenuNode {
        NativeMenuNode::new(MenuId(6), ItemType::Component, "/a/b/c")
            .with_ancestors(vec![MenuId(1), MenuId(4)])
    }

    fn alias_to(target: u64) -> Item {
        item(
            NativeMenuNode::new(MenuId(9), ItemType::Alias, "/alias")
                .with_alias_target(MenuId(target)),
        )
    }

    #[test]
    fn trail_members_are_active() {
        let eval = TrailEvaluator::new(Some(&base()), None, false, false);
        let on = item(NativeMenuNode::new(MenuId(4), ItemType::Component, "/a/b"));
        let off = item(NativeMenuNode::new(MenuId(7), ItemType::Component, "/x"));
        assert!(eval.is_active(&on));
        assert!(!eval.is_active(&off));
    }

    #[test]
    fn parent_alias_follows_flag() {
        let on = TrailEvaluator::new(Some(&base()), None, false, true);
        let off = TrailEvaluator::new(Some(&base()), None, true, false);
        assert!(on.is_active(&alias_to(4)));
        assert!(!off.is_active(&alias_to(4)));
    }

    #[test]
    fn alias_of_last_follows_highlight_alias() {
        let on = TrailEvaluator::new(Some(&base()), None, true, false);
        let off = TrailEvaluator::new(Some(&base()), None, false, true);
        assert!(on.is_active(&alias_to(6)));
        assert!(!off.is_active(&alias_to(6)));
    }

    #[test]
    fn current_includes_alias_of_active() {
        let active = base();
        let eval = TrailEvaluator::new(Some(&active), Some(&active), false, false);
        assert!(eval.is_current(&item(active.clone())));
        assert!(eval.is_current(&alias_to(6)));
        assert!(!eval.is_current(&alias_to(4)));
    }

    #[test]
    fn nothing_current_without_active() {
        let eval = TrailEvaluator::new(None, None, true, true);
        assert!(!eval.is_current(&alias_to(6)));
        assert!(!eval.is_active(&alias_to(6)));
    }
}
