//! # Level Window
//!
//! Confines a render to a band of tree levels below the base node.

use crate::primitives::MAX_MENU_DEPTH;
use crate::{MenuError, MenuId, NativeMenuNode};
use serde::{Deserialize, Serialize};

/// Band of levels eligible for output.
///
/// `start = 0` disables the lower bound and `max = 0` the upper one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelWindow {
    pub start: usize,
    pub max: usize,
}

impl LevelWindow {
    /// Create a window starting at `start` and spanning `max` levels.
    #[must_use]
    pub const fn new(start: usize, max: usize) -> Self {
        Self { start, max }
    }

    /// The unbounded window.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { start: 0, max: 0 }
    }

    /// Reject windows deeper than any menu can be.
    pub fn validate(&self) -> Result<(), MenuError> {
        if self.start > MAX_MENU_DEPTH || self.max > MAX_MENU_DEPTH {
            return Err(MenuError::InvalidRequest(format!(
                "level window ({}, {}) exceeds maximum depth {}",
                self.start, self.max, MAX_MENU_DEPTH
            )));
        }
        Ok(())
    }

    /// Last admitted level, `None` when unbounded.
    #[must_use]
    pub const fn end(&self) -> Option<usize> {
        if self.max > 0 {
            Some(self.start.saturating_add(self.max - 1))
        } else {
            None
        }
    }

    /// Whether `node` falls inside the window.
    ///
    /// Once the window starts below the first level, the node's ancestor at
    /// chain position `start - 2` must lie on `base_trail`, which confines
    /// the output to the base node's subtree. A missing chain position
    /// counts as "not on the trail".
    #[must_use]
    pub fn admits(&self, node: &NativeMenuNode, base_trail: &[MenuId]) -> bool {
        if self.start > 0 && node.level < self.start {
            return false;
        }

        if let Some(end) = self.end() {
            if node.level > end {
                return false;
            }
        }

        if self.start > 1 {
            let anchored = node
                .ancestors
                .get(self.start - 2)
                .is_some_and(|ancestor| base_trail.contains(ancestor));
            if !anchored {
                return false;
            }
        }

        true
    }
}

// =============================================================================
// TESTS
// =============================================================================
