//! # Render Events
//!
//! Structured log events emitted after a render, shared by the CLI and the
//! HTTP API.
//!
//! | event               | level | fields                          |
//! |---------------------|-------|---------------------------------|
//! | `menu_rendered`     | info  | menu, items, renames, cacheable |
//! | `path_renamed`      | info  | menu, old_path, new_path        |
//! | `identity_conflict` | warn  | menu, id, kept, ignored         |

use navmerge_core::RenderedMenu;

/// Emit the events describing one render.
pub fn log_rendered(rendered: &RenderedMenu) {
    for rename in rendered.renames.renames() {
        tracing::info!(
            event = "path_renamed",
            menu = %rendered.menu,
            old_path = %rename.old_path,
            new_path = %rename.new_path,
            "Stored entry moved"
        );
    }

    for conflict in &rendered.conflicts {
        tracing::warn!(
            event = "identity_conflict",
            menu = %rendered.menu,
            id = conflict.id.value(),
            kept = %conflict.kept,
            ignored = %conflict.ignored,
            "Identity hint claimed twice"
        );
    }

    tracing::info!(
        event = "menu_rendered",
        menu = %rendered.menu,
        items = rendered.items.len(),
        renames = rendered.renames.len(),
        cacheable = rendered.cache_id.is_some(),
        "Menu rendered"
    );
}
