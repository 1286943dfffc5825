//! # Menu Tree Builder
//!
//! The reconciliation algorithm. Merges the platform's ordered node list
//! with persisted configuration into the output item list.
//!
//! ## Per-node pipeline
//!
//! 1. Level window filter
//! 2. Baseline from platform data only
//! 3. Identity merge (stored entry whose hint equals the node id), with
//!    rename tracking when the saved path drifted
//! 4. Otherwise, route merge (stored entry saved under the node's route)
//! 5. Defaulting of unset attributes from the baseline
//! 6. Link resolution
//!
//! Input order is authoritative and preserved. Steps 3 and 4 are mutually
//! exclusive per node: once an identity match occurs the route is never
//! consulted.

use crate::identity::{IdentityConflict, IdentityIndex};
use crate::links::LinkResolver;
use crate::path_map::PathMap;
use crate::primitives::{PARTICLE_KIND_OPTION, PARTICLE_LINK_PREFIX};
use crate::window::LevelWindow;
use crate::{Item, ItemType, NativeMenuNode, StoredItem, StoredItems};
use std::collections::BTreeMap;

/// Output of one merge.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub items: Vec<Item>,
    /// Renames to persist. Empty when no identity drift occurred.
    pub renames: PathMap,
    /// Stored entries whose identity hint was already claimed.
    pub conflicts: Vec<IdentityConflict>,
}

/// Platform-only attributes of one node.
#[derive(Debug, Clone)]
struct Baseline {
    item_type: ItemType,
    title: String,
    link: String,
    link_title: String,
    rel: String,
    enabled: bool,
    anchor_class: String,
    image: String,
    icon_only: bool,
    target: String,
}

impl Baseline {
    fn from_node(node: &NativeMenuNode) -> Self {
        Self {
            item_type: node.item_type.clone(),
            title: node.title.clone(),
            link: node.link.clone(),
            link_title: node.display.anchor_title.clone(),
            rel: node.display.anchor_rel.clone(),
            enabled: node.display.visible,
            anchor_class: node.display.anchor_css.clone(),
            image: node.display.image.clone(),
            icon_only: !node.display.show_text,
            target: node.browser_nav.target().to_string(),
        }
    }
}

/// Builds merged menus. Holds no per-call state.
#[derive(Debug, Clone, Default)]
pub struct MenuTreeBuilder {
    links: LinkResolver,
}

impl MenuTreeBuilder {
    /// Create a builder resolving links with `links`.
    #[must_use]
    pub fn new(links: LinkResolver) -> Self {
        Self { links }
    }

    #[must_use]
    pub fn links(&self) -> &LinkResolver {
        &self.links
    }

    /// Merge `nodes` with `stored`, confined to `window` under `base`.
    ///
    /// Without a base the trail is empty, so windows starting below the
    /// first level admit nothing.
    #[must_use]
    pub fn build(
        &self,
        nodes: &[NativeMenuNode],
        stored: &StoredItems,
        base: Option<&NativeMenuNode>,
        window: LevelWindow,
    ) -> Reconciliation {
        let index = IdentityIndex::build(stored);
        let base_trail = base.map(NativeMenuNode::trail).unwrap_or_default();

        let mut items = Vec::with_capacity(nodes.len());
        let mut renames = PathMap::new();

        for node in nodes {
            if !window.admits(node, &base_trail) {
                continue;
            }

            let overlay = match index.get(node.id) {
                Some(found) => {
                    if found.path != node.route {
                        renames.record(found.path, node.route.as_str());
                    }
                    Some(found.item)
                }
                None => stored.get(&node.route),
            };

            items.push(self.merge(node, Baseline::from_node(node), overlay));
        }

        Reconciliation {
            items,
            renames,
            conflicts: index.conflicts().to_vec(),
        }
    }

    fn merge(&self, node: &NativeMenuNode, baseline: Baseline, stored: Option<&StoredItem>) -> Item {
        let Some(stored) = stored else {
            let options = particle_defaults(node);
            return self.finish(node, baseline, options);
        };

        let merged = Baseline {
            item_type: stored.item_type.clone().unwrap_or(baseline.item_type),
            title: stored.title.clone().unwrap_or(baseline.title),
            link: stored.link.clone().unwrap_or(baseline.link),
            link_title: stored.link_title.clone().unwrap_or(baseline.link_title),
            rel: stored.rel.clone().unwrap_or(baseline.rel),
            enabled: stored.enabled.unwrap_or(baseline.enabled),
            anchor_class: stored.anchor_class.clone().unwrap_or(baseline.anchor_class),
            image: stored.image.clone().unwrap_or(baseline.image),
            icon_only: stored.icon_only.unwrap_or(baseline.icon_only),
            target: stored.target.clone().unwrap_or(baseline.target),
        };

        self.finish(node, merged, stored.options.clone())
    }

    fn finish(
        &self,
        node: &NativeMenuNode,
        merged: Baseline,
        options: BTreeMap<String, serde_json::Value>,
    ) -> Item {
        let resolution = self.links.resolve(&merged.item_type, &merged.link, node);

        Item {
            id: node.id,
            path: node.route.clone(),
            item_type: resolution.item_type,
            alias: node.alias.clone(),
            level: node.level,
            parent: node.parent(),
            title: merged.title,
            link: merged.link,
            link_title: merged.link_title,
            rel: merged.rel,
            enabled: merged.enabled,
            anchor_class: merged.anchor_class,
            image: merged.image,
            icon_only: merged.icon_only,
            target: merged.target,
            alias_target: node.alias_target,
            options,
            url: resolution.url,
        }
    }
}

/// Options of a particle that has no stored configuration yet: the
/// particle kind taken from its link, disabled until configured.
fn particle_defaults(node: &NativeMenuNode) -> BTreeMap<String, serde_json::Value> {
    let mut options = BTreeMap::new();
    if node.item_type != ItemType::Particle {
        return options;
    }
    if let Some(kind) = node.link.strip_prefix(PARTICLE_LINK_PREFIX) {
        options.insert(PARTICLE_KIND_OPTION.to_string(), serde_json::json!(kind));
    }
    options.insert(
        "particle".to_string(),
        serde_json::json!({ "enabled": "0" }),
    );
    options.insert("block".to_string(), serde_json::json!({ "extra": [] }));
    options
}

// =============================================================================
// TESTS
// =============================================================================
