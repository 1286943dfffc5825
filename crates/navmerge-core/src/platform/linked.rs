//! # Linked Menu Source
//!
//! Adapter for platforms whose menu records only point at their parent,
//! listed in sibling order.
//!
//! ## Flattening
//!
//! Records are flattened once, when the source is built, in two passes
//! over freshly allocated data:
//!
//! 1. Index every record and group record positions per parent. A parent
//!    pointer to an unknown record fails here.
//! 2. Walk the groups depth first with an explicit stack, emitting nodes
//!    with their ancestor chain, level and slug route.
//!
//! Records never reached by the walk sit on a parent cycle.

use super::{FetchOptions, MenuDescriptor, MenuPlatform};
use crate::primitives::{MAX_MENU_DEPTH, MAX_MENU_NODES, PARTICLE_LINK_PREFIX, PATH_SEPARATOR, TARGET_BLANK};
use crate::{BrowserNav, DisplayParams, ItemType, MenuError, MenuId, NativeMenuNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Publication state of a linked record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Publish,
    Draft,
}

/// One record of a linked menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedRecord {
    pub id: MenuId,
    /// Parent record. Absent or `0` for top-level records.
    #[serde(default)]
    pub parent: Option<MenuId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub attr_title: String,
    #[serde(default)]
    pub xfn: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// The record of the displayed page.
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub status: RecordStatus,
}

impl LinkedRecord {
    #[must_use]
    pub fn new(id: MenuId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            parent: None,
            title: title.into(),
            url: url.into(),
            attr_title: String::new(),
            xfn: String::new(),
            target: String::new(),
            classes: Vec::new(),
            current: false,
            status: RecordStatus::Publish,
        }
    }

    #[must_use]
    pub fn under(mut self, parent: MenuId) -> Self {
        self.parent = Some(parent);
        self
    }

    fn parent_id(&self) -> Option<MenuId> {
        self.parent.filter(|parent| parent.value() != 0)
    }

    fn is_particle(&self) -> bool {
        self.url.starts_with(PARTICLE_LINK_PREFIX)
    }

    /// Path segment of this record.
    ///
    /// Spaces and separators become `-`. A slug made only of ASCII
    /// alphanumerics, `-` and `_` is lowercased. Particles get their id
    /// appended so that several particles may share a title.
    fn slug(&self) -> String {
        let mut slug: String = self
            .title
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == PATH_SEPARATOR { '-' } else { c })
            .collect();

        if slug.is_empty() {
            slug = self.id.to_string();
        } else if slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            slug = slug.to_ascii_lowercase();
        }

        if self.is_particle() {
            slug.push('-');
            slug.push_str(&self.id.to_string());
        }
        slug
    }
}

/// One menu of the linked platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedMenu {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<LinkedRecord>,
}

/// Serialized state of a linked platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedSnapshot {
    #[serde(default)]
    pub menus: BTreeMap<String, LinkedMenu>,
    #[serde(default)]
    pub default: Option<MenuId>,
}

/// A flattened node and whether a draft hides it.
#[derive(Debug, Clone)]
struct LinkedNode {
    node: NativeMenuNode,
    hidden: bool,
}

#[derive(Debug, Clone)]
struct FlattenedMenu {
    descriptor: MenuDescriptor,
    nodes: Vec<LinkedNode>,
}

/// In-memory linked platform, flattened at construction.
#[derive(Debug, Clone, Default)]
pub struct LinkedMenuSource {
    menus: BTreeMap<String, FlattenedMenu>,
    active: Option<MenuId>,
    default: Option<MenuId>,
}

impl LinkedMenuSource {
    /// Create an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a menu, flattening its records.
    ///
    /// The first record flagged `current` becomes the active node unless
    /// one was already found.
    pub fn with_menu(mut self, name: impl Into<String>, menu: LinkedMenu) -> Result<Self, MenuError> {
        let name = name.into();
        let nodes = flatten(&menu.items)?;

        if self.active.is_none() {
            self.active = menu
                .items
                .iter()
                .find(|record| record.current)
                .map(|record| record.id);
        }

        self.menus.insert(
            name.clone(),
            FlattenedMenu {
                descriptor: MenuDescriptor {
                    name,
                    title: menu.title,
                    description: menu.description,
                },
                nodes,
            },
        );
        Ok(self)
    }

    #[must_use]
    pub fn with_default(mut self, id: MenuId) -> Self {
        self.default = Some(id);
        self
    }

    /// Build from a decoded snapshot.
    pub fn from_snapshot(snapshot: LinkedSnapshot) -> Result<Self, MenuError> {
        let mut source = Self {
            default: snapshot.default,
            ..Self::default()
        };
        for (name, menu) in snapshot.menus {
            source = source.with_menu(name, menu)?;
        }
        Ok(source)
    }
}

struct Frame {
    index: usize,
    ancestors: Vec<MenuId>,
    prefix: String,
    hidden: bool,
}

fn flatten(records: &[LinkedRecord]) -> Result<Vec<LinkedNode>, MenuError> {
    if records.len() > MAX_MENU_NODES {
        return Err(MenuError::InvalidRequest(format!(
            "menu has {} items, maximum is {}",
            records.len(),
            MAX_MENU_NODES
        )));
    }

    // Pass 1: index records and group them under their parents.
    let mut known = BTreeSet::new();
    for record in records {
        if !known.insert(record.id) {
            return Err(MenuError::InvalidRequest(format!(
                "menu lists item {} twice",
                record.id
            )));
        }
    }

    let mut children: BTreeMap<Option<MenuId>, Vec<usize>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        let parent = record.parent_id();
        if let Some(parent) = parent {
            if !known.contains(&parent) {
                return Err(MenuError::Configuration { missing: parent });
            }
        }
        children.entry(parent).or_default().push(index);
    }

    // Pass 2: depth-first emission.
    let mut stack: Vec<Frame> = children
        .get(&None)
        .map(|roots| {
            roots
                .iter()
                .rev()
                .map(|&index| Frame {
                    index,
                    ancestors: Vec::new(),
                    prefix: String::new(),
                    hidden: false,
                })
                .collect()
        })
        .unwrap_or_default();

    let mut emitted = Vec::with_capacity(records.len());
    let mut visited = BTreeSet::new();

    while let Some(frame) = stack.pop() {
        let record = &records[frame.index];
        if frame.ancestors.len() > MAX_MENU_DEPTH {
            return Err(MenuError::InvalidRequest(format!(
                "item {} is nested deeper than {} levels",
                record.id, MAX_MENU_DEPTH
            )));
        }

        let slug = record.slug();
        let route = if frame.prefix.is_empty() {
            slug.clone()
        } else {
            format!("{}{}{}", frame.prefix, PATH_SEPARATOR, slug)
        };
        let hidden = frame.hidden || record.status == RecordStatus::Draft;

        if let Some(kids) = children.get(&Some(record.id)) {
            let mut chain = frame.ancestors.clone();
            chain.push(record.id);
            for &kid in kids.iter().rev() {
                stack.push(Frame {
                    index: kid,
                    ancestors: chain.clone(),
                    prefix: route.clone(),
                    hidden,
                });
            }
        }

        visited.insert(record.id);
        emitted.push(LinkedNode {
            node: to_node(record, frame.ancestors, route, slug),
            hidden,
        });
    }

    if let Some(looping) = records.iter().find(|record| !visited.contains(&record.id)) {
        return Err(MenuError::Cycle { id: looping.id });
    }

    Ok(emitted)
}

fn to_node(record: &LinkedRecord, ancestors: Vec<MenuId>, route: String, slug: String) -> NativeMenuNode {
    let item_type = if record.is_particle() {
        ItemType::Particle
    } else {
        ItemType::Url
    };
    let browser_nav = if record.target == TARGET_BLANK {
        BrowserNav::NewWindow
    } else {
        BrowserNav::Parent
    };
    let anchor_css = record
        .classes
        .iter()
        .map(|class| class.trim())
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut node = NativeMenuNode::new(record.id, item_type, route)
        .with_ancestors(ancestors)
        .with_title(record.title.clone())
        .with_link(record.url.clone());
    node.alias = slug;
    node.browser_nav = browser_nav;
    node.display = DisplayParams {
        anchor_title: record.attr_title.clone(),
        anchor_rel: record.xfn.clone(),
        anchor_css,
        ..DisplayParams::default()
    };
    node
}

impl MenuPlatform for LinkedMenuSource {
    fn fetch_nodes(
        &self,
        menu: &str,
        options: &FetchOptions,
    ) -> Result<Vec<NativeMenuNode>, MenuError> {
        let Some(menu) = self.menus.get(menu) else {
            return Ok(Vec::new());
        };
        Ok(menu
            .nodes
            .iter()
            .filter(|entry| options.unfiltered || !entry.hidden)
            .map(|entry| entry.node.clone())
            .collect())
    }

    fn node(&self, id: MenuId) -> Option<NativeMenuNode> {
        self.menus
            .values()
            .flat_map(|menu| menu.nodes.iter())
            .find(|entry| entry.node.id == id)
            .map(|entry| entry.node.clone())
    }

    fn active(&self) -> Option<NativeMenuNode> {
        self.active.and_then(|id| self.node(id))
    }

    fn default_node(&self) -> Option<NativeMenuNode> {
        self.default.and_then(|id| self.node(id))
    }

    fn menus(&self) -> Vec<MenuDescriptor> {
        self.menus
            .values()
            .map(|menu| menu.descriptor.clone())
            .collect()
    }

    fn menu_of(&self, id: MenuId) -> Option<String> {
        self.menus
            .values()
            .find(|menu| menu.nodes.iter().any(|entry| entry.node.id == id))
            .map(|menu| menu.descriptor.name.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(items: Vec<LinkedRecord>) -> LinkedMenu {
        LinkedMenu {
            title: "Primary".into(),
            description: String::new(),
            items,
        }
    }

    fn fetch_all(source: &LinkedMenuSource) -> Vec<NativeMenuNode> {
        source
            .fetch_nodes("primary", &FetchOptions::unfiltered())
            .expect("fetch")
    }

    #[test]
    fn flattens_depth_first_in_sibling_order() {
        let source = LinkedMenuSource::new()
            .with_menu(
                "primary",
                menu(vec![
                    LinkedRecord::new(MenuId(3), "Team", "/team").under(MenuId(1)),
                    LinkedRecord::new(MenuId(1), "About", "/about"),
                    LinkedRecord::new(MenuId(2), "Blog", "/blog"),
                    LinkedRecord::new(MenuId(4), "Jobs", "/jobs").under(MenuId(3)),
                ]),
            )
            .expect("valid");

        let nodes = fetch_all(&source);
        let order: Vec<u64> = nodes.iter().map(|n| n.id.value()).collect();
        assert_eq!(order, vec![1, 3, 4, 2]);

        let jobs = &nodes[2];
        assert_eq!(jobs.ancestors, vec![MenuId(1), MenuId(3)]);
        assert_eq!(jobs.level, 2);
        assert_eq!(jobs.route, "about/team/jobs");
        assert_eq!(jobs.alias, "jobs");
    }

    #[test]
    fn slugs_follow_title_rules() {
        assert_eq!(LinkedRecord::new(MenuId(1), "Our Team", "").slug(), "our-team");
        assert_eq!(LinkedRecord::new(MenuId(1), "A/B", "").slug(), "a-b");
        assert_eq!(LinkedRecord::new(MenuId(1), "Café Menu", "").slug(), "Café-Menu");
        assert_eq!(LinkedRecord::new(MenuId(8), "", "").slug(), "8");
        assert_eq!(
            LinkedRecord::new(MenuId(7), "Login", "#particle-login").slug(),
            "login-7"
        );
    }

    #[test]
    fn particles_and_display_fields() {
        let mut record = LinkedRecord::new(MenuId(5), "Search", "#particle-search");
        record.classes = vec!["one".into(), " ".into(), "two".into()];
        record.target = "_blank".into();
        record.xfn = "nofollow".into();

        let source = LinkedMenuSource::new()
            .with_menu("primary", menu(vec![record]))
            .expect("valid");
        let node = &fetch_all(&source)[0];

        assert_eq!(node.item_type, ItemType::Particle);
        assert_eq!(node.display.anchor_css, "one two");
        assert_eq!(node.display.anchor_rel, "nofollow");
        assert_eq!(node.browser_nav, BrowserNav::NewWindow);
    }

    #[test]
    fn unknown_parent_is_a_configuration_error() {
        let err = LinkedMenuSource::new()
            .with_menu(
                "primary",
                menu(vec![LinkedRecord::new(MenuId(2), "Orphan", "/o").under(MenuId(9))]),
            )
            .expect_err("missing parent");
        assert!(matches!(err, MenuError::Configuration { missing } if missing == MenuId(9)));
        assert_eq!(err.to_string(), "Menu item parent (9) cannot be found");
    }

    #[test]
    fn parent_cycle_is_detected() {
        let err = LinkedMenuSource::new()
            .with_menu(
                "primary",
                menu(vec![
                    LinkedRecord::new(MenuId(1), "Root", "/"),
                    LinkedRecord::new(MenuId(2), "A", "/a").under(MenuId(3)),
                    LinkedRecord::new(MenuId(3), "B", "/b").under(MenuId(2)),
                ]),
            )
            .expect_err("cycle");
        assert!(matches!(err, MenuError::Cycle { id } if id == MenuId(2)));
    }

    #[test]
    fn zero_parent_means_top_level() {
        let source = LinkedMenuSource::new()
            .with_menu(
                "primary",
                menu(vec![LinkedRecord::new(MenuId(1), "Home", "/").under(MenuId(0))]),
            )
            .expect("valid");
        assert_eq!(fetch_all(&source)[0].level, 0);
    }

    #[test]
    fn drafts_hide_their_subtree_unless_unfiltered() {
        let mut draft = LinkedRecord::new(MenuId(1), "Draft", "/d");
        draft.status = RecordStatus::Draft;
        let source = LinkedMenuSource::new()
            .with_menu(
                "primary",
                menu(vec![
                    draft,
                    LinkedRecord::new(MenuId(2), "Child", "/c").under(MenuId(1)),
                    LinkedRecord::new(MenuId(3), "Live", "/l"),
                ]),
            )
            .expect("valid");

        let visible = source
            .fetch_nodes("primary", &FetchOptions::default())
            .expect("fetch");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, MenuId(3));
        assert_eq!(fetch_all(&source).len(), 3);
    }

    #[test]
    fn current_record_is_active() {
        let mut here = LinkedRecord::new(MenuId(2), "Here", "/here");
        here.current = true;
        let source = LinkedMenuSource::new()
            .with_menu(
                "primary",
                menu(vec![LinkedRecord::new(MenuId(1), "Home", "/"), here]),
            )
            .expect("valid")
            .with_default(MenuId(1));

        assert_eq!(source.active().map(|n| n.id), Some(MenuId(2)));
        assert_eq!(source.default_node().map(|n| n.id), Some(MenuId(1)));
    }
}
