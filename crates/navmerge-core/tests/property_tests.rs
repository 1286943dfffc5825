//! # Property-Based Tests
//!
//! Reconciliation invariants checked with proptest over random menu trees.
//!
//! These tests ensure determinism and correctness invariants.

use navmerge_core::{
    ItemType, LevelWindow, LinkResolver, MenuId, MenuTreeBuilder, NativeMenuNode, StoredItem,
    StoredItems, TrailEvaluator, canonicalize,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::BTreeMap;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Build a tree from parent choices: node `i` hangs under one of the nodes
/// before it, or at the root.
fn tree(parents: &[Option<Index>]) -> Vec<NativeMenuNode> {
    let mut nodes: Vec<NativeMenuNode> = Vec::with_capacity(parents.len());

    for (i, choice) in parents.iter().enumerate() {
        let id = MenuId(i as u64 + 1);
        let parent = choice.as_ref().filter(|_| i > 0).map(|idx| &nodes[idx.index(i)]);

        let node = match parent {
            Some(parent) => NativeMenuNode::new(
                id,
                ItemType::Component,
                format!("{}/n{}", parent.route, id),
            )
            .with_ancestors(parent.trail()),
            None => NativeMenuNode::new(id, ItemType::Component, format!("n{id}")),
        };
        nodes.push(node);
    }

    nodes
}

fn parents() -> impl Strategy<Value = Vec<Option<Index>>> {
    vec(proptest::option::of(any::<Index>()), 1..40)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Entries saved under the node's current path never produce renames.
    #[test]
    fn identity_stability(parents in parents(), keep in vec(any::<bool>(), 40)) {
        let nodes = tree(&parents);
        let stored: StoredItems = nodes
            .iter()
            .zip(keep.iter())
            .filter(|(_, keep)| **keep)
            .map(|(node, _)| (node.route.clone(), StoredItem::with_id(node.id).title("S")))
            .collect();

        let result = MenuTreeBuilder::default().build(
            &nodes,
            &stored,
            None,
            LevelWindow::unbounded(),
        );

        prop_assert!(result.renames.is_empty());
        for item in &result.items {
            let expected = if stored.get(&item.path).is_some() { "S".to_string() } else { String::new() };
            prop_assert_eq!(&item.title, &expected);
        }
    }

    /// A drifted entry yields exactly one rename to the fresh path.
    #[test]
    fn drift_detection(parents in parents(), pick in any::<Index>()) {
        let nodes = tree(&parents);
        let target = &nodes[pick.index(nodes.len())];
        let old_path = format!("moved/{}", target.route);

        let mut stored = StoredItems::new();
        stored.insert(old_path.clone(), StoredItem::with_id(target.id));

        let result = MenuTreeBuilder::default().build(
            &nodes,
            &stored,
            None,
            LevelWindow::unbounded(),
        );

        prop_assert_eq!(result.renames.len(), 1);
        let rename = result.renames.renames().next().expect("one rename");
        prop_assert_eq!(&rename.old_path, &old_path);
        prop_assert_eq!(&rename.new_path, &target.route);
    }

    /// Canonicalization is idempotent on arbitrary strings.
    #[test]
    fn canonicalize_idempotent(raw in "[a-z0-9=?&;#. ]{0,40}|(&amp;|&|\\?|x=1|;){0,12}") {
        let once = canonicalize(&raw);
        prop_assert_eq!(canonicalize(&once), once);
    }

    /// Resolving an already resolved internal link changes nothing.
    #[test]
    fn resolve_idempotent(
        tail in "(&amp;|&|\\?|[a-z]{1,4}=[0-9]{1,2}|Itemid=7){0,8}",
        internal in any::<bool>(),
    ) {
        let raw = if internal { format!("index.php?{tail}") } else { tail };
        let node = NativeMenuNode::new(MenuId(5), ItemType::Component, "r");
        let resolver = LinkResolver::default();

        let first = resolver.resolve(&ItemType::Component, &raw, &node).url.expect("linked");
        let second = resolver.resolve(&ItemType::Component, &first, &node).url.expect("linked");
        prop_assert_eq!(first, second);
    }

    /// Windows starting below the first level stay inside the base subtree.
    #[test]
    fn window_containment(
        parents in parents(),
        base in any::<Index>(),
        start in 2usize..6,
        max in 0usize..4,
    ) {
        let nodes = tree(&parents);
        let base = &nodes[base.index(nodes.len())];
        let by_id: BTreeMap<MenuId, &NativeMenuNode> = nodes.iter().map(|n| (n.id, n)).collect();

        let result = MenuTreeBuilder::default().build(
            &nodes,
            &StoredItems::new(),
            Some(base),
            LevelWindow::new(start, max),
        );

        let trail = base.trail();
        for item in &result.items {
            let node = by_id[&item.id];
            prop_assert!(item.level >= start);
            prop_assert!(trail.contains(&node.ancestors[start - 2]));
        }
    }

    /// Trail membership follows ids and alias highlight flags exactly.
    #[test]
    fn trail_correctness(
        parents in parents(),
        base in any::<Index>(),
        aliases in vec(proptest::option::of(any::<Index>()), 40),
        highlight_alias in any::<bool>(),
        highlight_parent_alias in any::<bool>(),
    ) {
        let mut nodes = tree(&parents);
        let count = nodes.len();
        for (node, alias) in nodes.iter_mut().zip(aliases.iter()) {
            if let Some(target) = alias {
                node.item_type = ItemType::Alias;
                node.alias_target = Some(MenuId(target.index(count) as u64 + 1));
            }
        }
        let base = nodes[base.index(count)].clone();
        let trail = base.trail();

        let result = MenuTreeBuilder::default().build(
            &nodes,
            &StoredItems::new(),
            Some(&base),
            LevelWindow::unbounded(),
        );
        let eval = TrailEvaluator::new(Some(&base), None, highlight_alias, highlight_parent_alias);

        for item in &result.items {
            let via_alias = match (item.item_type == ItemType::Alias, item.alias_target) {
                (true, Some(target)) => {
                    if trail.last() == Some(&target) {
                        highlight_alias
                    } else {
                        highlight_parent_alias && trail.contains(&target)
                    }
                }
                _ => false,
            };
            prop_assert_eq!(eval.is_active(item), trail.contains(&item.id) || via_alias);
        }
    }

    /// Same inputs, same outputs.
    #[test]
    fn merge_deterministic(parents in parents(), drift in vec(any::<bool>(), 40)) {
        let nodes = tree(&parents);
        let stored: StoredItems = nodes
            .iter()
            .zip(drift.iter())
            .map(|(node, drifted)| {
                let path = if *drifted { format!("old/{}", node.route) } else { node.route.clone() };
                (path, StoredItem::with_id(node.id))
            })
            .collect();

        let builder = MenuTreeBuilder::default();
        let a = builder.build(&nodes, &stored, None, LevelWindow::unbounded());
        let b = builder.build(&nodes, &stored, None, LevelWindow::unbounded());

        prop_assert_eq!(a.items, b.items);
        prop_assert_eq!(a.renames, b.renames);
        prop_assert!(a.conflicts.is_empty());
    }
}
