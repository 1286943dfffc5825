//! # Menu Renderer
//!
//! Drives one render: resolve the base, fetch nodes, merge, and attach the
//! trail snapshot and cache id.
//!
//! ```text
//! BaseResolver -> MenuPlatform::fetch_nodes -> MenuTreeBuilder::build
//!              -> TrailEvaluator + cache_id -> RenderedMenu
//! ```

use crate::base::{BaseOutcome, BaseResolver};
use crate::builder::{MenuTreeBuilder, Reconciliation};
use crate::cache::{CacheKey, cache_id};
use crate::identity::IdentityConflict;
use crate::links::{LinkContext, LinkResolver};
use crate::path_map::PathMap;
use crate::platform::{FetchOptions, MenuPlatform};
use crate::request::{MenuParams, RequestContext};
use crate::trail::TrailEvaluator;
use crate::{Item, MenuError, MenuId, StoredItems};
use serde::Serialize;

/// Result of one render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedMenu {
    pub menu: String,
    /// Base node the render was confined to.
    pub base: Option<MenuId>,
    pub items: Vec<Item>,
    pub renames: PathMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<IdentityConflict>,
    pub cache_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<CacheKey>,
    pub trail: TrailEvaluator,
}

impl RenderedMenu {
    /// The empty result of an aborted render.
    fn aborted(params: &MenuParams, ctx: &RequestContext) -> Self {
        Self {
            menu: params.menu.clone(),
            base: None,
            items: Vec::new(),
            renames: PathMap::new(),
            conflicts: Vec::new(),
            cache_id: cache_id(ctx.anonymous, None),
            cache_key: None,
            trail: TrailEvaluator::default(),
        }
    }

    /// True when nothing was rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `item` lies on the path to the displayed page.
    #[must_use]
    pub fn is_active(&self, item: &Item) -> bool {
        self.trail.is_active(item)
    }

    /// Whether `item` is the displayed page.
    #[must_use]
    pub fn is_current(&self, item: &Item) -> bool {
        self.trail.is_current(item)
    }
}

/// Renders menus of any [`MenuPlatform`].
#[derive(Debug, Clone, Default)]
pub struct MenuRenderer {
    builder: MenuTreeBuilder,
}

impl MenuRenderer {
    #[must_use]
    pub fn new(links: LinkResolver) -> Self {
        Self {
            builder: MenuTreeBuilder::new(links),
        }
    }

    /// Render `params.menu` for the caller described by `ctx`.
    ///
    /// An empty menu name targets the active menu, then the default one.
    /// Without a base a non-privileged render yields an empty result, not an
    /// error. Integrity errors of the platform data propagate.
    pub fn render<P: MenuPlatform + ?Sized>(
        &self,
        platform: &P,
        params: &MenuParams,
        stored: &StoredItems,
        ctx: &RequestContext,
    ) -> Result<RenderedMenu, MenuError> {
        let window = params.window();
        window.validate()?;

        let params = &MenuParams {
            menu: platform.resolve_menu(&params.menu).unwrap_or_default(),
            ..params.clone()
        };

        let base = match BaseResolver::resolve(platform, params.base, ctx.privileged) {
            BaseOutcome::Node(node) => Some(node),
            BaseOutcome::Unbased => None,
            BaseOutcome::Abort => return Ok(RenderedMenu::aborted(params, ctx)),
        };
        let active = platform.active();

        let nodes = platform.fetch_nodes(&params.menu, &FetchOptions::for_context(ctx))?;

        let builder = self.builder_for(ctx);
        let Reconciliation {
            items,
            renames,
            conflicts,
        } = builder.build(&nodes, stored, base.as_ref(), window);

        let base_id = base.as_ref().map(|node| node.id);
        Ok(RenderedMenu {
            menu: params.menu.clone(),
            base: base_id,
            items,
            renames,
            conflicts,
            cache_id: cache_id(ctx.anonymous, active.as_ref().map(|node| node.id)),
            cache_key: Some(CacheKey::new(params, &ctx.access_levels, base_id)),
            trail: TrailEvaluator::new(
                base.as_ref(),
                active.as_ref(),
                params.highlight_alias,
                params.highlight_parent_alias,
            ),
        })
    }

    /// The builder, with the request's language when it carries one.
    fn builder_for(&self, ctx: &RequestContext) -> MenuTreeBuilder {
        let Some(language) = ctx.language.clone() else {
            return self.builder.clone();
        };
        let context = LinkContext {
            language: Some(language),
            ..self.builder.links().context().clone()
        };
        MenuTreeBuilder::new(self.builder.links().with_context(context))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::QueryLinkScheme;
    use crate::platform::{FlatMenu, FlatMenuSource, FlatRecord};
    use crate::{ItemType, NativeMenuNode, StoredItem};

    fn platform() -> FlatMenuSource {
        let nodes = vec![
            NativeMenuNode::new(MenuId(1), ItemType::Component, "home").with_title("Home"),
            NativeMenuNode::new(MenuId(2), ItemType::Component, "home/team")
                .with_ancestors(vec![MenuId(1)])
                .with_title("Team"),
            NativeMenuNode::new(MenuId(3), ItemType::Alias, "shortcut")
                .with_title("Shortcut")
                .with_alias_target(MenuId(1)),
        ];
        FlatMenuSource::new()
            .with_menu(
                "main",
                FlatMenu {
                    title: "Main".into(),
                    description: String::new(),
                    items: nodes.into_iter().map(FlatRecord::public).collect(),
                },
            )
            .expect("valid")
    }

    #[test]
    fn aborts_quietly_without_base() {
        let rendered = MenuRenderer::default()
            .render(
                &platform(),
                &MenuParams::new("main"),
                &StoredItems::new(),
                &RequestContext::default(),
            )
            .expect("render");
        assert!(rendered.is_empty());
        assert_eq!(rendered.cache_id, Some(0));
    }

    #[test]
    fn privileged_renders_without_base() {
        let rendered = MenuRenderer::default()
            .render(
                &platform(),
                &MenuParams::new("main"),
                &StoredItems::new(),
                &RequestContext::privileged(),
            )
            .expect("render");
        assert_eq!(rendered.items.len(), 3);
        assert_eq!(rendered.base, None);
        assert_eq!(rendered.cache_id, None);
    }

    #[test]
    fn renders_under_active_node() {
        let source = platform().with_active(MenuId(2));
        let mut stored = StoredItems::new();
        stored.insert("team", StoredItem::with_id(MenuId(2)).title("Our Team"));

        let rendered = MenuRenderer::default()
            .render(
                &source,
                &MenuParams::new("main"),
                &stored,
                &RequestContext::default(),
            )
            .expect("render");

        assert_eq!(rendered.base, Some(MenuId(2)));
        assert_eq!(rendered.cache_id, Some(2));
        assert_eq!(rendered.items[1].title, "Our Team");
        assert_eq!(rendered.renames.get("team/path"), Some("home/team"));

        let home = &rendered.items[0];
        let shortcut = &rendered.items[2];
        assert!(rendered.is_active(home));
        assert!(rendered.is_current(&rendered.items[1]));
        assert!(rendered.is_active(shortcut));
        assert!(!rendered.is_current(shortcut));
    }

    #[test]
    fn unnamed_menu_targets_active_menu() {
        let source = platform().with_active(MenuId(2));

        let rendered = MenuRenderer::default()
            .render(
                &source,
                &MenuParams::new(""),
                &StoredItems::new(),
                &RequestContext::default(),
            )
            .expect("render");

        assert_eq!(rendered.menu, "main");
        assert_eq!(rendered.items.len(), 3);
        assert_eq!(
            rendered.cache_key,
            Some(CacheKey::new(&MenuParams::new("main"), &[], Some(MenuId(2))))
        );
    }

    #[test]
    fn explicit_base_overrides_active() {
        let source = platform().with_active(MenuId(2));
        let rendered = MenuRenderer::default()
            .render(
                &source,
                &MenuParams::new("main").with_base(MenuId(3)),
                &StoredItems::new(),
                &RequestContext::default(),
            )
            .expect("render");
        assert_eq!(rendered.base, Some(MenuId(3)));
    }

    #[test]
    fn request_language_reaches_alias_links() {
        let scheme = QueryLinkScheme {
            language_param: Some("lang".into()),
            ..QueryLinkScheme::default()
        };
        let renderer = MenuRenderer::new(LinkResolver::new(scheme, LinkContext::default()));
        let ctx = RequestContext {
            language: Some("fr-FR".into()),
            ..RequestContext::privileged()
        };

        let rendered = renderer
            .render(&platform(), &MenuParams::new("main"), &StoredItems::new(), &ctx)
            .expect("render");
        assert_eq!(
            rendered.items[2].url.as_deref(),
            Some("index.php?Itemid=1&lang=fr-FR")
        );
    }

    #[test]
    fn absurd_window_is_rejected() {
        let err = MenuRenderer::default()
            .render(
                &platform(),
                &MenuParams::new("main").with_window(1000, 0),
                &StoredItems::new(),
                &RequestContext::privileged(),
            )
            .expect_err("window");
        assert!(matches!(err, MenuError::InvalidRequest(_)));
    }
}
