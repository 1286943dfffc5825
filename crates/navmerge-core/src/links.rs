//! # Link Resolution
//!
//! Type-dispatched computation of the final navigable link of a merged
//! entry.
//!
//! ## Addressing
//!
//! How an internal link names a menu node is collaborator-specific. The
//! [`LinkScheme`] trait captures those rules; [`QueryLinkScheme`] is the
//! query-string form (`index.php?Itemid=N`) with configurable names.
//!
//! ## Canonical Form
//!
//! Every internal link goes through [`canonicalize`], which is applied to
//! a fixed point and is therefore idempotent.

use crate::primitives::{
    ALL_LANGUAGES, DEFAULT_ENTRY_PREFIX, DEFAULT_ITEM_PARAM, FORMAT_PARAM, PLACEHOLDER_LINKS,
};
use crate::{ItemType, MenuId, NativeMenuNode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// LINK CONTEXT
// =============================================================================

/// Request-level inputs to link synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkContext {
    /// Language of the current request. `None` or `*` means "not localized".
    #[serde(default)]
    pub language: Option<String>,
    /// The platform wants search-engine-friendly suffixes.
    #[serde(default)]
    pub sef_suffix: bool,
}

// =============================================================================
// LINK SCHEME TRAIT
// =============================================================================

/// Addressing rules of the platform collaborator.
pub trait LinkScheme: Send + Sync {
    /// True when `link` is already in the native internal-navigation form.
    fn is_internal(&self, link: &str) -> bool;

    /// True when `link` already carries a menu item identity.
    fn references_item(&self, link: &str) -> bool;

    /// Append `id` to an internal link as its identity parameter.
    fn append_item(&self, link: &str, id: MenuId) -> String;

    /// The canonical internal link of a node, with an optional output
    /// format hint.
    fn item_link(&self, id: MenuId, format: Option<&str>, ctx: &LinkContext) -> String;

    /// The internal link an alias entry redirects to.
    fn alias_link(&self, target: MenuId, ctx: &LinkContext) -> String;
}

// =============================================================================
// QUERY LINK SCHEME
// =============================================================================

/// Query-string addressing: `{entry_prefix}{item_param}={id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLinkScheme {
    pub entry_prefix: String,
    pub item_param: String,
    /// Name of the language parameter added to alias links. Left unset,
    /// alias links are never localized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_param: Option<String>,
}

impl Default for QueryLinkScheme {
    fn default() -> Self {
        Self {
            entry_prefix: DEFAULT_ENTRY_PREFIX.to_string(),
            item_param: DEFAULT_ITEM_PARAM.to_string(),
            language_param: None,
        }
    }
}

impl QueryLinkScheme {
    fn entry(&self, id: MenuId) -> String {
        format!("{}{}={}", self.entry_prefix, self.item_param, id)
    }
}

impl LinkScheme for QueryLinkScheme {
    fn is_internal(&self, link: &str) -> bool {
        !self.entry_prefix.is_empty() && link.starts_with(&self.entry_prefix)
    }

    fn references_item(&self, link: &str) -> bool {
        let Some((_, query)) = link.split_once('?') else {
            return false;
        };
        query
            .split('&')
            .filter_map(|pair| pair.split('=').next())
            .any(|key| key == self.item_param)
    }

    fn append_item(&self, link: &str, id: MenuId) -> String {
        let glue = if link.ends_with('?') || link.ends_with('&') {
            ""
        } else if link.contains('?') {
            "&"
        } else {
            "?"
        };
        format!("{link}{glue}{}={id}", self.item_param)
    }

    fn item_link(&self, id: MenuId, format: Option<&str>, ctx: &LinkContext) -> String {
        let mut link = self.entry(id);
        if ctx.sef_suffix {
            if let Some(format) = format.filter(|f| !f.is_empty()) {
                link.push_str(&format!("&{FORMAT_PARAM}={format}"));
            }
        }
        link
    }

    fn alias_link(&self, target: MenuId, ctx: &LinkContext) -> String {
        let mut link = self.entry(target);
        let language = ctx
            .language
            .as_deref()
            .filter(|lang| !lang.is_empty() && *lang != ALL_LANGUAGES);
        if let (Some(param), Some(language)) = (self.language_param.as_deref(), language) {
            link.push_str(&format!("&{param}={language}"));
        }
        link
    }
}

// =============================================================================
// CANONICALIZATION
// =============================================================================

/// Canonical form of an internal link.
///
/// Trims whitespace, decodes `&amp;` separators, collapses runs of `&`,
/// drops a `&` right after `?` and strips trailing `?`/`&`. Every rewrite
/// shortens the string, so the loop reaches a fixed point.
#[must_use]
pub fn canonicalize(link: &str) -> String {
    let mut current = link.to_string();
    loop {
        let next = canonical_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn canonical_pass(link: &str) -> String {
    let mut out = link.trim().replace("&amp;", "&");
    while out.contains("&&") {
        out = out.replace("&&", "&");
    }
    out = out.replace("?&", "?");
    while out.ends_with('&') || out.ends_with('?') {
        out.pop();
    }
    out
}

// =============================================================================
// LINK RESOLVER
// =============================================================================

/// Result of resolving one merged entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Final type; a placeholder custom link becomes a separator.
    pub item_type: ItemType,
    pub url: Option<String>,
}

/// Computes final links using a [`LinkScheme`] and a request's
/// [`LinkContext`].
#[derive(Clone)]
pub struct LinkResolver {
    scheme: Arc<dyn LinkScheme>,
    context: LinkContext,
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(QueryLinkScheme::default(), LinkContext::default())
    }
}

impl std::fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkResolver")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl LinkResolver {
    /// Create a resolver for the given addressing scheme.
    pub fn new(scheme: impl LinkScheme + 'static, context: LinkContext) -> Self {
        Self {
            scheme: Arc::new(scheme),
            context,
        }
    }

    /// The same scheme with a different request context.
    #[must_use]
    pub fn with_context(&self, context: LinkContext) -> Self {
        Self {
            scheme: Arc::clone(&self.scheme),
            context,
        }
    }

    #[must_use]
    pub fn context(&self) -> &LinkContext {
        &self.context
    }

    /// Resolve the merged `item_type` and `link` of `node`.
    ///
    /// - Separators, headings and particles never link.
    /// - Aliases link to their target's identity, not their raw link.
    /// - Custom links pass through untouched, unless they are a placeholder.
    /// - Everything else becomes a self-addressing internal link.
    #[must_use]
    pub fn resolve(&self, item_type: &ItemType, link: &str, node: &NativeMenuNode) -> Resolution {
        let url = match item_type {
            linkless if linkless.is_linkless() => None,
            ItemType::Url => {
                if PLACEHOLDER_LINKS.contains(&link.trim()) {
                    return Resolution {
                        item_type: ItemType::Separator,
                        url: None,
                    };
                }
                Some(link.to_string())
            }
            ItemType::Alias => {
                let target = node.alias_target.unwrap_or(MenuId(0));
                Some(canonicalize(&self.scheme.alias_link(target, &self.context)))
            }
            _ => Some(canonicalize(&self.internal_link(link, node))),
        };

        Resolution {
            item_type: item_type.clone(),
            url: url.filter(|url| !url.is_empty()),
        }
    }

    fn internal_link(&self, link: &str, node: &NativeMenuNode) -> String {
        let link = canonicalize(link);
        if self.scheme.is_internal(&link) {
            if self.scheme.references_item(&link) {
                link
            } else {
                self.scheme.append_item(&link, node.id)
            }
        } else {
            let format = node.query.get(FORMAT_PARAM).map(String::as_str);
            self.scheme.item_link(node.id, format, &self.context)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
