//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState};
use crate::config::{AppConfig, RenderOverrides};
use crate::{events, files};
use navmerge_core::{
    FetchOptions, MenuCatalog, MenuError, MenuPlatform, RenderedMenu, RequestContext, StoredItems,
    grouped_items,
};
use std::path::{Path, PathBuf};

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Arguments of `navmerge render`.
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    pub menu: String,
    pub stored: Option<PathBuf>,
    pub overrides: RenderOverrides,
    pub privileged: bool,
    pub user: bool,
    pub access: Vec<u32>,
    pub language: Option<String>,
    pub persist: bool,
}

impl RenderArgs {
    fn context(&self) -> RequestContext {
        RequestContext {
            privileged: self.privileged,
            anonymous: !self.user,
            access_levels: self.access.clone(),
            language: self.language.clone(),
        }
    }
}

/// Render one menu and print it.
pub fn cmd_render(
    config: &AppConfig,
    platform_path: &Path,
    args: &RenderArgs,
    json_mode: bool,
    verbose: bool,
) -> Result<(), MenuError> {
    if args.persist && args.stored.is_none() {
        return Err(MenuError::InvalidRequest(
            "--persist needs a --stored file to write to".to_string(),
        ));
    }

    let platform = files::load_platform(platform_path)?;
    let stored = match &args.stored {
        Some(path) => files::load_stored(path)?,
        None => StoredItems::new(),
    };

    let params = config.render.params(&args.menu, &args.overrides);
    let rendered = config
        .renderer()
        .render(&*platform, &params, &stored, &args.context())?;
    events::log_rendered(&rendered);

    let persist_to = args
        .stored
        .as_deref()
        .filter(|_| args.persist && !rendered.renames.is_empty());
    if let Some(path) = persist_to {
        persist_renames(path, &stored, &rendered)?;
    }

    if json_mode {
        let output = serde_json::to_value(api::RenderResponse::success(&rendered))
            .map_err(|e| MenuError::SerializationError(e.to_string()))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    print_rendered(&rendered, verbose);
    Ok(())
}

/// Rewrite the stored items file with renames applied.
fn persist_renames(
    path: &Path,
    stored: &StoredItems,
    rendered: &RenderedMenu,
) -> Result<(), MenuError> {
    let applied = rendered.renames.apply(stored);
    for collision in &applied.collisions {
        tracing::warn!(
            event = "rename_collision",
            old_path = %collision.rename.old_path,
            new_path = %collision.rename.new_path,
            occupant = %collision.occupant,
            "Rename skipped: new path holds another item's entry"
        );
    }
    files::save_stored(path, &applied.stored)?;
    tracing::info!(
        path = %path.display(),
        renames = rendered.renames.len() - applied.collisions.len(),
        skipped = applied.collisions.len(),
        "Stored items updated"
    );
    Ok(())
}

fn print_rendered(rendered: &RenderedMenu, verbose: bool) {
    println!("Menu: {}", rendered.menu);
    println!("==========");
    match rendered.base {
        Some(base) => println!("Base:  {}", base),
        None => println!("Base:  (none)"),
    }
    match rendered.cache_id {
        Some(id) => println!("Cache: {}", id),
        None => println!("Cache: (not cacheable)"),
    }
    println!();

    if rendered.is_empty() {
        println!("(no items)");
    }

    for item in &rendered.items {
        let marker = if rendered.is_current(item) {
            '>'
        } else if rendered.is_active(item) {
            '*'
        } else {
            ' '
        };
        let indent = "  ".repeat(item.level);
        let title = if item.title.is_empty() {
            item.path.as_str()
        } else {
            item.title.as_str()
        };
        println!("{marker} {indent}{title} [{}]", item.id);

        if verbose {
            println!(
                "  {indent}  path={} type={} url={}",
                item.path,
                item.item_type.as_str(),
                item.url.as_deref().unwrap_or("-")
            );
        }
    }

    if !rendered.renames.is_empty() {
        println!();
        println!("Renames:");
        for rename in rendered.renames.renames() {
            println!("  {} -> {}", rename.old_path, rename.new_path);
        }
    }

    if !rendered.conflicts.is_empty() {
        println!();
        println!("Identity conflicts:");
        for conflict in &rendered.conflicts {
            println!(
                "  [{}] kept {}, ignored {}",
                conflict.id, conflict.kept, conflict.ignored
            );
        }
    }
}

// =============================================================================
// MENUS COMMAND
// =============================================================================

/// List menus with their item options.
pub fn cmd_menus(platform_path: &Path, json_mode: bool) -> Result<(), MenuError> {
    let platform = files::load_platform(platform_path)?;
    let mut catalog = MenuCatalog::new();
    let menus = catalog.menus(&*platform).to_vec();
    let groups = grouped_items(&*platform, &mut catalog)?;

    if json_mode {
        let output = serde_json::to_value(api::MenusResponse::success(menus, groups))
            .map_err(|e| MenuError::SerializationError(e.to_string()))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Menus");
    println!("=====");
    for menu in &menus {
        println!("{} ({})", menu.title, menu.name);
        if !menu.description.is_empty() {
            println!("  {}", menu.description);
        }
        for option in groups.get(&menu.name).into_iter().flatten() {
            println!("  {}{} [{}]", "- ".repeat(option.depth), option.label, option.id);
        }
    }

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Validate the snapshot: every menu loads and builds in the unfiltered view.
pub fn cmd_check(
    config: &AppConfig,
    platform_path: &Path,
    json_mode: bool,
) -> Result<(), MenuError> {
    let platform = files::load_platform(platform_path)?;
    let renderer = config.renderer();
    let context = RequestContext::privileged();

    let mut report = Vec::new();
    for menu in platform.menus() {
        let nodes = platform.fetch_nodes(&menu.name, &FetchOptions::unfiltered())?;
        let params = config
            .render
            .params(&menu.name, &RenderOverrides::default());
        let rendered = renderer.render(&*platform, &params, &StoredItems::new(), &context)?;
        report.push((menu.name, nodes.len(), rendered.items.len()));
    }

    if json_mode {
        let menus: Vec<_> = report
            .iter()
            .map(|(name, nodes, items)| {
                serde_json::json!({ "menu": name, "nodes": nodes, "items": items })
            })
            .collect();
        let output = serde_json::json!({ "valid": true, "menus": menus });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Platform snapshot: {}", platform_path.display());
    for (name, nodes, items) in &report {
        println!("  {name}: {nodes} nodes, {items} rendered");
    }
    println!("OK");
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    config: AppConfig,
    platform_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    stored_dir: PathBuf,
) -> Result<(), MenuError> {
    let platform: Box<dyn MenuPlatform> = files::load_platform(platform_path)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    println!("navmerge Menu Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Platform: {}", platform_path.display());
    println!("  Stored:   {}", stored_dir.display());
    println!();
    println!("Endpoints:");
    println!("  GET  /health - Health check");
    println!("  GET  /menus  - List menus");
    println!("  POST /render - Render a menu");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, AppState::new(platform, stored_dir, config)).await
}
