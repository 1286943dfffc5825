//! # navmerge CLI Module
//!
//! This module implements the CLI interface for navmerge.
//!
//! ## Available Commands
//!
//! - `render` - Render a menu against its stored configuration
//! - `menus` - List menus and their item options
//! - `check` - Validate a platform snapshot
//! - `server` - Start the HTTP server

mod commands;

use crate::config::{AppConfig, RenderOverrides};
use clap::{Parser, Subcommand};
use navmerge_core::MenuError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// navmerge - menu reconciliation server
///
/// Merges a platform's live menu tree with saved per-item configuration,
/// following items that moved since they were saved.
#[derive(Parser, Debug)]
#[command(name = "navmerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Path to the platform snapshot (JSON)
    #[arg(short = 'P', long, global = true, default_value = "platform.json")]
    pub platform: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a menu
    Render {
        /// Menu name (default: the menu holding the active item, then the default item)
        menu: Option<String>,

        /// Stored items file (JSON, or TOML by extension)
        #[arg(short, long)]
        stored: Option<PathBuf>,

        /// Base item id
        #[arg(short, long)]
        base: Option<u64>,

        /// First rendered level (0 = top)
        #[arg(long)]
        start_level: Option<usize>,

        /// Number of rendered levels (0 = unlimited)
        #[arg(long)]
        max_levels: Option<usize>,

        /// Mark an alias active when its target is the base
        #[arg(long)]
        highlight_alias: Option<bool>,

        /// Mark an alias active when its target is an ancestor of the base
        #[arg(long)]
        highlight_parent_alias: Option<bool>,

        /// Render in an administrative context
        #[arg(long)]
        privileged: bool,

        /// Render for a signed-in user (output is not cacheable)
        #[arg(long)]
        user: bool,

        /// Access levels granted to the caller (comma-separated)
        #[arg(long, value_delimiter = ',')]
        access: Vec<u32>,

        /// Request language
        #[arg(short, long)]
        language: Option<String>,

        /// Write detected renames back to the stored items file
        #[arg(long)]
        persist: bool,
    },

    /// List menus and their item options
    Menus,

    /// Validate the platform snapshot
    Check,

    /// Start HTTP server
    Server {
        /// Host to bind to (overrides `[server] host`)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides `[server] port`)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding `<menu>.json` stored items
        #[arg(short, long, default_value = ".")]
        stored_dir: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), MenuError> {
    let config = AppConfig::load(&cli.config)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Render {
            menu,
            stored,
            base,
            start_level,
            max_levels,
            highlight_alias,
            highlight_parent_alias,
            privileged,
            user,
            access,
            language,
            persist,
        }) => {
            let request = RenderArgs {
                menu: menu.unwrap_or_default(),
                stored,
                overrides: RenderOverrides {
                    base,
                    start_level,
                    max_levels,
                    highlight_alias,
                    highlight_parent_alias,
                },
                privileged,
                user,
                access,
                language,
                persist,
            };
            cmd_render(&config, &cli.platform, &request, json_mode, cli.verbose)
        }
        Some(Commands::Menus) => cmd_menus(&cli.platform, json_mode),
        Some(Commands::Check) => cmd_check(&config, &cli.platform, json_mode),
        Some(Commands::Server {
            host,
            port,
            stored_dir,
        }) => cmd_server(config, &cli.platform, host, port, stored_dir).await,
        None => {
            // No subcommand - list menus by default
            cmd_menus(&cli.platform, json_mode)
        }
    }
}
