//! # navmerge - Menu Reconciliation Server
//!
//! The main binary for navmerge.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for rendering and checking menus
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           apps/navmerge (THE BINARY)         │
//! │                                              │
//! │    ┌─────────────┐       ┌─────────────┐     │
//! │    │    CLI      │       │  HTTP API   │     │
//! │    │   (clap)    │       │   (axum)    │     │
//! │    └──────┬──────┘       └──────┬──────┘     │
//! │           └──────────┬──────────┘            │
//! │                      ▼                       │
//! │              ┌───────────────┐               │
//! │              │ navmerge-core │               │
//! │              │  (THE LOGIC)  │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! navmerge -P platform.json server --stored-dir menus/
//!
//! # CLI operations
//! navmerge -P platform.json menus
//! navmerge -P platform.json render main --stored menus/main.json --base 12
//! ```

use clap::Parser;
use navmerge::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // NAVMERGE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("NAVMERGE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "navmerge=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  navmerge v{}
  menu reconciliation server
"#,
        env!("CARGO_PKG_VERSION")
    );
}
