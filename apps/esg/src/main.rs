//! # ESG - Maturity Scoring CLI
//!
//! The main binary for the ESG maturity engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               apps/esg (THE BINARY)           │
//! │                                              │
//! │   ┌─────────────┐        ┌──────────────┐    │
//! │   │   CLI       │        │   Config     │    │
//! │   │  (clap)     │        │   (toml)     │    │
//! │   └──────┬──────┘        └──────┬───────┘    │
//! │          └───────────┬──────────┘            │
//! │                      ▼                       │
//! │              ┌───────────────┐               │
//! │              │   esg-core    │               │
//! │              │ (THE ENGINE)  │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! esg init
//! esg load-questions -f questions.json
//! esg submit -f survey.json
//! esg report -c "Cerâmica Aurora" -o report.json
//! esg history -c "Cerâmica Aurora"
//! ```

use clap::Parser;
use esg::cli;
use esg::config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // The config file may choose the log format, so read it before tracing starts.
    let loaded = cli::load_config(&cli);
    let file_config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize tracing. ESG_LOG_FORMAT=json enables machine-parseable output.
    let log_format = config::log_format(std::env::var("ESG_LOG_FORMAT").ok(), &file_config);
    let default_filter = if cli.verbose {
        "esg=debug,esg_core=debug"
    } else {
        "esg=info,esg_core=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let file_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli, &file_config) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗███████╗ ██████╗
  ██╔════╝██╔════╝██╔════╝
  █████╗  ███████╗██║  ███╗
  ██╔══╝  ╚════██║██║   ██║
  ███████╗███████║╚██████╔╝
  ╚══════╝╚══════╝ ╚═════╝

  ESG Maturity Engine v{}

  Ambiental • Social • Governança
"#,
        env!("CARGO_PKG_VERSION")
    );
}
