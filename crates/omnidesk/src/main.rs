// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OmniDesk - a human-in-the-loop customer support desk over a chat channel.
//!
//! This is the binary entry point for the desk server.

mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// OmniDesk - a human-in-the-loop customer support desk.
#[derive(Parser, Debug)]
#[command(name = "omnidesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the desk server (default).
    Serve,
    /// Print the effective configuration with secrets redacted.
    Config,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match omnidesk_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                eprintln!("omnidesk: config error: {error}");
            }
            std::process::exit(1);
        }
    };

    init_tracing(&config.desk.log_level);

    match cli.command {
        Some(Commands::Config) => {
            let mut redacted = config.clone();
            if redacted.anthropic.api_key.is_some() {
                redacted.anthropic.api_key = Some("[redacted]".into());
            }
            match toml::to_string_pretty(&redacted) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    eprintln!("omnidesk: failed to render config: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run(config).await {
                eprintln!("omnidesk: fatal: {e}");
                std::process::exit(1);
            }
        }
    }
}
