//! goscript - run Go files as scripts
//!
//! CLI entry point: script mode by default, maintenance subcommands otherwise.

use clap::Parser;
use console::style;
use goscript::cli::{Cli, Commands};
use goscript::config::{Config, ConfigManager};
use goscript::error::{GoscriptError, GoscriptResult};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from((code & 0xff) as u8),
        Err(e) if e.is_script_error() => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{} {}", style("goscript:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> GoscriptResult<i32> {
    let cli = Cli::parse();

    let manager = ConfigManager::locate(cli.config.as_deref());
    let config = manager.load().await?;

    init_logging(cli.verbose, &config);

    match cli.command {
        Some(Commands::Cache(args)) => goscript::cli::commands::cache(args, &config).await.map(|_| 0),
        Some(Commands::Config(args)) => goscript::cli::commands::config(args, &config, &manager)
            .await
            .map(|_| 0),
        None => {
            let (input, action) = cli.invocation().map_err(GoscriptError::User)?;
            goscript::cli::commands::run(input, action, &config).await
        }
    }
}

/// Logs go to stderr; stdout belongs to the script.
///
/// 0 = warn, 1 = info, 2+ = debug. `RUST_LOG` wins when set.
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        0 => "goscript=warn",
        1 => "goscript=info",
        _ => "goscript=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
