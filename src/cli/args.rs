//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// goscript - run Go files as scripts
///
/// Compiles a Go source file once, caches the binary by content, and runs
/// it. Put `#!/usr/bin/env goscript` on the first line to execute Go files
/// directly.
#[derive(Parser, Debug)]
#[command(name = "goscript")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Maintenance subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Inline Go code, wrapped into func main()
    #[arg(short = 'c', long = "code", value_name = "CODE")]
    pub code: Option<String>,

    /// Build only and copy the binary to this path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Go script to run, followed by the arguments passed to it
    /// (only arguments when --code is given)
    #[arg(
        value_name = "SCRIPT [ARGS]",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub script_and_args: Vec<String>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path (default: $GOSCRIPT_CONFIG, then
    /// ~/.config/goscript/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Where the Go source comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Script(PathBuf),
    Inline(String),
}

/// What to do with the resolved binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run { args: Vec<String> },
    Build { output: PathBuf },
}

impl Cli {
    /// Validate the script-mode arguments.
    ///
    /// With `--code` every positional value is a script argument; otherwise
    /// the first one names the script.
    pub fn invocation(&self) -> Result<(Input, Action), String> {
        let (input, args) = match (&self.code, self.script_and_args.split_first()) {
            (Some(code), _) => (Input::Inline(code.clone()), self.script_and_args.clone()),
            (None, Some((script, args))) => (Input::Script(PathBuf::from(script)), args.to_vec()),
            (None, None) => {
                return Err("Either a script path or inline code (-c) is required".to_string())
            }
        };

        let action = match &self.output {
            Some(output) => Action::Build {
                output: output.clone(),
            },
            None => Action::Run { args },
        };

        Ok((input, action))
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and prune the build cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached scripts
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the cache root directory
    Path,

    /// Remove old entries and trim the cache to its size limit
    Gc {
        /// Remove entries older than N days (default: from config)
        #[arg(long)]
        days: Option<u32>,

        /// Trim the cache to N MB, oldest first (default: from config)
        #[arg(long)]
        max_size_mb: Option<u64>,

        /// Dry run - show what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove every cached binary and workspace
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one key per line)
    Plain,
}
