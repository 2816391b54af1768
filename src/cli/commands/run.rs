//! Script mode - resolve a Go script to a cached binary and run or export it

use crate::build::{Builder, GoToolchain};
use crate::cache::Store;
use crate::cli::args::{Action, Input};
use crate::config::Config;
use crate::error::{GoscriptError, GoscriptResult};
use crate::exec;
use crate::resolve::{Outcome, Resolver};
use crate::script::{fix_imports, inline_to_script};
use crate::ui::{BuildSpinner, UiContext};
use std::path::Path;
use tracing::debug;

/// Execute script mode, returning the exit code to forward
pub async fn execute(input: Input, action: Action, config: &Config) -> GoscriptResult<i32> {
    let content = read_input(&input, config).await?;

    let store = Store::open(config.cache.root.as_deref())?;
    let toolchain = GoToolchain::new(config.build.go.clone()).with_timeout(config.build.timeout());
    let resolver = Resolver::new(Builder::new(store, Box::new(toolchain)));

    let spinner = BuildSpinner::new(&UiContext::detect());
    let (resolved, outcome) = resolver
        .resolve_with(&content, |key| {
            spinner.start(&format!("Compiling {}", key.short()))
        })
        .await?;
    spinner.finish();

    if outcome == Outcome::Hit {
        debug!("Using cached binary {}", resolved.binary.display());
    }

    match action {
        Action::Run { args } => exec::run_binary(&resolved.binary, &args).await,
        Action::Build { output } => {
            exec::copy_binary(&resolved.binary, &output).await?;
            println!("Compiled into {}", output.display());
            Ok(0)
        }
    }
}

async fn read_input(input: &Input, config: &Config) -> GoscriptResult<Vec<u8>> {
    match input {
        Input::Script(path) => read_script(path).await,
        Input::Inline(code) => {
            let src = fix_imports(inline_to_script(code), &config.build.goimports).await?;
            Ok(src.into_bytes())
        }
    }
}

async fn read_script(path: &Path) -> GoscriptResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| GoscriptError::io(format!("reading script {}", path.display()), e))
}
