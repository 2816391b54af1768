//! Go toolchain abstraction
//!
//! The builder only talks to the compiler through [`Toolchain`], so tests
//! can swap in a fake and other toolchains can be plugged in later.

use crate::error::{GoscriptError, GoscriptResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Compiler toolchain interface
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Full toolchain version string (e.g. `go1.22.1`)
    async fn version(&self) -> GoscriptResult<String>;

    /// Resolve and pin third-party dependencies referenced from `workspace`
    async fn resolve_dependencies(&self, workspace: &Path) -> GoscriptResult<()>;

    /// Compile `entry` inside `workspace` into `output`
    async fn compile(&self, workspace: &Path, entry: &str, output: &Path) -> GoscriptResult<()>;

    /// Human-readable toolchain name for display
    fn name(&self) -> &'static str;
}

/// The `go` command line toolchain
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: String,
    timeout: Option<Duration>,
}

impl GoToolchain {
    /// Create a toolchain invoking `program` (usually `go`)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Bound every invocation; the child is killed when the bound elapses
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build arguments for compiling `entry` into `output`
    fn build_args(entry: &str, output: &Path) -> Vec<String> {
        vec![
            "build".to_string(),
            "-trimpath".to_string(),
            "-buildvcs=false".to_string(),
            "-o".to_string(),
            output.display().to_string(),
            entry.to_string(),
        ]
    }

    /// Run the toolchain with stderr captured, bounded by the timeout.
    ///
    /// stdout is captured only when `capture_stdout` is set; build commands
    /// discard it.
    async fn exec(
        &self,
        args: &[&str],
        dir: Option<&Path>,
        capture_stdout: bool,
    ) -> GoscriptResult<Output> {
        debug!("Executing: {} {:?}", self.program, args);

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(if capture_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output();
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, output).await.map_err(|_| {
                GoscriptError::ToolchainTimeout {
                    command: format!("{} {}", self.program, args.join(" ")),
                    secs: limit.as_secs(),
                }
            })?,
            None => output.await,
        };

        result.map_err(|e| GoscriptError::ToolchainNotFound {
            program: self.program.clone(),
            source: e,
        })
    }

    /// Run a query and return its trimmed stdout
    async fn query(&self, args: &[&str]) -> GoscriptResult<String> {
        let output = self.exec(args, None, true).await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(GoscriptError::User(format!(
                "{} {} failed: {}",
                self.program,
                args.join(" "),
                stderr_text(&output)
            )))
        }
    }
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go")
    }
}

/// Trimmed stderr of a finished process
fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[async_trait]
impl Toolchain for GoToolchain {
    async fn version(&self) -> GoscriptResult<String> {
        self.query(&["env", "GOVERSION"]).await
    }

    async fn resolve_dependencies(&self, workspace: &Path) -> GoscriptResult<()> {
        let output = self.exec(&["mod", "tidy"], Some(workspace), false).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(GoscriptError::DependencyResolution {
                diagnostics: stderr_text(&output),
            })
        }
    }

    async fn compile(&self, workspace: &Path, entry: &str, output: &Path) -> GoscriptResult<()> {
        let args = Self::build_args(entry, output);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = self.exec(&args, Some(workspace), false).await?;

        if result.status.success() {
            Ok(())
        } else {
            Err(GoscriptError::Compile {
                diagnostics: stderr_text(&result),
            })
        }
    }

    fn name(&self) -> &'static str {
        "go"
    }
}
