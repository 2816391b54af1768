//! Inline code (`goscript -c '...'`) to a full Go program

use crate::error::{GoscriptError, GoscriptResult};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

const TEMPLATE_HEAD: &str = "package main\n\nfunc main() {\n";
const TEMPLATE_TAIL: &str = "\n}\n";

/// Wrap a snippet into `func main()`, indenting each non-blank line by a tab
pub fn inline_to_script(code: &str) -> String {
    let body = code
        .trim()
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("\t{}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}{}", TEMPLATE_HEAD, body, TEMPLATE_TAIL)
}

/// Add missing imports with `goimports` when it is installed.
///
/// Without `goimports` on `PATH` the source is returned unchanged and the
/// compiler reports whatever is missing.
pub async fn fix_imports(src: String, program: &str) -> GoscriptResult<String> {
    let path = match which::which(program) {
        Ok(path) => path,
        Err(_) => {
            debug!("{} not found, leaving imports as written", program);
            return Ok(src);
        }
    };

    debug!("Fixing imports with {}", path.display());
    let mut child = Command::new(&path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| GoscriptError::io(format!("spawning {}", path.display()), e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(src.as_bytes())
            .await
            .map_err(|e| GoscriptError::io(format!("writing to {}", program), e))?;
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| GoscriptError::io(format!("waiting for {}", program), e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(GoscriptError::Imports {
            diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
