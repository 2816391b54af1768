//! Running and exporting resolved binaries

use crate::error::{GoscriptError, GoscriptResult};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Run `binary` with inherited standard streams and return its exit code
pub async fn run_binary(binary: &Path, args: &[String]) -> GoscriptResult<i32> {
    debug!("Executing: {} {:?}", binary.display(), args);

    let status = Command::new(binary)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| GoscriptError::Exec {
            path: binary.to_path_buf(),
            source: e,
        })?;

    Ok(exit_code(status))
}

/// Exit code to forward for a finished child; `128 + N` for signal N
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Copy a resolved binary to a user-chosen path, marked executable
pub async fn copy_binary(src: &Path, dst: &Path) -> GoscriptResult<()> {
    tokio::fs::copy(src, dst).await.map_err(|e| {
        GoscriptError::io(format!("copying {} to {}", src.display(), dst.display()), e)
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o755);
        tokio::fs::set_permissions(dst, perms)
            .await
            .map_err(|e| GoscriptError::io(format!("setting permissions on {}", dst.display()), e))?;
    }

    Ok(())
}
