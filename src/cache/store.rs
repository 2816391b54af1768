//! Store layout and lookup
//!
//! ```text
//! <root>/bin/<key>/app        published binary (presence = hit)
//! <root>/work/<key>/main.go   build workspace, reused across attempts
//! <root>/work/<key>/go.mod
//! ```

use crate::cache::key::CacheKey;
use crate::error::{GoscriptError, GoscriptResult};
use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the store root
pub const CACHE_DIR_ENV: &str = "GOSCRIPT_CACHE_DIR";

/// File name of the published binary inside `bin/<key>/`
pub const BINARY_NAME: &str = "app";

const BIN_DIR: &str = "bin";
const WORK_DIR: &str = "work";

/// Outcome of resolving script content to an executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub key: CacheKey,
    pub binary: PathBuf,
    pub workspace: PathBuf,
}

/// Pick the store root from the given inputs.
///
/// Order: explicit override, configured root, `$XDG_CACHE_HOME/goscript`,
/// `<home>/.cache/goscript`, then `./goscript`.
pub fn resolve_root(
    env_override: Option<&str>,
    configured: Option<&Path>,
    xdg_cache_home: Option<&str>,
    home: Option<&Path>,
) -> PathBuf {
    if let Some(dir) = env_override.filter(|s| !s.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    if let Some(dir) = xdg_cache_home.filter(|s| !s.is_empty()) {
        return Path::new(dir).join("goscript");
    }
    match home {
        Some(home) => home.join(".cache").join("goscript"),
        None => PathBuf::from(".").join("goscript"),
    }
}

/// Resolve the store root from the process environment
pub fn store_root(configured: Option<&Path>) -> PathBuf {
    let env_override = env::var(CACHE_DIR_ENV).ok();
    let xdg = env::var("XDG_CACHE_HOME").ok();
    let home = dirs::home_dir();
    resolve_root(
        env_override.as_deref(),
        configured,
        xdg.as_deref(),
        home.as_deref(),
    )
}

/// Content-addressed artifact store rooted at one directory.
///
/// The root is captured once so every path computed during a run agrees.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the store at the root picked by [`store_root`], made absolute.
    ///
    /// Toolchain commands run inside the workspace, so every path handed to
    /// them must not depend on the caller's working directory.
    pub fn open(configured: Option<&Path>) -> GoscriptResult<Self> {
        let root = store_root(configured);
        let root = std::path::absolute(&root)
            .map_err(|e| GoscriptError::io(format!("resolving {}", root.display()), e))?;
        debug!("Store root: {}", root.display());
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per published key
    pub fn bin_root(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    /// Directory holding one workspace per key
    pub fn work_root(&self) -> PathBuf {
        self.root.join(WORK_DIR)
    }

    /// Directory that receives the binary and its temporary build outputs
    pub fn binary_dir(&self, key: &CacheKey) -> PathBuf {
        self.bin_root().join(key.as_str())
    }

    pub fn binary_path(&self, key: &CacheKey) -> PathBuf {
        self.binary_dir(key).join(BINARY_NAME)
    }

    pub fn workspace_path(&self, key: &CacheKey) -> PathBuf {
        self.work_root().join(key.as_str())
    }

    /// Build the result record for a key without touching the filesystem
    pub fn resolved(&self, key: &CacheKey) -> Resolved {
        Resolved {
            key: key.clone(),
            binary: self.binary_path(key),
            workspace: self.workspace_path(key),
        }
    }

    /// Check whether a binary is published for `key`.
    ///
    /// `Ok(None)` only when the binary is absent; every other filesystem
    /// error is returned as-is.
    pub async fn lookup(&self, key: &CacheKey) -> GoscriptResult<Option<Resolved>> {
        let binary = self.binary_path(key);
        match tokio::fs::metadata(&binary).await {
            Ok(_) => {
                debug!("Cache hit: {}", key.short());
                Ok(Some(self.resolved(key)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache miss: {}", key.short());
                Ok(None)
            }
            Err(e) => Err(GoscriptError::Lookup {
                path: binary,
                source: e,
            }),
        }
    }
}
