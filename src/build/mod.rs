//! Builder - turns a cache miss into a published binary
//!
//! # Publication protocol
//!
//! - The compiler always writes to a unique temporary file next to the
//!   canonical binary, never to the canonical path itself
//! - The temporary file is hard-linked into place, so readers see either no
//!   binary or a complete one, and a published binary is never replaced
//! - A binary that appears while we build (another process won the race)
//!   is trusted and reused
//!
//! No locks are taken. Workspace files are byte-identical for a given key,
//! so racing writers cannot diverge.

pub mod manifest;
pub mod toolchain;

#[cfg(test)]
pub(crate) mod testing;

pub use toolchain::{GoToolchain, Toolchain};

use crate::cache::{CacheKey, Resolved, Store, BINARY_NAME};
use crate::error::{GoscriptError, GoscriptResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Entry-point source file written into every workspace
pub const ENTRY_FILE: &str = "main.go";

/// Module manifest file name
pub const MANIFEST_FILE: &str = "go.mod";

/// Written once dependency resolution has succeeded for a workspace
pub const DEPS_MARKER: &str = ".deps-resolved";

/// Builds scripts into the store using a toolchain
pub struct Builder {
    store: Store,
    toolchain: Box<dyn Toolchain>,
}

impl Builder {
    pub fn new(store: Store, toolchain: Box<dyn Toolchain>) -> Self {
        Self { store, toolchain }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn toolchain(&self) -> &dyn Toolchain {
        &*self.toolchain
    }

    /// Build `content` for `key` and publish the binary.
    ///
    /// Safe to call repeatedly and concurrently (from separate processes)
    /// for the same key.
    pub async fn build(&self, key: &CacheKey, content: &[u8]) -> GoscriptResult<Resolved> {
        let workspace = self.store.workspace_path(key);
        debug!("Preparing workspace {}", workspace.display());

        fs::create_dir_all(&workspace).await.map_err(|e| {
            GoscriptError::workspace(format!("creating {}", workspace.display()), e)
        })?;

        let entry = workspace.join(ENTRY_FILE);
        fs::write(&entry, content)
            .await
            .map_err(|e| GoscriptError::workspace(format!("writing {}", entry.display()), e))?;

        self.ensure_manifest(key, &workspace).await?;
        self.ensure_dependencies(&workspace).await?;

        // Another process may have published while we were resolving
        if let Some(resolved) = self.store.lookup(key).await? {
            info!("Binary for {} published concurrently, skipping build", key.short());
            return Ok(resolved);
        }

        let bin_dir = self.store.binary_dir(key);
        fs::create_dir_all(&bin_dir).await.map_err(|e| {
            GoscriptError::workspace(format!("creating {}", bin_dir.display()), e)
        })?;

        let tmp = temp_binary_path(&bin_dir);
        match self.compile_and_publish(key, &workspace, &tmp).await {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                remove_temp(&tmp).await;
                Err(e)
            }
        }
    }

    /// Write `go.mod` unless the workspace already has one
    async fn ensure_manifest(&self, key: &CacheKey, workspace: &Path) -> GoscriptResult<()> {
        let path = workspace.join(MANIFEST_FILE);
        if exists(&path).await? {
            debug!("Reusing {}", path.display());
            return Ok(());
        }

        let version = match self.toolchain.version().await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Could not query {} version: {}", self.toolchain.name(), e);
                None
            }
        };

        let content = manifest::render(key, version.as_deref());
        fs::write(&path, content)
            .await
            .map_err(|e| GoscriptError::workspace(format!("writing {}", path.display()), e))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Resolve dependencies once per workspace
    async fn ensure_dependencies(&self, workspace: &Path) -> GoscriptResult<()> {
        let marker = workspace.join(DEPS_MARKER);
        if exists(&marker).await? {
            debug!("Dependencies already resolved");
            return Ok(());
        }

        info!("Resolving dependencies in {}", workspace.display());
        self.toolchain.resolve_dependencies(workspace).await?;

        fs::write(&marker, b"")
            .await
            .map_err(|e| GoscriptError::workspace(format!("writing {}", marker.display()), e))
    }

    async fn compile_and_publish(
        &self,
        key: &CacheKey,
        workspace: &Path,
        tmp: &Path,
    ) -> GoscriptResult<Resolved> {
        info!("Compiling {} with {}", key.short(), self.toolchain.name());
        self.toolchain.compile(workspace, ENTRY_FILE, tmp).await?;

        let canonical = self.store.binary_path(key);
        if publish(tmp, &canonical).await? {
            info!("Published {}", canonical.display());
        } else {
            debug!("Lost publish race for {}, keeping existing binary", key.short());
        }
        remove_temp(tmp).await;

        Ok(self.store.resolved(key))
    }
}

/// Link `tmp` into place without replacing an existing binary.
///
/// Returns `false` when another process published first. Filesystems
/// without hard links fall back to an atomic rename.
async fn publish(tmp: &Path, canonical: &Path) -> GoscriptResult<bool> {
    let publish_error = |source| GoscriptError::Publish {
        from: tmp.to_path_buf(),
        to: canonical.to_path_buf(),
        source,
    };

    match fs::hard_link(tmp, canonical).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => {
            debug!("Hard link failed ({}), renaming instead", e);
            if exists(canonical).await? {
                return Ok(false);
            }
            fs::rename(tmp, canonical).await.map_err(publish_error)?;
            Ok(true)
        }
    }
}

/// Unique temporary output path inside a key's binary directory
pub fn temp_binary_path(bin_dir: &Path) -> PathBuf {
    bin_dir.join(format!(".{}.{}.tmp", BINARY_NAME, Uuid::new_v4().simple()))
}

/// Whether a file name belongs to an unpublished build output
pub fn is_temp_binary(name: &str) -> bool {
    name.starts_with(&format!(".{}.", BINARY_NAME)) && name.ends_with(".tmp")
}

async fn exists(path: &Path) -> GoscriptResult<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| GoscriptError::workspace(format!("checking {}", path.display()), e))
}

async fn remove_temp(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
