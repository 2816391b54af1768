//! Explicit cache maintenance
//!
//! Listing, age and size based pruning, and cleanup of temporary outputs
//! left behind by interrupted builds. Never called while resolving a script.

use crate::build::is_temp_binary;
use crate::cache::key::CacheKey;
use crate::cache::store::Store;
use crate::error::{GoscriptError, GoscriptResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Convert MB to bytes
pub fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

/// One key found in the store
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// Whether a published binary exists
    pub has_binary: bool,
    /// Last modification of the binary, or of the workspace when unbuilt
    pub modified: DateTime<Utc>,
    /// Combined size of the binary directory and workspace
    pub size_bytes: u64,
}

impl CacheEntry {
    /// Check if this entry is older than the given number of days
    ///
    /// A cutoff before the earliest representable date matches nothing.
    pub fn is_older_than_days(&self, days: u32, now: DateTime<Utc>) -> bool {
        Duration::try_days(i64::from(days))
            .and_then(|age| now.checked_sub_signed(age))
            .is_some_and(|cutoff| self.modified < cutoff)
    }
}

/// List every key that has a binary or a workspace, sorted by key
pub fn list_entries(store: &Store) -> GoscriptResult<Vec<CacheEntry>> {
    let mut keys = BTreeSet::new();
    keys.extend(keys_in(&store.bin_root())?);
    keys.extend(keys_in(&store.work_root())?);

    keys.into_iter().map(|key| entry_for(store, key)).collect()
}

fn keys_in(dir: &Path) -> GoscriptResult<Vec<CacheKey>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(GoscriptError::io(format!("reading {}", dir.display()), e)),
    };

    let mut keys = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GoscriptError::io(format!("reading {}", dir.display()), e))?;
        match CacheKey::parse(&entry.file_name().to_string_lossy()) {
            Some(key) => keys.push(key),
            None => debug!("Ignoring foreign entry {}", entry.path().display()),
        }
    }
    Ok(keys)
}

fn entry_for(store: &Store, key: CacheKey) -> GoscriptResult<CacheEntry> {
    let binary = store.binary_path(&key);
    let workspace = store.workspace_path(&key);

    let binary_meta = optional_metadata(&binary)?;
    let modified = match &binary_meta {
        Some(meta) => meta.modified().ok(),
        None => optional_metadata(&workspace)?.and_then(|m| m.modified().ok()),
    }
    .unwrap_or(SystemTime::UNIX_EPOCH);

    let size_bytes = dir_size(&store.binary_dir(&key))? + dir_size(&workspace)?;

    Ok(CacheEntry {
        key,
        has_binary: binary_meta.is_some(),
        modified: DateTime::<Utc>::from(modified),
        size_bytes,
    })
}

fn optional_metadata(path: &Path) -> GoscriptResult<Option<fs::Metadata>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GoscriptError::io(format!("inspecting {}", path.display()), e)),
    }
}

/// Total size of regular files below `path`; symlinks are not followed
fn dir_size(path: &Path) -> GoscriptResult<u64> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(GoscriptError::io(format!("inspecting {}", path.display()), e)),
    };
    if !meta.is_dir() {
        return Ok(meta.len());
    }

    let mut total = 0;
    let entries =
        fs::read_dir(path).map_err(|e| GoscriptError::io(format!("reading {}", path.display()), e))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| GoscriptError::io(format!("reading {}", path.display()), e))?;
        total += dir_size(&entry.path())?;
    }
    Ok(total)
}

/// Entries last modified more than `days` ago
pub fn select_older_than(entries: &[CacheEntry], days: u32, now: DateTime<Utc>) -> Vec<CacheEntry> {
    entries
        .iter()
        .filter(|e| e.is_older_than_days(days, now))
        .cloned()
        .collect()
}

/// Oldest entries to drop so the remaining total fits in `max_bytes`
pub fn select_to_fit(entries: &[CacheEntry], max_bytes: u64) -> Vec<CacheEntry> {
    let mut total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    if total <= max_bytes {
        return vec![];
    }

    let mut by_age: Vec<&CacheEntry> = entries.iter().collect();
    by_age.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.key.cmp(&b.key)));

    let mut selected = Vec::new();
    for entry in by_age {
        if total <= max_bytes {
            break;
        }
        total = total.saturating_sub(entry.size_bytes);
        selected.push(entry.clone());
    }
    selected
}

/// Remove one key. The binary goes first so a concurrent lookup sees
/// either the complete artifact or a miss.
pub fn remove_entry(store: &Store, key: &CacheKey) -> GoscriptResult<()> {
    remove_dir_if_present(&store.binary_dir(key))?;
    remove_dir_if_present(&store.workspace_path(key))
}

/// Remove several entries, returning the number of bytes freed
pub fn remove_entries(store: &Store, entries: &[CacheEntry]) -> GoscriptResult<u64> {
    let mut freed = 0;
    for entry in entries {
        debug!("Removing cache entry {}", entry.key.short());
        remove_entry(store, &entry.key)?;
        freed += entry.size_bytes;
    }
    Ok(freed)
}

/// Remove every binary and workspace
pub fn clear(store: &Store) -> GoscriptResult<usize> {
    let count = list_entries(store)?.len();
    remove_dir_if_present(&store.bin_root())?;
    remove_dir_if_present(&store.work_root())?;
    Ok(count)
}

/// Delete temporary build outputs older than `max_age`.
///
/// Younger ones may belong to a build still running in another process.
pub fn remove_stale_temps(store: &Store, max_age: std::time::Duration) -> GoscriptResult<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for key in keys_in(&store.bin_root())? {
        let dir = store.binary_dir(&key);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(GoscriptError::io(format!("reading {}", dir.display()), e)),
        };

        for entry in entries.flatten() {
            if !is_temp_binary(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let age = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < max_age {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(GoscriptError::io(
                        format!("removing {}", entry.path().display()),
                        e,
                    ))
                }
            }
        }
    }

    Ok(removed)
}

fn remove_dir_if_present(path: &Path) -> GoscriptResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GoscriptError::io(format!("removing {}", path.display()), e)),
    }
}
