//! Configuration management for goscript

pub mod schema;

pub use schema::Config;

use crate::error::{GoscriptError, GoscriptResult};
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "GOSCRIPT_CONFIG";

/// Pick the config file: explicit path, then `$GOSCRIPT_CONFIG`, then
/// `<config dir>/goscript/config.toml`, then `./goscript/config.toml`.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_override: Option<&str>,
    config_dir: Option<&Path>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = env_override.filter(|s| !s.is_empty()) {
        return PathBuf::from(path);
    }
    config_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goscript")
        .join("config.toml")
}

/// Loads and writes the goscript config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Locate the config file from the environment
    pub fn new() -> Self {
        Self::locate(None)
    }

    /// Locate the config file, preferring `explicit` (from `--config`)
    pub fn locate(explicit: Option<&Path>) -> Self {
        let env_override = env::var(CONFIG_ENV).ok();
        let config_dir = dirs::config_dir();
        let config_path =
            resolve_config_path(explicit, env_override.as_deref(), config_dir.as_deref());
        debug!("Config file: {}", config_path.display());
        Self { config_path }
    }

    /// Use exactly `path`
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Load configuration; a missing file means defaults.
    ///
    /// A relative `cache.root` is taken relative to the config file's
    /// directory, so the same file works from any working directory.
    pub async fn load(&self) -> GoscriptResult<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Config file not found, using defaults");
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(GoscriptError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        let mut config: Config =
            toml::from_str(&content).map_err(|e| GoscriptError::ConfigInvalid {
                path: self.config_path.clone(),
                reason: e.to_string(),
            })?;

        if let (Some(root), Some(base)) = (config.cache.root.as_mut(), self.config_path.parent()) {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }

        Ok(config)
    }

    /// Write `config`, creating the parent directory
    pub async fn save(&self, config: &Config) -> GoscriptResult<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                GoscriptError::io(format!("creating config directory {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            GoscriptError::io(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.build.go, "go");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.build.go = "/usr/local/go/bin/go".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.build.go, "/usr/local/go/bin/go");
    }

    #[test]
    fn config_path_resolution_order() {
        let dir = Path::new("/home/u/.config");
        assert_eq!(
            resolve_config_path(Some(Path::new("/x.toml")), Some("/env.toml"), Some(dir)),
            PathBuf::from("/x.toml")
        );
        assert_eq!(
            resolve_config_path(None, Some("/env.toml"), Some(dir)),
            PathBuf::from("/env.toml")
        );
        assert_eq!(
            resolve_config_path(None, Some(""), Some(dir)),
            PathBuf::from("/home/u/.config/goscript/config.toml")
        );
        assert_eq!(
            resolve_config_path(None, None, None),
            PathBuf::from("./goscript/config.toml")
        );
    }

    #[test]
    #[serial_test::serial]
    fn locate_honors_env() {
        std::env::set_var(CONFIG_ENV, "/tmp/goscript-test/config.toml");
        let manager = ConfigManager::new();
        std::env::remove_var(CONFIG_ENV);

        assert_eq!(manager.path(), Path::new("/tmp/goscript-test/config.toml"));
    }

    #[tokio::test]
    async fn relative_cache_root_follows_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nroot = \"scripts-cache\"\n").unwrap();

        let config = ConfigManager::with_path(path).load().await.unwrap();
        assert_eq!(config.cache.root, Some(temp.path().join("scripts-cache")));
    }

    #[tokio::test]
    async fn invalid_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache\ngc_days = ").unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, GoscriptError::ConfigInvalid { .. }));
    }
}
