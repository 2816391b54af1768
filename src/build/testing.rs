//! In-process fake toolchain for builder and resolver tests

use super::toolchain::Toolchain;
use crate::error::{GoscriptError, GoscriptResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the fake does when asked to compile
#[derive(Debug, Clone)]
pub enum CompileBehavior {
    /// Write `BINARY_CONTENT` to the output path
    Succeed,
    /// Return a compile error with these diagnostics
    Fail(String),
    /// Write half a binary and fail, like a killed compiler
    PartialThenFail,
}

#[derive(Debug, Default)]
struct Counters {
    versions: AtomicUsize,
    resolutions: AtomicUsize,
    compiles: AtomicUsize,
    resolution_failures_left: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct FakeToolchain {
    counters: Arc<Counters>,
    version: Option<String>,
    compile: CompileBehavior,
    publish_on_resolve: Option<(PathBuf, Vec<u8>)>,
    publish_on_compile: Option<(PathBuf, Vec<u8>)>,
    outputs: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeToolchain {
    pub const BINARY_CONTENT: &'static [u8] = b"\x7fELF fake binary";

    pub fn new() -> Self {
        Self {
            counters: Arc::default(),
            version: Some("go1.22.1".to_string()),
            compile: CompileBehavior::Succeed,
            publish_on_resolve: None,
            publish_on_compile: None,
            outputs: Arc::default(),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    pub fn with_compile(mut self, behavior: CompileBehavior) -> Self {
        self.compile = behavior;
        self
    }

    /// Fail the first `n` dependency resolutions
    pub fn fail_resolutions(self, n: usize) -> Self {
        self.counters
            .resolution_failures_left
            .store(n, Ordering::SeqCst);
        self
    }

    /// Simulate another process publishing `binary` during resolution
    pub fn publish_on_resolve(mut self, binary: PathBuf, content: &[u8]) -> Self {
        self.publish_on_resolve = Some((binary, content.to_vec()));
        self
    }

    /// Simulate another process publishing `binary` while we compile
    pub fn publish_on_compile(mut self, binary: PathBuf, content: &[u8]) -> Self {
        self.publish_on_compile = Some((binary, content.to_vec()));
        self
    }

    pub fn version_queries(&self) -> usize {
        self.counters.versions.load(Ordering::SeqCst)
    }

    pub fn resolutions(&self) -> usize {
        self.counters.resolutions.load(Ordering::SeqCst)
    }

    pub fn compiles(&self) -> usize {
        self.counters.compiles.load(Ordering::SeqCst)
    }

    /// Output paths passed to `compile`, in call order
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Toolchain for FakeToolchain {
    async fn version(&self) -> GoscriptResult<String> {
        self.counters.versions.fetch_add(1, Ordering::SeqCst);
        self.version
            .clone()
            .ok_or_else(|| GoscriptError::User("fake: no version".to_string()))
    }

    async fn resolve_dependencies(&self, _workspace: &Path) -> GoscriptResult<()> {
        self.counters.resolutions.fetch_add(1, Ordering::SeqCst);

        let left = &self.counters.resolution_failures_left;
        if left.load(Ordering::SeqCst) > 0 {
            left.fetch_sub(1, Ordering::SeqCst);
            return Err(GoscriptError::DependencyResolution {
                diagnostics: "go: module example.com/missing: not found".to_string(),
            });
        }

        if let Some((binary, content)) = &self.publish_on_resolve {
            std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
            std::fs::write(binary, content).unwrap();
        }
        Ok(())
    }

    async fn compile(&self, _workspace: &Path, _entry: &str, output: &Path) -> GoscriptResult<()> {
        self.counters.compiles.fetch_add(1, Ordering::SeqCst);
        self.outputs.lock().unwrap().push(output.to_path_buf());

        if let Some((binary, content)) = &self.publish_on_compile {
            std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
            std::fs::write(binary, content).unwrap();
        }

        match &self.compile {
            CompileBehavior::Succeed => {
                std::fs::write(output, Self::BINARY_CONTENT).unwrap();
                Ok(())
            }
            CompileBehavior::Fail(diagnostics) => Err(GoscriptError::Compile {
                diagnostics: diagnostics.clone(),
            }),
            CompileBehavior::PartialThenFail => {
                std::fs::write(output, &Self::BINARY_CONTENT[..4]).unwrap();
                Err(GoscriptError::Compile {
                    diagnostics: "signal: killed".to_string(),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Write an executable `/bin/sh` script standing in for the `go` command
#[cfg(unix)]
pub fn shell_toolchain(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-go");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Whether `pid` is a live process; zombies count as dead
#[cfg(target_os = "linux")]
pub fn process_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit_once(')')
            .map(|(_, rest)| !rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Poll until `pid` is gone, giving up after two seconds
#[cfg(target_os = "linux")]
pub async fn wait_for_exit(pid: u32) -> bool {
    for _ in 0..40 {
        if !process_alive(pid) {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    false
}
