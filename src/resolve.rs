//! Content to executable: hash, look up, build on miss

use crate::build::Builder;
use crate::cache::{CacheKey, Resolved, Store};
use crate::error::GoscriptResult;
use crate::script::strip_shebang;
use tracing::{debug, info};

/// How a script was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The binary was already published
    Hit,
    /// The binary was built by this call (or by a racing process meanwhile)
    Built,
}

/// Resolves script content to a published binary
pub struct Resolver {
    builder: Builder,
}

impl Resolver {
    pub fn new(builder: Builder) -> Self {
        Self { builder }
    }

    pub fn store(&self) -> &Store {
        self.builder.store()
    }

    /// Resolve raw script bytes (shebang allowed) to a binary
    pub async fn resolve(&self, raw: &[u8]) -> GoscriptResult<Resolved> {
        self.resolve_with(raw, |_| {}).await.map(|(resolved, _)| resolved)
    }

    /// Like [`resolve`](Self::resolve), calling `on_build` before a build starts
    pub async fn resolve_with(
        &self,
        raw: &[u8],
        on_build: impl FnOnce(&CacheKey),
    ) -> GoscriptResult<(Resolved, Outcome)> {
        let content = strip_shebang(raw);
        let key = CacheKey::compute(&content);
        debug!("Script key: {}", key);

        if let Some(resolved) = self.store().lookup(&key).await? {
            return Ok((resolved, Outcome::Hit));
        }

        info!("Cache miss for {}, building", key.short());
        on_build(&key);
        let resolved = self.builder.build(&key, &content).await?;
        Ok((resolved, Outcome::Built))
    }
}
