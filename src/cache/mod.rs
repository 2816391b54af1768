//! Content-addressed build cache
//!
//! Script bodies are hashed into keys; each key owns one published binary
//! and one build workspace under the store root.
//!
//! # Entry States
//!
//! | Binary | Workspace | Meaning |
//! |--------|-----------|---------|
//! | absent | absent | Miss, never built |
//! | absent | present | Miss, earlier build failed or was interrupted |
//! | present | any | Hit, binary is complete and immutable |
//!
//! Nothing is evicted automatically; see [`prune`] for explicit maintenance.

pub mod key;
pub mod prune;
pub mod store;

pub use key::CacheKey;
pub use prune::{format_bytes, CacheEntry};
pub use store::{resolve_root, store_root, Resolved, Store, BINARY_NAME, CACHE_DIR_ENV};
