//! goscript - run Go source files as scripts
//!
//! Script content is hashed into a cache key; the compiled binary is
//! published under that key so later runs of the same content skip the
//! compiler entirely.

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod resolve;
pub mod script;
pub mod ui;

pub use error::{GoscriptError, GoscriptResult};
