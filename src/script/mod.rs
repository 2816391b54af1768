//! Script sources
//!
//! Turns what the user handed us (a file with a shebang line, or an inline
//! snippet) into plain Go source ready for hashing and building.

pub mod inline;

pub use inline::{fix_imports, inline_to_script};

use std::borrow::Cow;

/// Drop a leading `#!` line, keeping its newline so that line numbers in
/// compiler diagnostics still match the original file.
pub fn strip_shebang(content: &[u8]) -> Cow<'_, [u8]> {
    if !content.starts_with(b"#!") {
        return Cow::Borrowed(content);
    }
    match content.iter().position(|&b| b == b'\n') {
        Some(newline) => Cow::Borrowed(&content[newline..]),
        None => Cow::Owned(Vec::new()),
    }
}
