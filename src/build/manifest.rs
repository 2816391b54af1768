//! Synthesized `go.mod` for a script workspace

use crate::cache::CacheKey;

/// Module path prefix for every generated workspace
pub const MODULE_PREFIX: &str = "goscript";

/// Reduce a toolchain version to the `go` directive form.
///
/// `go1.22.1` → `1.22`, `go1.23rc1` → `1.23rc1`, garbage → `None`.
pub fn go_directive(version: &str) -> Option<String> {
    let v = version.trim();
    let v = v.strip_prefix("go").unwrap_or(v);
    // `go env GOVERSION` may carry build tags: "go1.22.1 X:nocoverageredesign"
    let v = v.split_whitespace().next()?;

    let mut parts = v.split('.');
    let major = parts.next().filter(|s| !s.is_empty())?;
    if !major.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match parts.next() {
        Some(minor) if !minor.is_empty() => Some(format!("{}.{}", major, minor)),
        _ => Some(major.to_string()),
    }
}

/// Render a minimal module file naming the module after `key`
pub fn render(key: &CacheKey, version: Option<&str>) -> String {
    let mut out = format!("module {}/{}\n", MODULE_PREFIX, key);
    if let Some(directive) = version.and_then(go_directive) {
        out.push_str(&format!("\ngo {}\n", directive));
    }
    out
}
