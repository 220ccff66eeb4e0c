//! Output sinks for crawled records.

use anyhow::{bail, Context, Result};
use docketcrawl_core::CaseRecord;
use std::path::Path;

pub const DEFAULT_JS_VAR: &str = "cipasFullData";

/// Pretty JSON array, non-ASCII kept verbatim.
pub fn render_json(records: &[CaseRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// `const <var> = <json>;` for embedding in a static page.
pub fn render_js(records: &[CaseRecord], var: &str) -> Result<String> {
    if !is_js_identifier(var) {
        bail!("not a usable JS identifier: {var:?}");
    }
    Ok(format!("const {var} = {};\n", render_json(records)?))
}

fn is_js_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
