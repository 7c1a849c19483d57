use anyhow::{Context, Result};
use log::warn;
use std::collections::HashSet;
use std::path::Path;

/// Parse a target list: one identifier per line.
///
/// Surrounding whitespace is trimmed and blank lines are ignored. A name that
/// appears more than once is kept at its first position.
pub fn parse_target_list(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        if !seen.insert(name.to_string()) {
            warn!("Duplicate target '{}' on line {} ignored", name, line_no + 1);
            continue;
        }
        names.push(name.to_string());
    }

    names
}

/// Read and parse a target list file.
pub fn load_target_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read targets file: {}", path.display()))?;

    Ok(parse_target_list(&content))
}
