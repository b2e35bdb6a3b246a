//! File-pattern expansion.
//!
//! Patterns use `glob` syntax (`*`, `?`, `[...]`) in the final path component only,
//! e.g. `logs/part-*.gz`.

use crate::error::{Result, SourceError};
use crate::source::validation::validate_file_path;
use glob::Pattern;
use std::path::{Path, PathBuf};

/// True if `spec` contains a wildcard character
pub fn is_wildcard(spec: &str) -> bool {
    spec.contains(['*', '?', '['])
}

/// Expand a file or pattern spec into concrete files, sorted by path
///
/// A concrete spec must name an existing file. A pattern that matches nothing expands to
/// an empty list.
pub async fn expand_file_pattern(spec: &str) -> Result<Vec<PathBuf>> {
    if !is_wildcard(spec) {
        let path = PathBuf::from(spec);
        validate_file_path(&path).await?;
        return Ok(vec![path]);
    }

    let path = Path::new(spec);
    let file_pattern = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        SourceError::invalid_configuration(format!("Pattern has no file name component: {spec}"))
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if is_wildcard(&dir.to_string_lossy()) {
        return Err(SourceError::invalid_configuration(format!(
            "Wildcards are only supported in the last path component: {spec}"
        )));
    }
    let pattern = Pattern::new(file_pattern).map_err(|e| {
        SourceError::invalid_configuration(format!("Invalid file pattern {spec}: {e}"))
    })?;

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        SourceError::file_error(format!("Failed to list directory: {}", dir.display()), e)
    })?;

    let mut matched = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SourceError::file_error("Failed to read directory entry", e))?
    {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| SourceError::file_error("Failed to read file type", e))?;
        if file_type.is_file() {
            matched.push(entry.path());
        }
    }

    matched.sort();
    log::debug!("{} expanded to {} file(s)", spec, matched.len());
    Ok(matched)
}
