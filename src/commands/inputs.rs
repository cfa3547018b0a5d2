use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

/// Compiles an input pattern matched against `/`-separated relative paths.
///
/// `*` and `?` never cross a directory boundary, `**` does.
pub fn input_matcher(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("Invalid input pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Files under `directory` whose relative path matches the glob `pattern`.
pub fn discover_inputs(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = input_matcher(pattern)?;
    let mut matches = Vec::new();
    for entry in WalkDir::new(directory)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(directory) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if matcher.is_match(&relative) {
            matches.push(entry.into_path());
        }
    }
    Ok(matches)
}
