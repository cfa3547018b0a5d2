use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

/// True if both paths resolve to the same file on disk
pub fn same_file(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Copies `source` to `destination` unless they already are the same file.
pub fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if same_file(source, destination) {
        debug!("{} is already in place", destination.display());
        return Ok(());
    }
    fs::copy(source, destination).with_context(|| {
        format!(
            "Could not copy {} to {}",
            source.display(),
            destination.display()
        )
    })?;
    debug!("Copied {} to {}", source.display(), destination.display());
    Ok(())
}
