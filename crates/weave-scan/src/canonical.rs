//! Canonicalization side effects.
//!
//! Markers are rewritten to their canonical spelling after a successful
//! decode, so a second scan of the same tree performs no renames at all.
//! This module is the only place the grammar touches the filesystem.

use std::fs;
use std::path::Path;

use tracing::debug;
use weave_model::{LinkError, Result};

/// Rename a marker file to its canonical name, if it is not already
/// canonical. Returns whether a rename happened.
pub fn rename_marker(dir: &Path, current: &str, canonical: &str) -> Result<bool> {
    if current == canonical {
        return Ok(false);
    }
    let from = dir.join(current);
    let to = dir.join(canonical);
    fs::rename(&from, &to).map_err(|source| LinkError::Rename { path: from.clone(), source })?;
    debug!(from = %from.display(), to = %canonical, "canonicalized marker");
    Ok(true)
}

/// Rename a placeholder directory (`_`) to its generated identity token.
pub fn rename_placeholder_dir(parent: &Path, token: &str) -> Result<()> {
    let from = parent.join("_");
    let to = parent.join(token);
    fs::rename(&from, &to).map_err(|source| LinkError::Rename { path: from.clone(), source })?;
    debug!(dir = %to.display(), "assigned identity to placeholder directory");
    Ok(())
}
