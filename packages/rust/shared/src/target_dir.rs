//! Readiness check for a directory that is about to receive a document.

use std::path::Path;

use tracing::debug;

use crate::error::{AdptError, Result};

/// Check whether `dir` can be used to create a document.
///
/// - `create == false` and `dir` missing: nothing to check, returns `Ok`.
/// - otherwise the directory is created (with parents) if needed, and an
///   existing non-empty directory is rejected unless `overwrite` is set.
pub fn check_target_directory(dir: &Path, overwrite: bool, create: bool) -> Result<()> {
    if !create && !dir.exists() {
        return Ok(());
    }

    std::fs::create_dir_all(dir).map_err(|e| AdptError::io(dir, e))?;
    if overwrite {
        debug!(path = %dir.display(), "target directory ready (overwrite allowed)");
        return Ok(());
    }

    let mut entries = std::fs::read_dir(dir).map_err(|e| AdptError::io(dir, e))?;
    if entries.next().is_some() {
        return Err(AdptError::validation(format!(
            "the directory {} exists and is not empty",
            dir.display()
        )));
    }

    debug!(path = %dir.display(), "target directory ready");
    Ok(())
}
