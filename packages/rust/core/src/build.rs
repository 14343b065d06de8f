//! End-to-end `build` pipeline: configuration → master document → fragments on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use adpt_shared::{AdptError, Result};

use crate::assembler::{AssembleOptions, DocumentAssembler};
use crate::configuration::DocumentConfiguration;
use crate::fetch::Fetcher;

/// Result of [`build_document`].
#[derive(Debug)]
pub struct BuildResult {
    /// Path of the (re)written master document.
    pub master_path: PathBuf,
    /// Fragments created because they did not exist yet.
    pub created: Vec<PathBuf>,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each file written.
    fn file_written(&self, path: &Path);
    /// Called when the build completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_written(&self, _path: &Path) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Render the master document into `dir` and scaffold missing fragments.
///
/// 1. Render the master document (fetches the locale bundle)
/// 2. Overwrite `<dir>/<slug>.<ext>`
/// 3. Write the default colophon if the document has none
/// 4. Create a stub for every chapter fragment that does not exist yet
///
/// Existing fragments are never modified.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub async fn build_document<F: Fetcher>(
    dir: &Path,
    config: &DocumentConfiguration,
    fetcher: &F,
    options: AssembleOptions,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let source_dir = dir.join(&options.layout.source_dir);
    let assembler = DocumentAssembler::new(config, options)?;

    progress.phase("Rendering document");
    let text = assembler.render(fetcher).await?;

    progress.phase("Writing master document");
    let master_path = dir.join(assembler.master_file_name());
    std::fs::write(&master_path, text).map_err(|e| AdptError::io(&master_path, e))?;
    progress.file_written(&master_path);
    debug!(path = %master_path.display(), "wrote master document");

    progress.phase("Scaffolding fragments");
    std::fs::create_dir_all(&source_dir).map_err(|e| AdptError::io(&source_dir, e))?;

    let mut created = Vec::new();

    let colophon = dir.join(assembler.colophon_path());
    if write_if_missing(&colophon, DocumentAssembler::default_colophon())? {
        progress.file_written(&colophon);
        created.push(colophon);
    }

    for chapter in config.chapters() {
        let path = dir.join(assembler.chapter_path(chapter));
        if write_if_missing(&path, &format!("= {}\n", chapter.title))? {
            progress.file_written(&path);
            created.push(path);
        }
    }

    let result = BuildResult {
        master_path,
        created,
    };

    info!(
        master = %result.master_path.display(),
        created = result.created.len(),
        "build complete"
    );
    progress.done(&result);

    Ok(result)
}

/// Write `content` to `path` unless it already exists. Returns whether it wrote.
fn write_if_missing(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        debug!(path = %path.display(), "fragment exists, leaving it alone");
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AdptError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| AdptError::io(path, e))?;
    Ok(true)
}
