//! Staging: assemble the intended branch content in a temporary
//! directory before anything touches version control.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::config::{MappingKind, SiteSpec};
use crate::store::PublishError;

/// The staged content of a future commit. Holds a temp directory that is
/// removed on drop, whatever the outcome of the run.
#[derive(Debug)]
pub struct BranchSnapshot {
    dir: TempDir,
}

impl BranchSnapshot {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Copies every mapping of `site` into a fresh snapshot, in declaration
/// order. Later entries overwrite earlier ones at overlapping
/// destinations. Relative sources are resolved against `repo_root`.
///
/// Fails with [`PublishError::SourceNotFound`] before copying anything
/// for a missing source, so a failed staging never leaves a partial
/// commit behind.
pub fn stage(site: &SiteSpec, repo_root: &Path) -> Result<BranchSnapshot, PublishError> {
    let dir = TempDir::new()?;
    info!(
        branch = %site.branch,
        snapshot = %dir.path().display(),
        "Staging snapshot"
    );

    for mapping in &site.mappings {
        let source = if mapping.source.is_absolute() {
            mapping.source.clone()
        } else {
            repo_root.join(&mapping.source)
        };
        if !source.exists() {
            error!(source = %source.display(), "Mapped source path does not exist");
            return Err(PublishError::SourceNotFound { path: source });
        }

        let dest = dir.path().join(&mapping.dest);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        match mapping.kind {
            MappingKind::File => {
                // last-wins: a directory staged earlier at this dest is replaced
                if dest.is_dir() {
                    fs::remove_dir_all(&dest)?;
                }
                fs::copy(&source, &dest)?;
                debug!(source = %source.display(), dest = %dest.display(), "Staged file");
            }
            MappingKind::Directory => {
                if dest.is_file() {
                    fs::remove_file(&dest)?;
                }
                copy_dir(&source, &dest)?;
                debug!(source = %source.display(), dest = %dest.display(), "Staged directory");
            }
        }
    }

    info!(
        branch = %site.branch,
        mappings = site.mappings.len(),
        "Snapshot staged"
    );
    Ok(BranchSnapshot { dir })
}

/// Recursive copy, merging into an existing destination and overwriting
/// files that are already there.
fn copy_dir(src: &Path, dst: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            if to.is_dir() {
                fs::remove_dir_all(&to)?;
            }
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}
