//! # store: interface between the publish pipeline and version control
//!
//! This module defines a single trait ([`BranchStore`]) and the concrete
//! supporting types for committing a staged snapshot onto a branch and
//! pushing that branch to a remote.
//!
//! ## Interface & Extensibility
//! - Implement the [`BranchStore`] trait to create new backends (the real
//!   git CLI backend lives in [`crate::git`]).
//! - Error handling is uniform: every operation returns [`PublishError`].
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests.

use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use thiserror::Error;

use crate::config::SiteSpec;

/// Error taxonomy for a publish run. Staging failures abort before any
/// commit; commit failures leave shared state untouched; a rejected push
/// leaves the local commit in place for manual retry.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("source path not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("commit on branch '{branch}' failed: {reason}")]
    CommitFailed { branch: String, reason: String },

    #[error("push of branch '{branch}' to '{remote}' rejected: {reason}")]
    PushRejected {
        remote: String,
        branch: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Identifier of a created commit (full hex object id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef(pub String);

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a commit attempt. A snapshot whose tree equals the branch
/// tip's tree creates no commit object and reports [`CommitOutcome::NoChanges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(CommitRef),
    NoChanges,
}

/// Trait for writing a staged snapshot to a branch and pushing it.
/// The implementor is responsible for all version-control side effects;
/// staging itself is pure filesystem work and stays out of this trait.
///
/// The trait is implemented by the real git backend and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait BranchStore {
    /// Create a commit on `site.branch` whose tree equals the snapshot
    /// content, plus any `site.preserve` entries carried over from the
    /// branch tip. Everything else previously on the branch is removed.
    fn commit(&self, snapshot_root: &Path, site: &SiteSpec) -> Result<CommitOutcome, PublishError>;

    /// Push `site.branch` to `site.remote`. Never rolls back the local
    /// commit on failure.
    fn push(&self, site: &SiteSpec) -> Result<(), PublishError>;
}
