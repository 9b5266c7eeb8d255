//! High-level pipeline: orchestrates stage → commit → push per site.
//!
//! The run is a linear, fail-fast pipeline with no branching beyond
//! error short-circuiting. Progress lines are printed to stdout before
//! each blocking step so an operator can interrupt between steps;
//! interrupting mid-push may leave the remote inconsistent (see README).
//!
//! # Callable From
//! - Used by both the CLI entrypoint and integration tests
//! - Expects a concrete [`BranchStore`] implementation for commits and
//!   pushes; tests inject mocks
//!
//! # Error Handling
//! Each failed step returns immediately. Staging failures happen before
//! any commit; a push failure leaves the local commit intact, and the
//! error log names the commit so the operator can re-push manually.

use std::path::Path;

use tracing::{error, info};

use crate::config::PublishConfig;
use crate::stage::stage;
use crate::store::{BranchStore, CommitOutcome, PublishError};

/// Output report with the commit outcome per site, for downstream audit.
#[derive(Debug)]
pub struct PublishReport {
    pub sites: Vec<SiteReport>,
}

#[derive(Debug)]
pub struct SiteReport {
    pub branch: String,
    pub remote: String,
    pub outcome: CommitOutcome,
    pub pushed: bool,
}

/// Entrypoint: publish every configured site using the given store.
/// Relative mapping sources are resolved against `repo_root`.
pub fn publish<S>(
    config: &PublishConfig,
    repo_root: &Path,
    store: &S,
) -> Result<PublishReport, PublishError>
where
    S: BranchStore,
{
    info!(sites = config.sites.len(), "Starting publish pipeline");
    let mut sites: Vec<SiteReport> = Vec::new();

    for site in &config.sites {
        site.trace_loaded();

        println!("Staging {}", site.branch);
        let snapshot = match stage(site, repo_root) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(branch = %site.branch, error = %e, "Staging failed, no commit was created");
                return Err(e);
            }
        };

        println!("Committing");
        let outcome = match store.commit(snapshot.root(), site) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(branch = %site.branch, error = %e, "Commit failed");
                return Err(e);
            }
        };
        match &outcome {
            CommitOutcome::Committed(commit) => {
                info!(branch = %site.branch, commit = %commit, "Commit created");
            }
            CommitOutcome::NoChanges => {
                info!(branch = %site.branch, "No changes against branch tip");
            }
        }

        // Push even on NoChanges: the remote may still be behind the tip.
        println!("Pushing");
        if let Err(e) = store.push(site) {
            match &outcome {
                CommitOutcome::Committed(commit) => {
                    error!(
                        branch = %site.branch,
                        commit = %commit,
                        error = %e,
                        "Push failed; the local commit is intact, re-push manually"
                    );
                }
                CommitOutcome::NoChanges => {
                    error!(branch = %site.branch, error = %e, "Push failed");
                }
            }
            return Err(e);
        }

        sites.push(SiteReport {
            branch: site.branch.clone(),
            remote: site.remote.clone(),
            outcome,
            pushed: true,
        });
    }

    info!(sites = sites.len(), "Publish pipeline complete");
    Ok(PublishReport { sites })
}
