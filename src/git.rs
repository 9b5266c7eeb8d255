//! Git CLI backend: implements [`BranchStore`] by driving the `git`
//! binary, never touching the repository's working tree or HEAD.
//!
//! Commits are built through a throwaway index (`GIT_INDEX_FILE`) with
//! `GIT_WORK_TREE` pointed at the staged snapshot: `read-tree --empty`,
//! `add -A`, `write-tree`, `commit-tree`, `update-ref`. Preserved
//! entries are carried over by reading the branch tip into the index and
//! materialising them into the snapshot with `checkout-index` before the
//! index is reset.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::config::SiteSpec;
use crate::store::{BranchStore, CommitOutcome, CommitRef, PublishError};

#[derive(Debug)]
pub struct GitCli {
    repo_root: PathBuf,
    git_dir: PathBuf,
}

impl GitCli {
    /// Locates the repository containing `repo_root`.
    pub fn discover(repo_root: &Path) -> Result<Self, PublishError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(repo_root)
            .args(["rev-parse", "--absolute-git-dir"])
            .output()
            .map_err(|e| {
                error!(error = ?e, "Failed to launch git for repository discovery");
                PublishError::Config(format!("failed to launch git: {e}"))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                path = %repo_root.display(),
                stderr = %stderr.trim(),
                "Not a git repository"
            );
            return Err(PublishError::Config(format!(
                "not a git repository: {}",
                repo_root.display()
            )));
        }
        let git_dir = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        debug!(git_dir = %git_dir.display(), "Discovered git dir");
        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            git_dir,
        })
    }

    /// Builds a git command against the throwaway index and the snapshot
    /// as the working tree. The real index and working tree are never
    /// consulted or modified.
    fn snapshot_git(&self, snapshot_root: &Path, index: &Path) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(snapshot_root)
            .env("GIT_DIR", &self.git_dir)
            .env("GIT_WORK_TREE", snapshot_root)
            .env("GIT_INDEX_FILE", index);
        cmd
    }

    fn run(mut cmd: Command, what: &str, branch: &str) -> Result<String, PublishError> {
        debug!(what = what, "Running git step");
        let output = cmd.output().map_err(|e| PublishError::CommitFailed {
            branch: branch.to_string(),
            reason: format!("failed to launch git {what}: {e}"),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                what = what,
                status = ?output.status,
                stderr = %stderr.trim(),
                "Git step failed"
            );
            return Err(PublishError::CommitFailed {
                branch: branch.to_string(),
                reason: format!("git {what} exited with {}: {}", output.status, stderr.trim()),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Resolves a ref to a full object id, or None if it does not exist.
    fn rev_parse_opt(&self, rev: &str) -> Result<Option<String>, PublishError> {
        let output = Command::new("git")
            .env("GIT_DIR", &self.git_dir)
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(rev)
            .output()
            .map_err(PublishError::Io)?;
        if output.status.success() {
            Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else {
            Ok(None)
        }
    }

    /// The branch currently checked out in the real working tree, if HEAD
    /// is not detached.
    fn head_branch_ref(&self) -> Result<Option<String>, PublishError> {
        let output = Command::new("git")
            .env("GIT_DIR", &self.git_dir)
            .args(["symbolic-ref", "--quiet", "HEAD"])
            .output()
            .map_err(PublishError::Io)?;
        if output.status.success() {
            Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else {
            Ok(None)
        }
    }

    /// Copies the tracked `preserve` paths of the branch tip into the
    /// snapshot, so the subsequent `add -A` keeps them in the new tree.
    fn carry_preserved(
        &self,
        snapshot_root: &Path,
        index: &Path,
        branch_ref: &str,
        site: &SiteSpec,
    ) -> Result<(), PublishError> {
        let mut cmd = self.snapshot_git(snapshot_root, index);
        cmd.args(["read-tree", branch_ref]);
        Self::run(cmd, "read-tree", &site.branch)?;

        let mut cmd = self.snapshot_git(snapshot_root, index);
        cmd.args(["ls-files", "-z", "--"]).args(&site.preserve);
        let listing = Self::run(cmd, "ls-files", &site.branch)?;
        if listing.is_empty() {
            debug!(branch = %site.branch, "No tracked entries match the preserve list");
            return Ok(());
        }

        let mut child = self
            .snapshot_git(snapshot_root, index)
            .args(["checkout-index", "-f", "-z", "--stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PublishError::CommitFailed {
                branch: site.branch.clone(),
                reason: format!("failed to launch git checkout-index: {e}"),
            })?;
        child
            .stdin
            .take()
            .ok_or_else(|| PublishError::CommitFailed {
                branch: site.branch.clone(),
                reason: "git checkout-index stdin unavailable".to_string(),
            })?
            .write_all(listing.as_bytes())?;
        let output = child.wait_with_output().map_err(PublishError::Io)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PublishError::CommitFailed {
                branch: site.branch.clone(),
                reason: format!(
                    "git checkout-index exited with {}: {}",
                    output.status,
                    stderr.trim()
                ),
            });
        }
        info!(
            branch = %site.branch,
            preserve = ?site.preserve,
            "Carried preserved entries into snapshot"
        );
        Ok(())
    }
}

impl BranchStore for GitCli {
    fn commit(&self, snapshot_root: &Path, site: &SiteSpec) -> Result<CommitOutcome, PublishError> {
        let branch_ref = format!("refs/heads/{}", site.branch);

        // Advancing the checked-out branch would leave the real working
        // tree out of sync with its ref.
        if self.head_branch_ref()?.as_deref() == Some(branch_ref.as_str()) {
            return Err(PublishError::CommitFailed {
                branch: site.branch.clone(),
                reason: "branch is currently checked out; publish from a different branch"
                    .to_string(),
            });
        }

        let parent = self.rev_parse_opt(&branch_ref)?;
        let scratch = TempDir::new()?;
        let index = scratch.path().join("index");

        if parent.is_some() && !site.preserve.is_empty() {
            self.carry_preserved(snapshot_root, &index, &branch_ref, site)?;
        }

        // Tree content is exactly the snapshot, nothing inherited.
        let mut cmd = self.snapshot_git(snapshot_root, &index);
        cmd.args(["read-tree", "--empty"]);
        Self::run(cmd, "read-tree --empty", &site.branch)?;

        // -f: ignore rules (.gitignore in copied trees, info/exclude,
        // global excludes) must not filter the published content
        let mut cmd = self.snapshot_git(snapshot_root, &index);
        cmd.args(["add", "-A", "-f"]);
        Self::run(cmd, "add", &site.branch)?;

        let mut cmd = self.snapshot_git(snapshot_root, &index);
        cmd.arg("write-tree");
        let tree = Self::run(cmd, "write-tree", &site.branch)?;
        debug!(tree = %tree, branch = %site.branch, "Wrote snapshot tree");

        if let Some(parent_commit) = &parent {
            let parent_tree = self
                .rev_parse_opt(&format!("{parent_commit}^{{tree}}"))?
                .ok_or_else(|| PublishError::CommitFailed {
                    branch: site.branch.clone(),
                    reason: format!("cannot resolve tree of parent commit {parent_commit}"),
                })?;
            if parent_tree == tree {
                info!(branch = %site.branch, "Snapshot tree equals branch tip, nothing to commit");
                return Ok(CommitOutcome::NoChanges);
            }
        }

        let mut cmd = self.snapshot_git(snapshot_root, &index);
        cmd.arg("commit-tree").arg(&tree);
        if let Some(parent_commit) = &parent {
            cmd.arg("-p").arg(parent_commit);
        }
        cmd.arg("-m").arg(&site.message);
        let commit = Self::run(cmd, "commit-tree", &site.branch)?;

        let mut cmd = self.snapshot_git(snapshot_root, &index);
        cmd.args(["update-ref", "-m", "gh-pages-push: publish"])
            .arg(&branch_ref)
            .arg(&commit);
        Self::run(cmd, "update-ref", &site.branch)?;

        info!(
            branch = %site.branch,
            commit = %commit,
            parent = parent.as_deref().unwrap_or("<none>"),
            "Created publish commit"
        );
        Ok(CommitOutcome::Committed(CommitRef(commit)))
    }

    fn push(&self, site: &SiteSpec) -> Result<(), PublishError> {
        info!(remote = %site.remote, branch = %site.branch, "Pushing branch to remote");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .arg("push")
            .arg(&site.remote)
            .arg(&site.branch)
            .output()
            .map_err(|e| PublishError::PushRejected {
                remote: site.remote.clone(),
                branch: site.branch.clone(),
                reason: format!("failed to launch git push: {e}"),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                remote = %site.remote,
                branch = %site.branch,
                stderr = %stderr.trim(),
                "Git push rejected"
            );
            return Err(PublishError::PushRejected {
                remote: site.remote.clone(),
                branch: site.branch.clone(),
                reason: stderr.trim().to_string(),
            });
        }
        info!(remote = %site.remote, branch = %site.branch, "Push succeeded");
        Ok(())
    }
}
