use std::path::PathBuf;
use tracing::{debug, info};

/// The full static configuration for a publish run: one or more sites.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub sites: Vec<SiteSpec>,
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        info!(sites_count = self.sites.len(), "Loaded publish config");
        debug!(?self, "Publish config loaded (full debug)");
    }
}

/// Declarative description of one published site: which branch to write,
/// which remote to push it to, and the ordered source-to-destination
/// mappings that make up the branch content.
#[derive(Debug, Clone)]
pub struct SiteSpec {
    pub branch: String,
    pub remote: String,
    pub message: String,
    /// Ordered; later entries win at overlapping destinations.
    pub mappings: Vec<Mapping>,
    /// Branch-relative paths carried over from the branch tip instead of
    /// being deleted. Everything else not mapped is removed.
    pub preserve: Vec<String>,
}

impl SiteSpec {
    pub fn trace_loaded(&self) {
        info!(
            branch = %self.branch,
            remote = %self.remote,
            mappings_count = self.mappings.len(),
            preserve_count = self.preserve.len(),
            "Loaded site spec"
        );
    }
}

/// One source-to-destination copy. `dest` is relative to the branch root.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub source: PathBuf,
    pub dest: String,
    pub kind: MappingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    /// Copied singly.
    File,
    /// Copied recursively.
    Directory,
}
