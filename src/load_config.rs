use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{Mapping, MappingKind, PublishConfig, SiteSpec};

#[derive(Deserialize)]
struct StaticConfig {
    sites: Vec<SiteYaml>,
}

#[derive(Deserialize)]
struct SiteYaml {
    #[serde(default = "default_branch")]
    branch: String,
    #[serde(default = "default_remote")]
    remote: String,
    #[serde(default = "default_message")]
    message: String,
    #[serde(default)]
    directories: Vec<MappingYaml>,
    #[serde(default)]
    files: Vec<MappingYaml>,
    #[serde(default)]
    preserve: Vec<String>,
}

#[derive(Deserialize)]
struct MappingYaml {
    source: PathBuf,
    dest: String,
}

fn default_branch() -> String {
    "gh-pages".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_message() -> String {
    "pushing autogenerated doc files to gh-pages".to_string()
}

/// Loads the static YAML config and validates it into a [`PublishConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PublishConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if static_conf.sites.is_empty() {
        anyhow::bail!("Config declares no sites");
    }

    let mut sites = Vec::new();
    for site in static_conf.sites {
        sites.push(validate_site(site)?);
    }

    let config = PublishConfig { sites };
    config.trace_loaded();
    Ok(config)
}

fn validate_site(site: SiteYaml) -> Result<SiteSpec> {
    if site.branch.is_empty() {
        anyhow::bail!("Site branch name must not be empty");
    }
    if site.remote.is_empty() {
        anyhow::bail!("Site remote name must not be empty");
    }
    if site.directories.is_empty() && site.files.is_empty() {
        anyhow::bail!("Site '{}' declares no directory or file mappings", site.branch);
    }

    // Declaration order matters for last-wins overlap: directories first,
    // then single files, matching the order they appear in the config.
    let mut mappings = Vec::new();
    for dir in site.directories {
        mappings.push(to_mapping(dir, MappingKind::Directory, &site.branch)?);
    }
    for file in site.files {
        mappings.push(to_mapping(file, MappingKind::File, &site.branch)?);
    }

    for preserved in &site.preserve {
        check_branch_relative(preserved, &site.branch)
            .with_context(|| format!("Invalid preserve entry '{preserved}'"))?;
    }

    Ok(SiteSpec {
        branch: site.branch,
        remote: site.remote,
        message: site.message,
        mappings,
        preserve: site.preserve,
    })
}

fn to_mapping(raw: MappingYaml, kind: MappingKind, branch: &str) -> Result<Mapping> {
    check_branch_relative(&raw.dest, branch)
        .with_context(|| format!("Invalid dest '{}'", raw.dest))?;
    Ok(Mapping {
        source: raw.source,
        dest: raw.dest,
        kind,
    })
}

/// Destinations and preserve entries must stay inside the branch root.
fn check_branch_relative(path: &str, branch: &str) -> Result<()> {
    if path.is_empty() {
        anyhow::bail!("Site '{branch}': path must not be empty");
    }
    let p = Path::new(path);
    if p.is_absolute() {
        anyhow::bail!("Site '{branch}': path must be relative to the branch root");
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        anyhow::bail!("Site '{branch}': path must not contain '..'");
    }
    Ok(())
}
