use std::fs::write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use gh_pages_push::config::MappingKind;
use gh_pages_push::load_config::load_config;

/// A full config produces a validated PublishConfig with mappings in
/// declaration order: directories first, then single files.
#[test]
fn load_config_parses_full_site() {
    let config_yaml = r#"
sites:
  - branch: gh-pages
    remote: origin
    message: "pushing autogenerated doc files to gh-pages"
    directories:
      - source: doc/docbook
        dest: docbook
      - source: doc/doxygen
        dest: doxygen
    files:
      - source: doc/index.html
        dest: index.html
    preserve:
      - CNAME
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.sites.len(), 1);
    let site = &config.sites[0];
    assert_eq!(site.branch, "gh-pages");
    assert_eq!(site.remote, "origin");
    assert_eq!(site.message, "pushing autogenerated doc files to gh-pages");
    assert_eq!(site.preserve, vec!["CNAME".to_string()]);

    assert_eq!(site.mappings.len(), 3);
    assert_eq!(site.mappings[0].source, PathBuf::from("doc/docbook"));
    assert_eq!(site.mappings[0].dest, "docbook");
    assert_eq!(site.mappings[0].kind, MappingKind::Directory);
    assert_eq!(site.mappings[1].dest, "doxygen");
    assert_eq!(site.mappings[1].kind, MappingKind::Directory);
    assert_eq!(site.mappings[2].source, PathBuf::from("doc/index.html"));
    assert_eq!(site.mappings[2].dest, "index.html");
    assert_eq!(site.mappings[2].kind, MappingKind::File);
}

/// Branch, remote and message fall back to the gh-pages defaults.
#[test]
fn load_config_applies_defaults() {
    let config_yaml = r#"
sites:
  - files:
      - source: doc/index.html
        dest: index.html
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");
    let site = &config.sites[0];
    assert_eq!(site.branch, "gh-pages");
    assert_eq!(site.remote, "origin");
    assert_eq!(site.message, "pushing autogenerated doc files to gh-pages");
    assert!(site.preserve.is_empty());
}

/// A site without any mapping is a configuration error.
#[test]
fn load_config_errors_on_site_without_mappings() {
    let config_yaml = r#"
sites:
  - branch: gh-pages
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains("mapping"),
        "Expected a mapping error, got: {err}"
    );
}

/// Destinations must stay inside the branch root.
#[test]
fn load_config_errors_on_escaping_dest() {
    let config_yaml = r#"
sites:
  - files:
      - source: doc/index.html
        dest: ../index.html
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(
        msg.contains(".."),
        "Expected a relative-path error, got: {msg}"
    );
}

/// If the config file is not valid YAML, load_config reports it as such.
#[test]
fn load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

/// A config with no sites at all is rejected.
#[test]
fn load_config_errors_on_empty_sites() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"sites: []").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains("no sites"),
        "Expected an empty-sites error, got: {err}"
    );
}
