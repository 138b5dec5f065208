// tests/config_test.rs
use dataset_release::config::{load_config, Config, CONFIG_FILE};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_default_config() {
    let config = Config::default();

    assert_eq!(config.paths.data_dir, "data");
    assert_eq!(config.paths.dist_dir, "dist");
    assert_eq!(config.paths.version_file, "version.json");
    assert_eq!(config.publish.command, "gh");
}

#[test]
fn test_load_from_explicit_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[paths]
data_dir = "rulesets"
dist_dir = "build/dist"

[packaging]
extension = "yaml"

[publish]
generate_notes = false
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let root = TempDir::new().unwrap();
    let config = load_config(Some(temp_file.path()), root.path()).unwrap();

    assert_eq!(config.paths.data_dir, "rulesets");
    assert_eq!(config.paths.dist_dir, "build/dist");
    assert_eq!(config.paths.plan_file, "bump_plan.json");
    assert_eq!(config.packaging.extension, "yaml");
    assert!(!config.publish.generate_notes);
    assert_eq!(config.publish.command, "gh");
}

#[test]
fn test_project_file_in_root_is_used() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join(CONFIG_FILE),
        "[repository]\nname = \"campaigner-data\"\n",
    )
    .unwrap();

    let config = load_config(None, root.path()).unwrap();
    assert_eq!(config.repository.name, "campaigner-data");
}

#[test]
fn test_explicit_file_wins_over_project_file() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE), "[paths]\ndata_dir = \"project\"\n").unwrap();

    let mut explicit = NamedTempFile::new().unwrap();
    explicit.write_all(b"[paths]\ndata_dir = \"explicit\"\n").unwrap();
    explicit.flush().unwrap();

    let config = load_config(Some(explicit.path()), root.path()).unwrap();
    assert_eq!(config.paths.data_dir, "explicit");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let root = TempDir::new().unwrap();
    let err = load_config(Some(&root.path().join("nope.toml")), root.path()).unwrap_err();
    assert!(err.to_string().contains("Cannot read"));
}

#[test]
fn test_malformed_project_file_is_an_error() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE), "[paths\n").unwrap();

    let err = load_config(None, root.path()).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
