use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project-local configuration file
pub const CONFIG_FILE: &str = "release.toml";

/// Represents the complete configuration for dataset-release.
///
/// Every section is optional; defaults match the conventional repository
/// layout (`data/<dataset>/manifest.json`, `version.json`, `dist/`).
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub packaging: PackagingConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

fn default_version_file() -> String {
    "version.json".to_string()
}

fn default_plan_file() -> String {
    "bump_plan.json".to_string()
}

fn default_tags_file() -> String {
    "tags_created.json".to_string()
}

fn default_dataset_manifest() -> String {
    "manifest.json".to_string()
}

/// Repository-relative locations of data and pipeline records.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PathsConfig {
    /// Data namespace; each sub-directory is a dataset
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Output directory for release archives
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,

    /// Repository version record
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Bump plan written by `plan` and read by `apply`
    #[serde(default = "default_plan_file")]
    pub plan_file: String,

    /// Created tags written by `apply` and read by `publish`
    #[serde(default = "default_tags_file")]
    pub tags_file: String,

    /// Per-dataset manifest file name, relative to the dataset directory
    #[serde(default = "default_dataset_manifest")]
    pub dataset_manifest: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            data_dir: default_data_dir(),
            dist_dir: default_dist_dir(),
            version_file: default_version_file(),
            plan_file: default_plan_file(),
            tags_file: default_tags_file(),
            dataset_manifest: default_dataset_manifest(),
        }
    }
}

fn default_repository_name() -> String {
    "game-data".to_string()
}

fn default_repository_description() -> String {
    "Versioned game data collection".to_string()
}

/// Defaults used when the repository version record has to be recreated.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryConfig {
    #[serde(default = "default_repository_name")]
    pub name: String,

    #[serde(default = "default_repository_description")]
    pub description: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            name: default_repository_name(),
            description: default_repository_description(),
        }
    }
}

fn default_extension() -> String {
    "json".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackagingConfig {
    /// Extension of data files, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        PackagingConfig {
            extension: default_extension(),
        }
    }
}

fn default_publish_command() -> String {
    "gh".to_string()
}

fn default_true() -> bool {
    true
}

/// Settings for the release host CLI.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    #[serde(default = "default_publish_command")]
    pub command: String,

    #[serde(default = "default_true")]
    pub generate_notes: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            command: default_publish_command(),
            generate_notes: true,
        }
    }
}

/// Filesystem layout of a repository, resolved against its root.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: Config,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Workspace {
            root: root.into(),
            config,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.data_dir)
    }

    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.data_dir().join(dataset)
    }

    pub fn dataset_manifest(&self, dataset: &str) -> PathBuf {
        self.dataset_dir(dataset)
            .join(&self.config.paths.dataset_manifest)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.dist_dir)
    }

    pub fn version_file(&self) -> PathBuf {
        self.root.join(&self.config.paths.version_file)
    }

    pub fn plan_file(&self) -> PathBuf {
        self.root.join(&self.config.paths.plan_file)
    }

    pub fn tags_file(&self) -> PathBuf {
        self.root.join(&self.config.paths.tags_file)
    }

    /// Data namespace as it appears in git paths (`/`-separated)
    pub fn data_namespace(&self) -> String {
        self.config
            .paths
            .data_dir
            .replace('\\', "/")
            .trim_end_matches('/')
            .to_string()
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in the repository root
/// 3. `.dataset-release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, root: &Path) -> Result<Config> {
    let path = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if root.join(CONFIG_FILE).exists() {
        Some(root.join(CONFIG_FILE))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(".dataset-release.toml"))
            .filter(|path| path.exists())
    };

    match path {
        Some(path) => {
            let contents = fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            parse_config(&contents)
                .map_err(|e| ReleaseError::config(format!("{}: {}", path.display(), e)))
        }
        None => Ok(Config::default()),
    }
}

/// Parse configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| ReleaseError::config(e.to_string()))
}
