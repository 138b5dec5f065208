use crate::config::{PublishConfig, Workspace};
use crate::domain::tag::previous_tag;
use crate::domain::{ReleaseTag, TagRef};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::packager::Packager;
use crate::records;
use crate::warning::ReleaseWarning;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// A service that hosts releases for tags
pub trait ReleaseHost {
    /// Create a release for `tag`.
    ///
    /// `previous` bounds the generated release notes; `asset` is attached
    /// when present.
    fn create_release(&self, tag: &str, previous: Option<&str>, asset: Option<&Path>) -> Result<()>;
}

/// Creates releases through the GitHub CLI
pub struct GhCliHost {
    command: String,
    generate_notes: bool,
    workdir: PathBuf,
}

impl GhCliHost {
    pub fn new(config: &PublishConfig, workdir: impl Into<PathBuf>) -> Self {
        GhCliHost {
            command: config.command.clone(),
            generate_notes: config.generate_notes,
            workdir: workdir.into(),
        }
    }

    /// Arguments passed to the CLI for one release
    pub fn arguments(&self, tag: &str, previous: Option<&str>, asset: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "release".to_string(),
            "create".to_string(),
            tag.to_string(),
            "--title".to_string(),
            tag.to_string(),
        ];

        if self.generate_notes {
            args.push("--generate-notes".to_string());
            if let Some(previous) = previous {
                args.push("--notes-start-tag".to_string());
                args.push(previous.to_string());
            }
        }

        if let Some(asset) = asset.filter(|asset| asset.exists()) {
            args.push(asset.display().to_string());
        }

        args
    }
}

impl ReleaseHost for GhCliHost {
    fn create_release(&self, tag: &str, previous: Option<&str>, asset: Option<&Path>) -> Result<()> {
        let args = self.arguments(tag, previous, asset);
        debug!(command = %self.command, ?args, "creating release");

        let output = Command::new(&self.command)
            .args(&args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| ReleaseError::publish(format!("Failed to run {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::publish(format!(
                "{} exited with code {}: {}",
                self.command,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Outcome of a publish run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishReport {
    /// Tags with a release, in record order
    pub published: Vec<String>,
    /// Tags whose release could not be created
    pub failed: Vec<String>,
    pub warnings: Vec<ReleaseWarning>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Creates hosted releases for the tags recorded by the applier
pub struct Publisher<'a, R: Repository, H: ReleaseHost> {
    repo: &'a R,
    host: &'a H,
    workspace: &'a Workspace,
}

impl<'a, R: Repository, H: ReleaseHost> Publisher<'a, R, H> {
    pub fn new(repo: &'a R, host: &'a H, workspace: &'a Workspace) -> Self {
        Publisher {
            repo,
            host,
            workspace,
        }
    }

    /// Publish a release for every recorded tag.
    ///
    /// A failed release is recorded and the remaining tags are still
    /// published. A missing tags record means there is nothing to publish.
    pub fn publish(&self) -> Result<PublishReport> {
        let mut report = PublishReport::default();

        let tags_path = self.workspace.tags_file();
        let Some(created) = records::load_created_tags(&tags_path)? else {
            report.warnings.push(ReleaseWarning::InputAbsent {
                what: "created tags record".to_string(),
                path: tags_path,
            });
            return Ok(report);
        };

        let known = match self.repo.list_tags() {
            Ok(tags) => tags,
            Err(e) => {
                warn!(error = %e, "listing tags failed, releasing without previous tags");
                report.warnings.push(ReleaseWarning::HistoryUnavailable {
                    query: "list tags".to_string(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };

        for tag in created {
            match self.publish_tag(&tag, &known, &mut report.warnings) {
                Ok(()) => report.published.push(tag),
                Err(e) => {
                    warn!(tag = %tag, error = %e, "release failed");
                    report.warnings.push(ReleaseWarning::ReleaseFailed {
                        tag: tag.clone(),
                        reason: e.to_string(),
                    });
                    report.failed.push(tag);
                }
            }
        }

        Ok(report)
    }

    fn publish_tag(&self, tag: &str, known: &[TagRef], warnings: &mut Vec<ReleaseWarning>) -> Result<()> {
        let release = ReleaseTag::parse(tag)
            .ok_or_else(|| ReleaseError::tag(format!("'{}' is not a release tag", tag)))?;
        let previous = previous_tag(known, &release).map(|prev| prev.name.as_str());

        let asset = match release.dataset_name() {
            Some(dataset) => {
                let version = release.version().to_string();
                match Packager::new(self.workspace).package(dataset, &version) {
                    Ok(archive) => Some(archive.path),
                    Err(e) => {
                        warn!(dataset, error = %e, "packaging failed");
                        warnings.push(ReleaseWarning::PackageSkipped {
                            dataset: dataset.to_string(),
                            reason: e.to_string(),
                        });
                        None
                    }
                }
            }
            None => None,
        };

        debug!(tag, previous = previous.unwrap_or("<none>"), "publishing");
        self.host.create_release(tag, previous, asset.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::MockRepository;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingHost {
        calls: RefCell<Vec<(String, Option<String>, Option<PathBuf>)>>,
        reject: Option<String>,
    }

    impl ReleaseHost for RecordingHost {
        fn create_release(&self, tag: &str, previous: Option<&str>, asset: Option<&Path>) -> Result<()> {
            if self.reject.as_deref() == Some(tag) {
                return Err(ReleaseError::publish("release already exists"));
            }
            self.calls.borrow_mut().push((
                tag.to_string(),
                previous.map(str::to_string),
                asset.map(Path::to_path_buf),
            ));
            Ok(())
        }
    }

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let dataset = dir.path().join("data/dnd5e");
        fs::create_dir_all(&dataset).unwrap();
        fs::write(dataset.join("races.json"), "[]").unwrap();
        fs::write(dataset.join("manifest.json"), r#"{"version": "1.1.0"}"#).unwrap();
        let workspace = Workspace::new(dir.path(), Config::default());
        (dir, workspace)
    }

    fn history() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: races", &["data/dnd5e/races.json"]);
        repo.add_tag("dnd5e-v1.0.0");
        repo.add_tag("v1.0.0");
        repo.add_commit("feat: spells", &["data/dnd5e/spells.json"]);
        repo.add_tag("dnd5e-v1.1.0");
        repo.add_tag("v1.1.0");
        repo
    }

    #[test]
    fn test_publish_recorded_tags() {
        let (_dir, workspace) = workspace();
        records::save_created_tags(
            &workspace.tags_file(),
            &["dnd5e-v1.1.0".to_string(), "v1.1.0".to_string()],
        )
        .unwrap();
        let repo = history();
        let host = RecordingHost::default();

        let report = Publisher::new(&repo, &host, &workspace).publish().unwrap();

        assert!(report.is_success());
        assert_eq!(report.published, vec!["dnd5e-v1.1.0", "v1.1.0"]);

        let calls = host.calls.borrow();
        assert_eq!(calls[0].1.as_deref(), Some("dnd5e-v1.0.0"));
        assert!(calls[0]
            .2
            .as_ref()
            .unwrap()
            .ends_with("dist/dnd5e-data-1.1.0.tar.gz"));
        assert_eq!(calls[1], ("v1.1.0".to_string(), Some("v1.0.0".to_string()), None));
    }

    #[test]
    fn test_failed_release_does_not_stop_the_run() {
        let (_dir, workspace) = workspace();
        records::save_created_tags(
            &workspace.tags_file(),
            &["dnd5e-v1.1.0".to_string(), "v1.1.0".to_string()],
        )
        .unwrap();
        let repo = history();
        let host = RecordingHost {
            reject: Some("dnd5e-v1.1.0".to_string()),
            ..Default::default()
        };

        let report = Publisher::new(&repo, &host, &workspace).publish().unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failed, vec!["dnd5e-v1.1.0"]);
        assert_eq!(report.published, vec!["v1.1.0"]);
    }

    #[test]
    fn test_missing_record_is_nothing_to_do() {
        let (_dir, workspace) = workspace();
        let repo = history();
        let host = RecordingHost::default();

        let report = Publisher::new(&repo, &host, &workspace).publish().unwrap();

        assert!(report.published.is_empty());
        assert!(matches!(report.warnings[0], ReleaseWarning::InputAbsent { .. }));
    }

    #[test]
    fn test_unpackageable_dataset_is_released_without_asset() {
        let (_dir, workspace) = workspace();
        records::save_created_tags(&workspace.tags_file(), &["pf2e-v1.0.0".to_string()]).unwrap();
        let repo = history();
        let host = RecordingHost::default();

        let report = Publisher::new(&repo, &host, &workspace).publish().unwrap();

        assert_eq!(report.published, vec!["pf2e-v1.0.0"]);
        assert_eq!(host.calls.borrow()[0], ("pf2e-v1.0.0".to_string(), None, None));
        assert!(matches!(report.warnings[0], ReleaseWarning::PackageSkipped { .. }));
    }

    #[test]
    fn test_gh_arguments() {
        let host = GhCliHost::new(&PublishConfig::default(), ".");
        assert_eq!(
            host.arguments("v1.1.0", Some("v1.0.0"), None),
            vec![
                "release",
                "create",
                "v1.1.0",
                "--title",
                "v1.1.0",
                "--generate-notes",
                "--notes-start-tag",
                "v1.0.0"
            ]
        );

        let quiet = GhCliHost::new(
            &PublishConfig {
                command: "gh".to_string(),
                generate_notes: false,
            },
            ".",
        );
        assert_eq!(quiet.arguments("v1.0.0", None, None).len(), 5);
    }

    #[test]
    fn test_gh_arguments_attach_existing_asset() {
        let dir = TempDir::new().unwrap();
        let asset = dir.path().join("dnd5e-data-1.1.0.tar.gz");
        fs::write(&asset, b"archive").unwrap();
        let host = GhCliHost::new(&PublishConfig::default(), dir.path());

        let args = host.arguments("dnd5e-v1.1.0", None, Some(&asset));
        assert_eq!(args.len(), 7);
        assert_eq!(args.last(), Some(&asset.display().to_string()));

        let missing = dir.path().join("pf2e-data-1.0.0.tar.gz");
        let args = host.arguments("pf2e-v1.0.0", None, Some(&missing));
        assert_eq!(args.last().map(String::as_str), Some("--generate-notes"));
    }

    #[test]
    fn test_gh_missing_command_fails() {
        let host = GhCliHost::new(
            &PublishConfig {
                command: "/nonexistent/bin/gh".to_string(),
                generate_notes: true,
            },
            ".",
        );
        let err = host.create_release("v1.0.0", None, None).unwrap_err();
        assert!(err.to_string().contains("Failed to run"));
    }
}
