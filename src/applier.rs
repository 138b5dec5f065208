//! Applies a bump plan: rewrites version records and creates release tags.

use crate::config::Workspace;
use crate::domain::tag::{latest_repository_tag, validate_dataset_name};
use crate::domain::{BumpKind, BumpPlan, ReleaseTag, Version};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::records::{load_document, save_document};
use crate::warning::ReleaseWarning;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

const DEFAULT_VERSION: &str = "0.0.0";

/// One version moved forward by the applier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    /// Dataset name, or `None` for the repository version
    pub dataset: Option<String>,
    pub old_version: Version,
    pub new_version: Version,
    pub bump: BumpKind,
    pub tag: String,
}

impl VersionChange {
    pub fn entity(&self) -> &str {
        self.dataset.as_deref().unwrap_or("repo")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub changes: Vec<VersionChange>,
    /// Created tag names, in creation order
    pub tags_created: Vec<String>,
    pub warnings: Vec<ReleaseWarning>,
}

/// Applies bump plans to a workspace and its repository
pub struct BumpApplier<'a, R: Repository> {
    repo: &'a R,
    workspace: &'a Workspace,
}

impl<'a, R: Repository> BumpApplier<'a, R> {
    pub fn new(repo: &'a R, workspace: &'a Workspace) -> Self {
        BumpApplier { repo, workspace }
    }

    /// Apply `plan`.
    ///
    /// Datasets are processed in plan order, then the repository version.
    /// A dataset without a manifest is skipped with a warning. A malformed
    /// record or a failed tag creation aborts the run.
    pub fn apply(&self, plan: &BumpPlan) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();
        self.apply_into(plan, &mut report)?;
        Ok(report)
    }

    /// Apply `plan`, accumulating into `report`.
    ///
    /// On error `report` still holds every change and tag completed before
    /// the failure.
    pub fn apply_into(&self, plan: &BumpPlan, report: &mut ApplyReport) -> Result<()> {
        if !plan.has_changes {
            debug!("plan has no changes");
            return Ok(());
        }

        for entry in &plan.datasets {
            if entry.bump.is_none() {
                continue;
            }
            validate_dataset_name(&entry.dataset)?;
            if let Some(change) = self.bump_dataset(&entry.dataset, entry.bump, report)? {
                report.tags_created.push(change.tag.clone());
                report.changes.push(change);
            }
        }

        if !plan.repo_bump.is_none() {
            let change = self.bump_repository(plan.repo_bump, report)?;
            report.tags_created.push(change.tag.clone());
            report.changes.push(change);
        }

        Ok(())
    }

    fn bump_dataset(
        &self,
        dataset: &str,
        bump: BumpKind,
        report: &mut ApplyReport,
    ) -> Result<Option<VersionChange>> {
        let manifest_path = self.workspace.dataset_manifest(dataset);
        let Some(mut manifest) = load_document(&manifest_path)? else {
            warn!(dataset, path = %manifest_path.display(), "dataset manifest missing");
            report.warnings.push(ReleaseWarning::MissingManifest {
                dataset: dataset.to_string(),
                path: manifest_path,
            });
            return Ok(None);
        };

        let old_version = read_version(&manifest, &manifest_path)?;
        let new_version = old_version.bump(bump)?;
        set_version(&mut manifest, new_version, &manifest_path)?;

        // Tag first: a rejected tag must leave the manifest untouched
        let tag = ReleaseTag::dataset(dataset, new_version);
        self.create_tag(&tag)?;
        save_document(&manifest_path, &manifest)?;

        Ok(Some(VersionChange {
            dataset: Some(dataset.to_string()),
            old_version,
            new_version,
            bump,
            tag: tag.name(),
        }))
    }

    fn bump_repository(&self, bump: BumpKind, report: &mut ApplyReport) -> Result<VersionChange> {
        let record_path = self.workspace.version_file();
        let mut record = match load_document(&record_path)? {
            Some(record) => record,
            None => self.default_record(report),
        };

        let old_version = read_version(&record, &record_path)?;
        let new_version = old_version.bump(bump)?;
        set_version(&mut record, new_version, &record_path)?;

        let tag = ReleaseTag::repository(new_version);
        self.create_tag(&tag)?;
        save_document(&record_path, &record)?;

        Ok(VersionChange {
            dataset: None,
            old_version,
            new_version,
            bump,
            tag: tag.name(),
        })
    }

    /// Record used when the repository has no version file yet.
    ///
    /// The version comes from the newest umbrella tag, or `0.0.0`.
    fn default_record(&self, report: &mut ApplyReport) -> Value {
        let version = match self.repo.list_tags() {
            Ok(tags) => latest_repository_tag(&tags)
                .map(|tag| tag.name.trim_start_matches('v').to_string())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            Err(e) => {
                warn!(error = %e, "listing tags failed");
                report.warnings.push(ReleaseWarning::HistoryUnavailable {
                    query: "list tags".to_string(),
                    reason: e.to_string(),
                });
                DEFAULT_VERSION.to_string()
            }
        };

        let repository = &self.workspace.config.repository;
        let mut record = Map::new();
        record.insert("version".to_string(), Value::from(version));
        record.insert("name".to_string(), Value::from(repository.name.clone()));
        record.insert(
            "description".to_string(),
            Value::from(repository.description.clone()),
        );
        Value::Object(record)
    }

    fn create_tag(&self, tag: &ReleaseTag) -> Result<()> {
        let name = tag.name();
        self.repo
            .create_annotated_tag(&name, &tag.release_message())?;
        info!(tag = %name, "created tag");
        Ok(())
    }
}

fn read_version(document: &Value, path: &Path) -> Result<Version> {
    let object = document.as_object().ok_or_else(|| {
        ReleaseError::version(format!("{} is not a JSON object", path.display()))
    })?;

    match object.get("version") {
        None => Version::parse(DEFAULT_VERSION),
        Some(Value::String(raw)) => Version::parse(raw),
        Some(other) => Err(ReleaseError::version(format!(
            "{}: version field must be a string, found {}",
            path.display(),
            other
        ))),
    }
}

fn set_version(document: &mut Value, version: Version, path: &Path) -> Result<()> {
    let object = document.as_object_mut().ok_or_else(|| {
        ReleaseError::version(format!("{} is not a JSON object", path.display()))
    })?;
    object.insert("version".to_string(), Value::from(version.to_string()));
    Ok(())
}
