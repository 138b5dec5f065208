//! Pipeline stage orchestration
//!
//! Each stage loads its inputs, runs the library component, prints a summary
//! and reports a [`StageStatus`]. `main` only parses arguments and maps the
//! status to an exit code, so stages can be driven programmatically.

use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::analyzer::{BumpPlanner, PlanOutcome};
use crate::applier::{ApplyReport, BumpApplier};
use crate::config::Workspace;
use crate::dataset::discover_datasets;
use crate::domain::tag::validate_dataset_name;
use crate::deploy::deploy;
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::packager::{resolve_version, PackagedArchive, Packager};
use crate::publisher::{PublishReport, Publisher, ReleaseHost};
use crate::records;
use crate::ui;
use crate::warning::ReleaseWarning;

/// How a stage finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    /// Inputs were absent or empty; nothing was changed
    NothingToDo,
    /// The stage ran to the end but at least one item failed
    Failed,
}

impl StageStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            StageStatus::Completed | StageStatus::NothingToDo => 0,
            StageStatus::Failed => 1,
        }
    }
}

/// Datasets selected for packaging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageTarget {
    Dataset(String),
    All,
}

/// Plan stage: analyze history, print and persist the bump plan.
pub fn run_plan<R: Repository>(repo: &R, workspace: &Workspace) -> Result<PlanOutcome> {
    let datasets = discover_datasets(&workspace.data_dir())?;
    info!(count = datasets.len(), "discovered datasets");

    let outcome = BumpPlanner::new(repo, workspace.data_namespace()).plan(&datasets)?;
    ui::display_warnings(&outcome.warnings);
    ui::display_plan(&outcome);

    let plan_file = workspace.plan_file();
    records::save_plan(&plan_file, &outcome.plan)?;
    ui::display_success(&format!("Wrote {}", plan_file.display()));

    Ok(outcome)
}

/// Apply stage: bump versions, tag, and record the created tags.
///
/// A missing plan or a plan without changes leaves the tags record untouched.
pub fn run_apply<R: Repository>(repo: &R, workspace: &Workspace) -> Result<ApplyReport> {
    let plan_file = workspace.plan_file();
    let Some(plan) = records::load_plan(&plan_file)? else {
        let report = ApplyReport {
            warnings: vec![ReleaseWarning::InputAbsent {
                what: "bump plan".to_string(),
                path: plan_file,
            }],
            ..Default::default()
        };
        ui::display_warnings(&report.warnings);
        return Ok(report);
    };

    if !plan.has_changes {
        ui::display_status("No changes to apply");
        return Ok(ApplyReport::default());
    }

    let mut report = ApplyReport::default();
    let outcome = BumpApplier::new(repo, workspace).apply_into(&plan, &mut report);

    ui::display_warnings(&report.warnings);
    for change in &report.changes {
        ui::display_version_change(change);
    }
    ui::display_tags_created(&report.tags_created);

    // Tags created before a failure are still recorded
    if outcome.is_ok() || !report.tags_created.is_empty() {
        records::save_created_tags(&workspace.tags_file(), &report.tags_created)?;
    }
    outcome?;
    Ok(report)
}

/// Package stage.
///
/// Without an explicit `version`, the version comes from the nearest
/// reachable tag, or a timestamp. Every selected dataset is attempted;
/// the stage fails if any of them could not be packaged.
pub fn run_package<R: Repository>(
    repo: Option<&R>,
    workspace: &Workspace,
    target: &PackageTarget,
    version: Option<&str>,
) -> Result<StageStatus> {
    let version = match version {
        Some(version) => version.to_string(),
        None => resolve_version(repo, Utc::now()),
    };
    ui::display_status(&format!("Version: {}", version));

    let datasets = match target {
        PackageTarget::Dataset(name) => {
            validate_dataset_name(name)?;
            vec![name.clone()]
        }
        PackageTarget::All => {
            let found = discover_datasets(&workspace.data_dir())?;
            if found.is_empty() {
                return Err(ReleaseError::NoDatasets(workspace.data_dir()));
            }
            found
        }
    };

    let packager = Packager::new(workspace);
    let mut created: Vec<PackagedArchive> = Vec::new();
    let mut failed = Vec::new();

    for dataset in &datasets {
        match packager.package(dataset, &version) {
            Ok(archive) => {
                ui::display_archive(&archive);
                created.push(archive);
            }
            // A single named dataset that does not exist is a usage error
            Err(e @ ReleaseError::DatasetNotFound { .. })
                if matches!(target, PackageTarget::Dataset(_)) =>
            {
                return Err(e);
            }
            Err(e) => {
                warn!(dataset = %dataset, error = %e, "packaging failed");
                ui::display_error(&e.to_string());
                failed.push(dataset.clone());
            }
        }
    }

    ui::display_status(&format!(
        "Created {} package(s) in {}",
        created.len(),
        workspace.dist_dir().display()
    ));

    if failed.is_empty() {
        Ok(StageStatus::Completed)
    } else {
        ui::display_error(&format!("Failed: {}", failed.join(", ")));
        Ok(StageStatus::Failed)
    }
}

/// Publish stage: create hosted releases for the recorded tags.
pub fn run_publish<R: Repository, H: ReleaseHost>(
    repo: &R,
    host: &H,
    workspace: &Workspace,
) -> Result<(PublishReport, StageStatus)> {
    let report = Publisher::new(repo, host, workspace).publish()?;
    ui::display_warnings(&report.warnings);

    for tag in &report.published {
        ui::display_success(&format!("Created release: {}", tag));
    }

    let status = if !report.is_success() {
        StageStatus::Failed
    } else if report.published.is_empty() {
        StageStatus::NothingToDo
    } else {
        StageStatus::Completed
    };
    Ok((report, status))
}

/// Deploy stage: copy raw dataset directories to `destination`.
pub fn run_deploy(
    workspace: &Workspace,
    destination: &Path,
    dataset: Option<&str>,
) -> Result<StageStatus> {
    ui::display_status(&format!("Deploying to: {}", destination.display()));

    let deployed = deploy(workspace, destination, dataset)?;
    for item in &deployed {
        ui::display_deployed(item);
    }

    ui::display_success("Deployment complete");
    Ok(StageStatus::Completed)
}
