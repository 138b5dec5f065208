//! Copies raw dataset directories to a local destination.

use crate::config::Workspace;
use crate::dataset::discover_datasets;
use crate::domain::tag::validate_dataset_name;
use crate::error::{ReleaseError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One dataset copied to the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedDataset {
    pub dataset: String,
    pub source: PathBuf,
    pub target: PathBuf,
    /// Number of data files under `target`
    pub files: usize,
    /// Whether an existing target was removed first
    pub replaced: bool,
}

/// Copy `dataset`, or every discovered dataset, into `destination`.
///
/// An existing target directory is removed before copying.
///
/// # Errors
///
/// Returns [`ReleaseError::DatasetName`] for a name that is not a single
/// directory, [`ReleaseError::DatasetNotFound`] for an unknown dataset and
/// [`ReleaseError::NoDatasets`] when there is nothing to deploy.
pub fn deploy(
    workspace: &Workspace,
    destination: &Path,
    dataset: Option<&str>,
) -> Result<Vec<DeployedDataset>> {
    let datasets = match dataset {
        Some(name) => {
            validate_dataset_name(name)?;
            let source = workspace.dataset_dir(name);
            if !source.is_dir() {
                return Err(ReleaseError::DatasetNotFound {
                    dataset: name.to_string(),
                    path: source,
                });
            }
            vec![name.to_string()]
        }
        None => {
            let found = discover_datasets(&workspace.data_dir())?;
            if found.is_empty() {
                return Err(ReleaseError::NoDatasets(workspace.data_dir()));
            }
            found
        }
    };

    fs::create_dir_all(destination)?;

    let extension = workspace.config.packaging.extension.as_str();
    datasets
        .into_iter()
        .map(|dataset| {
            let source = workspace.dataset_dir(&dataset);
            let target = destination.join(&dataset);

            let replaced = target.exists();
            if replaced {
                debug!(target = %target.display(), "removing existing deployment");
                fs::remove_dir_all(&target)?;
            }

            copy_tree(&source, &target)?;
            let files = count_files(&target, extension)?;

            Ok(DeployedDataset {
                dataset,
                source,
                target,
                files,
                replaced,
            })
        })
        .collect()
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| ReleaseError::deploy(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ReleaseError::deploy(e.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

fn count_files(dir: &Path, extension: &str) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| ReleaseError::deploy(e.to_string()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|ext| ext.to_str()) == Some(extension)
        {
            count += 1;
        }
    }
    Ok(count)
}
