use crate::domain::tag::validate_dataset_name;
use crate::error::{ReleaseError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Discover dataset names under the data namespace.
///
/// Every immediate sub-directory is a dataset; hidden directories are skipped.
/// Names come back sorted, which is the order used throughout a run. A missing
/// data directory yields no datasets.
///
/// # Errors
/// Returns [`ReleaseError::DatasetName`] for names that cannot be used in tags.
pub fn discover_datasets(data_dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut datasets = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name().into_string().map_err(|raw| {
            ReleaseError::dataset_name(format!("'{}' is not valid UTF-8", raw.to_string_lossy()))
        })?;
        if name.starts_with('.') {
            continue;
        }

        validate_dataset_name(&name)?;
        datasets.push(name);
    }

    datasets.sort();
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_sorted_and_skips_hidden() {
        let dir = TempDir::new().unwrap();
        for name in ["pf2e", "dnd5e", ".cache"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("README.md"), "notes").unwrap();

        assert_eq!(discover_datasets(dir.path()).unwrap(), vec!["dnd5e", "pf2e"]);
    }

    #[test]
    fn test_discover_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        assert!(discover_datasets(&dir.path().join("data")).unwrap().is_empty());
    }

    #[test]
    fn test_discover_rejects_ambiguous_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("srd-v2")).unwrap();

        let err = discover_datasets(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::DatasetName(_)));
    }
}
