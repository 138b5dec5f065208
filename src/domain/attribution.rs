//! Attribution of changed paths to datasets and to the repository level.
//!
//! Paths are repository-relative and `/`-separated, as reported by git.

use std::collections::BTreeSet;

fn namespace_prefix(data_root: &str) -> String {
    format!("{}/", data_root.trim_end_matches('/'))
}

/// Datasets touched by `files`.
///
/// A path belongs to dataset `D` when it starts with `{data_root}/D`, where
/// `D` is the next path segment after the data namespace.
pub fn affected_datasets<I, S>(files: I, data_root: &str) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = namespace_prefix(data_root);

    files
        .into_iter()
        .filter_map(|file| {
            let rest = file.as_ref().strip_prefix(prefix.as_str())?;
            let segment = rest.split('/').next()?;
            (!segment.is_empty()).then(|| segment.to_string())
        })
        .collect()
}

/// Whether any of `files` lives outside the data namespace.
pub fn touches_repo_level<I, S>(files: I, data_root: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = namespace_prefix(data_root);
    files
        .into_iter()
        .any(|file| !file.as_ref().starts_with(prefix.as_str()))
}
