//! Release archives for datasets.
//!
//! Creates deterministic `{dataset}-data-{version}.tar.gz` archives containing
//! every data file of a dataset plus a generated `manifest.json` that records
//! the SHA-256 checksum and size of each file.
//!
//! # Determinism
//!
//! - Entries sorted by relative path, `manifest.json` last
//! - mtime set to the Unix epoch, mode 0o644, uid/gid 0
//! - Checksums depend on file bytes only
//!
//! Only `created_at` in the manifest changes between two runs over the same
//! files.

use crate::config::Workspace;
use crate::domain::tag::validate_dataset_name;
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use chrono::{DateTime, Utc};
use flate2::{write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Name of the generated manifest inside every archive
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Default file permissions for archive entries (rw-r--r--).
const FILE_MODE: u32 = 0o644;

/// Unix epoch timestamp for deterministic archives.
const MTIME: u64 = 0;

/// Integrity record for one packaged file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Lowercase hex SHA-256 of the file bytes
    pub checksum: String,
    pub size: u64,
}

/// Manifest written into every release archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    pub ruleset: String,
    pub version: String,
    pub created_at: DateTime<Utc>,
    /// Keyed by path relative to the dataset directory
    pub files: BTreeMap<String, FileEntry>,
}

/// A file read from a dataset, ready to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    /// Archive path (POSIX style, relative to the dataset directory)
    pub path: String,
    pub contents: Vec<u8>,
}

impl DataFile {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        DataFile {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn entry(&self) -> FileEntry {
        FileEntry {
            checksum: checksum(&self.contents),
            size: self.contents.len() as u64,
        }
    }
}

/// Result of packaging one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct PackagedArchive {
    pub dataset: String,
    pub path: PathBuf,
    pub manifest: ReleaseManifest,
    /// Archive size in bytes
    pub size: u64,
}

/// SHA-256 of `bytes` as lowercase hex
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Build the manifest for `files`.
pub fn build_manifest(
    dataset: &str,
    version: &str,
    files: &[DataFile],
    created_at: DateTime<Utc>,
) -> ReleaseManifest {
    ReleaseManifest {
        ruleset: dataset.to_string(),
        version: version.to_string(),
        created_at,
        files: files
            .iter()
            .map(|file| (file.path.clone(), file.entry()))
            .collect(),
    }
}

/// Version used when none is given explicitly.
///
/// The nearest reachable tag without its leading `v`, or a UTC timestamp
/// `YYYYMMDD.HHMMSS` when no tag is reachable or history cannot be read.
pub fn resolve_version<R: Repository>(repo: Option<&R>, now: DateTime<Utc>) -> String {
    let tag = repo.and_then(|repo| match repo.latest_reachable_tag() {
        Ok(tag) => tag,
        Err(e) => {
            warn!(error = %e, "cannot describe HEAD, using timestamp version");
            None
        }
    });

    match tag {
        Some(tag) => tag.trim_start_matches('v').to_string(),
        None => now.format("%Y%m%d.%H%M%S").to_string(),
    }
}

/// Packages datasets of a workspace into the dist directory
pub struct Packager<'a> {
    workspace: &'a Workspace,
}

impl<'a> Packager<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Packager { workspace }
    }

    /// Read every data file of `dataset`, sorted by relative path.
    ///
    /// Data files are files with the configured extension anywhere below the
    /// dataset directory, except the dataset's own root manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::DatasetName`] for a name that is not a single
    /// directory, [`ReleaseError::DatasetNotFound`] if the directory is missing
    /// and [`ReleaseError::NoFilesFound`] if it holds no data files.
    pub fn data_files(&self, dataset: &str) -> Result<Vec<DataFile>> {
        validate_dataset_name(dataset)?;
        let dataset_dir = self.workspace.dataset_dir(dataset);
        if !dataset_dir.is_dir() {
            return Err(ReleaseError::DatasetNotFound {
                dataset: dataset.to_string(),
                path: dataset_dir,
            });
        }

        let extension = self.workspace.config.packaging.extension.as_str();
        let own_manifest = self.workspace.config.paths.dataset_manifest.as_str();

        let mut files = Vec::new();
        for entry in WalkDir::new(&dataset_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| ReleaseError::package(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some(extension) {
                continue;
            }

            let relative = relative_path(&dataset_dir, entry.path())?;
            if relative == own_manifest {
                continue;
            }

            let contents = fs::read(entry.path())?;
            files.push(DataFile::new(relative, contents));
        }

        if files.is_empty() {
            return Err(ReleaseError::NoFilesFound {
                dataset: dataset.to_string(),
                path: dataset_dir,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Package `dataset` as `version`, stamped with the current time
    pub fn package(&self, dataset: &str, version: &str) -> Result<PackagedArchive> {
        self.package_at(dataset, version, Utc::now())
    }

    /// Package `dataset` as `version` with an explicit creation time
    pub fn package_at(
        &self,
        dataset: &str,
        version: &str,
        created_at: DateTime<Utc>,
    ) -> Result<PackagedArchive> {
        let files = self.data_files(dataset)?;
        let manifest = build_manifest(dataset, version, &files, created_at);

        let dist_dir = self.workspace.dist_dir();
        fs::create_dir_all(&dist_dir)?;
        let path = dist_dir.join(archive_name(dataset, version));

        let output = File::create(&path).map_err(|e| {
            ReleaseError::package(format!("cannot create {}: {}", path.display(), e))
        })?;
        write_archive(output, &files, &manifest)?;

        let size = fs::metadata(&path)?.len();
        debug!(dataset, path = %path.display(), files = files.len(), size, "wrote archive");

        Ok(PackagedArchive {
            dataset: dataset.to_string(),
            path,
            manifest,
            size,
        })
    }
}

/// File name of the archive for `dataset` at `version`
pub fn archive_name(dataset: &str, version: &str) -> String {
    format!("{}-data-{}.tar.gz", dataset, version)
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| ReleaseError::package(format!("{}: {}", path.display(), e)))?;

    let parts: Vec<String> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Write a gzipped tar with `files` in order, then the manifest.
pub fn write_archive<W: Write>(writer: W, files: &[DataFile], manifest: &ReleaseManifest) -> Result<()> {
    let gz = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(gz);

    for file in files {
        append_entry(&mut tar, &file.path, &file.contents)?;
    }

    let manifest_bytes = serde_json::to_vec_pretty(manifest)?;
    append_entry(&mut tar, MANIFEST_ENTRY, &manifest_bytes)?;

    let gz = tar.into_inner()?;
    gz.finish()?;
    Ok(())
}

fn append_entry<W: Write>(tar: &mut tar::Builder<W>, path: &str, contents: &[u8]) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(contents.len() as u64);
    header.set_mode(FILE_MODE);
    header.set_mtime(MTIME);
    header.set_uid(0);
    header.set_gid(0);
    header.set_cksum();

    tar.append_data(&mut header, path, contents)
}
