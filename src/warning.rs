use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions met while running a release stage.
/// These are reported to the user but never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseWarning {
    /// Dataset directory without a manifest; it is treated as unreleased
    MissingManifest { dataset: String, path: PathBuf },
    /// A history query failed and was treated as returning nothing
    HistoryUnavailable { query: String, reason: String },
    /// Stage input is absent, so there is nothing to do
    InputAbsent { what: String, path: PathBuf },
    /// Packaging a dataset for its release failed; the release goes out without an asset
    PackageSkipped { dataset: String, reason: String },
    /// Publishing a release for a tag failed
    ReleaseFailed { tag: String, reason: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::MissingManifest { dataset, path } => {
                write!(
                    f,
                    "No manifest for dataset '{}' at {}, skipping",
                    dataset,
                    path.display()
                )
            }
            ReleaseWarning::HistoryUnavailable { query, reason } => {
                write!(
                    f,
                    "Could not read history ({}): {}; treating as empty",
                    query, reason
                )
            }
            ReleaseWarning::InputAbsent { what, path } => {
                write!(f, "No {} found at {}", what, path.display())
            }
            ReleaseWarning::PackageSkipped { dataset, reason } => {
                write!(f, "Could not package '{}', releasing without asset: {}", dataset, reason)
            }
            ReleaseWarning::ReleaseFailed { tag, reason } => {
                write!(f, "Failed to create release {}: {}", tag, reason)
            }
        }
    }
}
