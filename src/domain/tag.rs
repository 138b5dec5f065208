use crate::domain::version::Version;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fmt;

/// A tag name together with the commit time of the commit it points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl TagRef {
    pub fn new(name: impl Into<String>, timestamp: i64) -> Self {
        TagRef {
            name: name.into(),
            timestamp,
        }
    }
}

/// Release tag for either a single dataset or the whole repository
///
/// Dataset tags are named `{dataset}-v{version}`, repository tags `v{version}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseTag {
    Dataset { dataset: String, version: Version },
    Repository { version: Version },
}

impl ReleaseTag {
    pub fn dataset(dataset: impl Into<String>, version: Version) -> Self {
        ReleaseTag::Dataset {
            dataset: dataset.into(),
            version,
        }
    }

    pub fn repository(version: Version) -> Self {
        ReleaseTag::Repository { version }
    }

    /// Parse a tag name back into a release tag.
    ///
    /// Repository tags carry no hyphen at all; anything else is split on the
    /// last `-v`. Returns `None` for tags outside the release naming scheme.
    pub fn parse(name: &str) -> Option<Self> {
        if is_repository_tag(name) {
            let version = Version::parse(&name[1..]).ok()?;
            return Some(ReleaseTag::Repository { version });
        }

        let split = name.rfind("-v")?;
        let dataset = &name[..split];
        if dataset.is_empty() {
            return None;
        }
        let version = Version::parse(&name[split + 2..]).ok()?;

        Some(ReleaseTag::Dataset {
            dataset: dataset.to_string(),
            version,
        })
    }

    pub fn version(&self) -> Version {
        match self {
            ReleaseTag::Dataset { version, .. } | ReleaseTag::Repository { version } => *version,
        }
    }

    /// Dataset name for dataset tags
    pub fn dataset_name(&self) -> Option<&str> {
        match self {
            ReleaseTag::Dataset { dataset, .. } => Some(dataset),
            ReleaseTag::Repository { .. } => None,
        }
    }

    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Annotation message stored on the tag object
    pub fn release_message(&self) -> String {
        match self {
            ReleaseTag::Dataset { dataset, version } => {
                format!("Release {} v{}", dataset, version)
            }
            ReleaseTag::Repository { version } => format!("Release v{}", version),
        }
    }

    fn same_series(&self, other: &ReleaseTag) -> bool {
        match (self, other) {
            (ReleaseTag::Repository { .. }, ReleaseTag::Repository { .. }) => true,
            (ReleaseTag::Dataset { dataset: a, .. }, ReleaseTag::Dataset { dataset: b, .. }) => {
                a == b
            }
            _ => false,
        }
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseTag::Dataset { dataset, version } => write!(f, "{}-v{}", dataset, version),
            ReleaseTag::Repository { version } => write!(f, "v{}", version),
        }
    }
}

/// Repository tags start with `v` and contain no hyphen.
pub fn is_repository_tag(name: &str) -> bool {
    name.starts_with('v') && !name.contains('-')
}

/// Reject dataset names that would make tag names ambiguous.
///
/// A name must be a single path component (not `.` or `..`) and must not
/// contain the tag delimiter `-v` followed by a digit.
pub fn validate_dataset_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ReleaseError::dataset_name("dataset name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(ReleaseError::dataset_name(format!(
            "'{}' contains a path separator",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(ReleaseError::dataset_name(format!(
            "'{}' is not a directory name",
            name
        )));
    }
    let ambiguous = Regex::new(r"-v\d")
        .map(|re| re.is_match(name))
        .unwrap_or(false);
    if ambiguous {
        return Err(ReleaseError::dataset_name(format!(
            "'{}' contains the tag delimiter '-v<digit>'",
            name
        )));
    }
    Ok(())
}

fn newest_in_series<'a, F>(tags: &'a [TagRef], mut belongs: F) -> Option<(&'a TagRef, ReleaseTag)>
where
    F: FnMut(&ReleaseTag) -> bool,
{
    tags.iter()
        .filter_map(|tag| {
            let parsed = ReleaseTag::parse(&tag.name)?;
            belongs(&parsed).then_some((tag, parsed))
        })
        .max_by(|(a_ref, a), (b_ref, b)| {
            a.version()
                .cmp(&b.version())
                .then(a_ref.timestamp.cmp(&b_ref.timestamp))
        })
}

/// Most recent `{dataset}-v*` tag: highest version, newest commit on ties.
pub fn latest_dataset_tag<'a>(tags: &'a [TagRef], dataset: &str) -> Option<&'a TagRef> {
    newest_in_series(tags, |tag| tag.dataset_name() == Some(dataset)).map(|(tag, _)| tag)
}

/// Most recent umbrella `v*` tag, ignoring every dataset tag.
pub fn latest_repository_tag(tags: &[TagRef]) -> Option<&TagRef> {
    newest_in_series(tags, |tag| matches!(tag, ReleaseTag::Repository { .. })).map(|(tag, _)| tag)
}

/// Tag preceding `current` in the same series, if any.
pub fn previous_tag<'a>(tags: &'a [TagRef], current: &ReleaseTag) -> Option<&'a TagRef> {
    let version = current.version();
    newest_in_series(tags, |tag| tag.same_series(current) && tag.version() < version)
        .map(|(tag, _)| tag)
}
