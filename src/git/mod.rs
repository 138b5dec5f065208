//! Git operations abstraction layer
//!
//! The release stages only talk to source control through the [Repository]
//! trait:
//!
//! - [repository::Git2Repository]: the real implementation on top of `git2`
//! - [mock::MockRepository]: an in-memory history for tests
//!
//! ```rust
//! # use dataset_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> dataset_release::Result<()> {
//! for commit in repo.commits_since(Some("dnd5e-v1.0.0"))? {
//!     println!("{} {} ({} files)", commit.short_hash(), commit.subject, commit.files.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use crate::domain::TagRef;
pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Commit information for bump analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full commit hash
    pub hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Repository-relative paths changed by the commit
    pub files: Vec<String>,
}

impl CommitInfo {
    pub fn new<S: Into<String>>(hash: impl Into<String>, subject: impl Into<String>, files: Vec<S>) -> Self {
        CommitInfo {
            hash: hash.into(),
            subject: subject.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Source control operations needed by the release pipeline
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying failures (like `git2::Error`) to
/// [crate::error::ReleaseError] variants. Callers decide which failures are
/// fatal: history queries degrade to empty results in the planner, tag
/// creation failures abort the applier.
pub trait Repository {
    /// All tags with the commit time of the commit they point to
    ///
    /// # Returns
    /// * `Ok(Vec<TagRef>)` - Tags in no particular order
    /// * `Err` - If tags cannot be listed
    fn list_tags(&self) -> Result<Vec<TagRef>>;

    /// Commits reachable from HEAD but not from `bound`, newest first
    ///
    /// With `bound == None` every commit reachable from HEAD is returned.
    ///
    /// # Arguments
    /// * `bound` - Optional tag name marking the previous release
    ///
    /// # Returns
    /// * `Ok(Vec<CommitInfo>)` - Commits in reverse chronological order
    /// * `Err` - If the bound cannot be resolved or the walk fails
    fn commits_since(&self, bound: Option<&str>) -> Result<Vec<CommitInfo>>;

    /// Nearest tag reachable from HEAD, like `git describe --tags --abbrev=0`
    ///
    /// # Returns
    /// * `Ok(Some(name))` - The nearest tag
    /// * `Ok(None)` - If no tag is reachable
    fn latest_reachable_tag(&self) -> Result<Option<String>>;

    /// Create an annotated tag at HEAD
    ///
    /// # Arguments
    /// * `name` - Name for the new tag
    /// * `message` - Annotation message
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err` - If the tag already exists or HEAD cannot be resolved
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash() {
        let commit = CommitInfo::new("0123456789abcdef", "fix: typo", vec!["a.json"]);
        assert_eq!(commit.short_hash(), "0123456");

        let commit = CommitInfo::new("abc", "fix: typo", Vec::<String>::new());
        assert_eq!(commit.short_hash(), "abc");
    }
}
