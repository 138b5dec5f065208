use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, TagRef};
use git2::{
    DescribeFormatOptions, DescribeOptions, ErrorCode, Oid, Repository as Git2Repo, Signature,
    Sort,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working tree, if the repository is not bare
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    fn resolve_tag_commit(&self, tag_name: &str) -> Result<Oid> {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", tag_name))
            .map_err(|e| ReleaseError::tag(format!("Cannot find tag '{}': {}", tag_name, e)))?;

        let commit = reference
            .peel_to_commit()
            .map_err(|e| ReleaseError::tag(format!("Cannot peel tag '{}': {}", tag_name, e)))?;

        Ok(commit.id())
    }

    /// Paths touched by a commit.
    ///
    /// Root commits report their whole tree. Merge commits report nothing,
    /// since their changes arrive through the merged commits themselves.
    fn changed_files(&self, commit: &git2::Commit<'_>) -> Result<Vec<String>> {
        if commit.parent_count() > 1 {
            return Ok(Vec::new());
        }

        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            if let Some(path) = path {
                files.push(path.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(files)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(e) => {
                debug!(error = %e, "no git identity configured, using release bot signature");
                Ok(Signature::now("dataset-release", "dataset-release@localhost")?)
            }
        }
    }
}

impl super::Repository for Git2Repository {
    fn list_tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = match self.repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(reference) => reference,
                Err(_) => continue,
            };
            // Tags on trees or blobs have no place in release history.
            if let Ok(commit) = reference.peel_to_commit() {
                tags.push(TagRef::new(name, commit.time().seconds()));
            }
        }

        Ok(tags)
    }

    fn commits_since(&self, bound: Option<&str>) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;

        if let Some(tag_name) = bound {
            revwalk.hide(self.resolve_tag_commit(tag_name)?)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            let subject = commit
                .summary()
                .map(str::to_string)
                .unwrap_or_else(|| String::from_utf8_lossy(commit.message_bytes()).into_owned());
            let files = self.changed_files(&commit)?;

            commits.push(CommitInfo {
                hash: oid.to_string(),
                subject,
                files,
            });
        }

        Ok(commits)
    }

    fn latest_reachable_tag(&self) -> Result<Option<String>> {
        let mut options = DescribeOptions::new();
        options.describe_tags();

        let describe = match self.repo.describe(&options) {
            Ok(describe) => describe,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);
        Ok(Some(describe.format(Some(&format))?))
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| ReleaseError::tag(format!("Cannot resolve HEAD: {}", e)))?;

        let signature = self.signature()?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }
}
