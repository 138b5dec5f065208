use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, Repository, TagRef};
use std::cell::{Cell, RefCell};

/// Mock repository for testing without actual git operations
///
/// History is linear; commit `i` has timestamp `i`. Tags point at commit
/// indexes.
#[derive(Default)]
pub struct MockRepository {
    commits: Vec<CommitInfo>,
    tags: RefCell<Vec<(String, usize, String)>>,
    history_unavailable: Cell<bool>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit on top of HEAD and return its hash
    pub fn add_commit(&mut self, subject: &str, files: &[&str]) -> String {
        let hash = format!("{:040x}", self.commits.len() + 1);
        self.commits.push(CommitInfo::new(
            hash.clone(),
            subject,
            files.to_vec(),
        ));
        hash
    }

    /// Add a tag pointing at the current HEAD
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let head = self.head_index();
        self.tags.get_mut().push((name.into(), head, String::new()));
    }

    /// Make every history query fail, as when git is unavailable
    pub fn set_history_unavailable(&self, unavailable: bool) {
        self.history_unavailable.set(unavailable);
    }

    /// Tag names with their annotation messages, in creation order
    pub fn tags(&self) -> Vec<(String, String)> {
        self.tags
            .borrow()
            .iter()
            .map(|(name, _, message)| (name.clone(), message.clone()))
            .collect()
    }

    fn head_index(&self) -> usize {
        self.commits.len().saturating_sub(1)
    }

    fn check_history(&self) -> Result<()> {
        if self.history_unavailable.get() {
            return Err(ReleaseError::Git(git2::Error::from_str(
                "history is unavailable",
            )));
        }
        Ok(())
    }
}

impl Repository for MockRepository {
    fn list_tags(&self) -> Result<Vec<TagRef>> {
        self.check_history()?;
        Ok(self
            .tags
            .borrow()
            .iter()
            .map(|(name, index, _)| TagRef::new(name.clone(), *index as i64))
            .collect())
    }

    fn commits_since(&self, bound: Option<&str>) -> Result<Vec<CommitInfo>> {
        self.check_history()?;

        let start = match bound {
            Some(tag_name) => {
                let tags = self.tags.borrow();
                let (_, index, _) = tags
                    .iter()
                    .find(|(name, _, _)| name == tag_name)
                    .ok_or_else(|| ReleaseError::tag(format!("Tag not found: {}", tag_name)))?;
                index + 1
            }
            None => 0,
        };

        Ok(self.commits.iter().skip(start).rev().cloned().collect())
    }

    fn latest_reachable_tag(&self) -> Result<Option<String>> {
        self.check_history()?;
        Ok(self
            .tags
            .borrow()
            .iter()
            .enumerate()
            .max_by_key(|(order, (_, index, _))| (*index, *order))
            .map(|(_, (name, _, _))| name.clone()))
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let mut tags = self.tags.borrow_mut();
        if tags.iter().any(|(existing, _, _)| existing == name) {
            return Err(ReleaseError::tag(format!(
                "Cannot create tag '{}': tag already exists",
                name
            )));
        }
        tags.push((name.to_string(), self.head_index(), message.to_string()));
        Ok(())
    }
}
