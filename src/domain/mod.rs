//! Domain logic - pure release rules independent of git and the filesystem

pub mod attribution;
pub mod commit;
pub mod plan;
pub mod tag;
pub mod version;

pub use attribution::{affected_datasets, touches_repo_level};
pub use commit::classify;
pub use plan::{BumpPlan, DatasetBump};
pub use tag::{ReleaseTag, TagRef};
pub use version::{max_bump, BumpKind, Version};
