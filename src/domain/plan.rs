use crate::domain::version::BumpKind;
use serde::{Deserialize, Serialize};

/// Bump decision for a single dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetBump {
    pub dataset: String,
    pub bump: BumpKind,
}

impl DatasetBump {
    pub fn new(dataset: impl Into<String>, bump: BumpKind) -> Self {
        DatasetBump {
            dataset: dataset.into(),
            bump,
        }
    }
}

/// Decision record handed from the planner to the applier.
///
/// `has_changes` is always `!datasets.is_empty() || repo_bump != none` when
/// the plan is built through [`BumpPlan::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpPlan {
    pub has_changes: bool,
    #[serde(default)]
    pub datasets: Vec<DatasetBump>,
    #[serde(default)]
    pub repo_bump: BumpKind,
}

impl BumpPlan {
    /// Build a plan, dropping datasets whose decision is `none`.
    ///
    /// Dataset order is kept as given.
    pub fn new(datasets: impl IntoIterator<Item = DatasetBump>, repo_bump: BumpKind) -> Self {
        let datasets: Vec<DatasetBump> = datasets
            .into_iter()
            .filter(|entry| !entry.bump.is_none())
            .collect();
        let has_changes = !datasets.is_empty() || !repo_bump.is_none();

        BumpPlan {
            has_changes,
            datasets,
            repo_bump,
        }
    }

    /// Plan with nothing to release
    pub fn empty() -> Self {
        BumpPlan::new(Vec::new(), BumpKind::None)
    }
}
