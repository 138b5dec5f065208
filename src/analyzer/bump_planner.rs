use crate::domain::tag::{latest_dataset_tag, latest_repository_tag};
use crate::domain::{
    affected_datasets, classify, max_bump, touches_repo_level, BumpKind, BumpPlan, DatasetBump,
    TagRef,
};
use crate::error::Result;
use crate::git::{CommitInfo, Repository};
use crate::warning::ReleaseWarning;
use tracing::{debug, warn};

/// What the planner found for one dataset or for the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetAnalysis {
    /// Dataset name, or `None` for the repository level
    pub dataset: Option<String>,
    /// Tag the history was bounded by
    pub last_tag: Option<String>,
    /// Number of commits since `last_tag` that count towards the decision
    pub relevant_commits: usize,
    pub bump: BumpKind,
}

/// Result of a planning run
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub plan: BumpPlan,
    /// Per-dataset analyses in discovery order, followed by the repository
    pub analyses: Vec<DatasetAnalysis>,
    pub warnings: Vec<ReleaseWarning>,
}

/// Computes version bumps from the commit history since each last release
pub struct BumpPlanner<'a, R: Repository> {
    repo: &'a R,
    data_namespace: String,
}

impl<'a, R: Repository> BumpPlanner<'a, R> {
    /// Create a planner for a repository whose datasets live under `data_namespace`
    pub fn new(repo: &'a R, data_namespace: impl Into<String>) -> Self {
        BumpPlanner {
            repo,
            data_namespace: data_namespace.into(),
        }
    }

    /// Build the bump plan for `datasets`, given in discovery order.
    ///
    /// Failed history queries are reported as warnings and treated as empty,
    /// so a broken tag lookup degrades to a first-release decision.
    pub fn plan(&self, datasets: &[String]) -> Result<PlanOutcome> {
        let mut warnings = Vec::new();
        let tags = self.tags(&mut warnings);

        let mut analyses = Vec::with_capacity(datasets.len() + 1);
        for dataset in datasets {
            analyses.push(self.analyze_dataset(dataset, &tags, &mut warnings));
        }

        let repo_analysis = self.analyze_repository(&tags, &analyses, &mut warnings);

        let plan = BumpPlan::new(
            analyses.iter().filter_map(|analysis| {
                let dataset = analysis.dataset.as_ref()?;
                Some(DatasetBump::new(dataset.clone(), analysis.bump))
            }),
            repo_analysis.bump,
        );
        analyses.push(repo_analysis);

        Ok(PlanOutcome {
            plan,
            analyses,
            warnings,
        })
    }

    fn analyze_dataset(
        &self,
        dataset: &str,
        tags: &[TagRef],
        warnings: &mut Vec<ReleaseWarning>,
    ) -> DatasetAnalysis {
        let last_tag = latest_dataset_tag(tags, dataset).map(|tag| tag.name.clone());
        let commits = self.history(last_tag.as_deref(), warnings);

        let bumps: Vec<BumpKind> = commits
            .iter()
            .filter(|commit| affected_datasets(&commit.files, &self.data_namespace).contains(dataset))
            .map(|commit| classify(&commit.subject))
            .collect();

        let bump = max_bump(bumps.iter().copied());
        debug!(
            dataset,
            last_tag = last_tag.as_deref().unwrap_or("<none>"),
            commits = bumps.len(),
            bump = %bump,
            "analyzed dataset"
        );

        DatasetAnalysis {
            dataset: Some(dataset.to_string()),
            last_tag,
            relevant_commits: bumps.len(),
            bump,
        }
    }

    /// The repository bump is the strongest of its own repo-level commits and
    /// every dataset decision.
    fn analyze_repository(
        &self,
        tags: &[TagRef],
        datasets: &[DatasetAnalysis],
        warnings: &mut Vec<ReleaseWarning>,
    ) -> DatasetAnalysis {
        let last_tag = latest_repository_tag(tags).map(|tag| tag.name.clone());
        let commits = self.history(last_tag.as_deref(), warnings);

        let repo_level: Vec<BumpKind> = commits
            .iter()
            .filter(|commit| touches_repo_level(&commit.files, &self.data_namespace))
            .map(|commit| classify(&commit.subject))
            .collect();

        let bump = max_bump(
            repo_level
                .iter()
                .copied()
                .chain(datasets.iter().map(|analysis| analysis.bump)),
        );
        debug!(
            last_tag = last_tag.as_deref().unwrap_or("<none>"),
            commits = repo_level.len(),
            bump = %bump,
            "analyzed repository"
        );

        DatasetAnalysis {
            dataset: None,
            last_tag,
            relevant_commits: repo_level.len(),
            bump,
        }
    }

    fn tags(&self, warnings: &mut Vec<ReleaseWarning>) -> Vec<TagRef> {
        match self.repo.list_tags() {
            Ok(tags) => tags,
            Err(e) => {
                warn!(error = %e, "listing tags failed");
                warnings.push(ReleaseWarning::HistoryUnavailable {
                    query: "list tags".to_string(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    fn history(&self, bound: Option<&str>, warnings: &mut Vec<ReleaseWarning>) -> Vec<CommitInfo> {
        match self.repo.commits_since(bound) {
            Ok(commits) => commits,
            Err(e) => {
                let query = match bound {
                    Some(tag) => format!("commits since {}", tag),
                    None => "all commits".to_string(),
                };
                warn!(error = %e, query = %query, "history query failed");
                warnings.push(ReleaseWarning::HistoryUnavailable {
                    query,
                    reason: e.to_string(),
                });
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plan_minor_bump_since_dataset_tag() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: initial data", &["data/dnd5e/races.json"]);
        repo.add_tag("dnd5e-v1.0.0");
        repo.add_commit("feat: add new spell", &["data/dnd5e/spells/evocation.json"]);
        repo.add_commit("fix: typo", &["data/dnd5e/races.json"]);

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["dnd5e"]))
            .unwrap();

        assert_eq!(
            outcome.plan.datasets,
            vec![DatasetBump::new("dnd5e", BumpKind::Minor)]
        );
        assert!(outcome.plan.has_changes);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_repo_bump_takes_strongest_dataset_bump() {
        let mut repo = MockRepository::new();
        repo.add_commit("chore: init", &["version.json"]);
        repo.add_tag("v1.0.0");
        repo.add_tag("dnd5e-v1.0.0");
        repo.add_commit("breaking: rename spell ids", &["data/dnd5e/spells/a.json"]);
        repo.add_commit("fix: schema typo", &["schemas/json/spell.schema.json"]);

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["dnd5e"]))
            .unwrap();

        assert_eq!(outcome.plan.repo_bump, BumpKind::Major);
        assert_eq!(outcome.analyses.last().unwrap().relevant_commits, 1);
    }

    #[test]
    fn test_untouched_dataset_is_omitted() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: races", &["data/dnd5e/races.json"]);

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["dnd5e", "pf2e"]))
            .unwrap();

        let planned: Vec<_> = outcome.plan.datasets.iter().map(|d| d.dataset.as_str()).collect();
        assert_eq!(planned, vec!["dnd5e"]);
        assert_eq!(outcome.plan.repo_bump, BumpKind::Minor);
    }

    #[test]
    fn test_repo_level_only_change() {
        let mut repo = MockRepository::new();
        repo.add_commit("chore: init", &["data/dnd5e/races.json"]);
        repo.add_tag("dnd5e-v1.0.0");
        repo.add_tag("v1.0.0");
        repo.add_commit("docs: contributing guide", &["CONTRIBUTING.md"]);

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["dnd5e"]))
            .unwrap();

        assert!(outcome.plan.datasets.is_empty());
        assert_eq!(outcome.plan.repo_bump, BumpKind::Patch);
        assert!(outcome.plan.has_changes);
    }

    #[test]
    fn test_no_changes_since_tags() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: races", &["data/dnd5e/races.json"]);
        repo.add_tag("dnd5e-v1.0.0");
        repo.add_tag("v1.0.0");

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["dnd5e"]))
            .unwrap();

        assert_eq!(outcome.plan, BumpPlan::empty());
    }

    #[test]
    fn test_ambiguous_commit_does_not_lower_a_breaking_change() {
        let mut repo = MockRepository::new();
        repo.add_commit("updated some stuff", &["data/dnd5e/races.json"]);
        repo.add_commit("breaking: drop legacy fields", &["data/dnd5e/races.json"]);

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["dnd5e"]))
            .unwrap();

        assert_eq!(outcome.plan.datasets[0].bump, BumpKind::Major);
    }

    #[test]
    fn test_plan_order_follows_discovery_order() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: b", &["data/b/x.json"]);
        repo.add_commit("breaking: a", &["data/a/x.json"]);

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["a", "b"]))
            .unwrap();

        let planned: Vec<_> = outcome.plan.datasets.iter().map(|d| d.dataset.as_str()).collect();
        assert_eq!(planned, vec!["a", "b"]);
    }

    #[test]
    fn test_history_failure_degrades_to_empty() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: races", &["data/dnd5e/races.json"]);
        repo.set_history_unavailable(true);

        let outcome = BumpPlanner::new(&repo, "data")
            .plan(&names(&["dnd5e"]))
            .unwrap();

        assert_eq!(outcome.plan, BumpPlan::empty());
        assert!(!outcome.warnings.is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: a", &["data/a/x.json", "data/b/y.json"]);
        repo.add_commit("fix: b", &["data/b/y.json", "README.md"]);

        let datasets = names(&["a", "b"]);
        let first = BumpPlanner::new(&repo, "data").plan(&datasets).unwrap();
        let second = BumpPlanner::new(&repo, "data").plan(&datasets).unwrap();

        assert_eq!(
            serde_json::to_string(&first.plan).unwrap(),
            serde_json::to_string(&second.plan).unwrap()
        );
    }
}
