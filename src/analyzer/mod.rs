//! Commit history analysis

pub mod bump_planner;

pub use bump_planner::{BumpPlanner, DatasetAnalysis, PlanOutcome};
