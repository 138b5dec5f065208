//! Command-line stage runners.

pub mod orchestration;

pub use orchestration::{
    run_apply, run_deploy, run_package, run_plan, run_publish, PackageTarget, StageStatus,
};
