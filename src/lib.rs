pub mod analyzer;
pub mod applier;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod deploy;
pub mod domain;
pub mod error;
pub mod git;
pub mod packager;
pub mod publisher;
pub mod records;
pub mod ui;
pub mod warning;

pub use error::{ReleaseError, Result};
