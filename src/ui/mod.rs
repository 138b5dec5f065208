//! User interface module.
//!
//! Stage summaries for people reading a terminal or a CI log. Diagnostics go
//! through `tracing` instead.

pub mod formatter;

pub use formatter::{
    display_archive, display_deployed, display_error, display_plan, display_status,
    display_success, display_tags_created, display_version_change, display_warning,
    display_warnings,
};
