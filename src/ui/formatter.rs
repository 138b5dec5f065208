//! Pure formatting functions for UI output.
//!
//! `format_*` functions build plain lines and are tested directly;
//! `display_*` functions add styling and print them.

use console::style;

use crate::analyzer::{DatasetAnalysis, PlanOutcome};
use crate::applier::VersionChange;
use crate::deploy::DeployedDataset;
use crate::packager::PackagedArchive;
use crate::warning::ReleaseWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").for_stderr().red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning.
pub fn display_warning(warning: &ReleaseWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").for_stderr().yellow(), warning);
}

pub fn display_warnings(warnings: &[ReleaseWarning]) {
    for warning in warnings {
        display_warning(warning);
    }
}

/// One line of the plan summary, e.g. `dnd5e: minor (2 commits, since dnd5e-v1.0.0)`
pub fn format_analysis(analysis: &DatasetAnalysis) -> String {
    let entity = analysis.dataset.as_deref().unwrap_or("repo");
    let since = analysis
        .last_tag
        .as_deref()
        .map(|tag| format!("since {}", tag))
        .unwrap_or_else(|| "no previous release".to_string());
    let noun = if analysis.relevant_commits == 1 {
        "commit"
    } else {
        "commits"
    };

    format!(
        "{}: {} ({} {}, {})",
        entity, analysis.bump, analysis.relevant_commits, noun, since
    )
}

/// Display the planner's decisions.
pub fn display_plan(outcome: &PlanOutcome) {
    println!("\n{}", style("Bump plan:").bold());
    for analysis in &outcome.analyses {
        let line = format_analysis(analysis);
        if analysis.bump.is_none() {
            println!("  {}", style(line).dim());
        } else {
            println!("  {}", line);
        }
    }

    if !outcome.plan.has_changes {
        display_status("No changes to release");
    }
}

/// `dnd5e: 1.0.0 -> 1.1.0 (minor)`
pub fn format_version_change(change: &VersionChange) -> String {
    format!(
        "{}: {} -> {} ({})",
        change.entity(),
        change.old_version,
        change.new_version,
        change.bump
    )
}

pub fn display_version_change(change: &VersionChange) {
    println!("  {}", style(format_version_change(change)).green());
}

/// Display created tag names.
pub fn display_tags_created(tags: &[String]) {
    if tags.is_empty() {
        return;
    }
    println!("\n{}", style("Created tags:").bold());
    for tag in tags {
        println!("  - {}", style(tag).cyan());
    }
}

/// `dist/dnd5e-data-1.1.0.tar.gz (3 files, 1.2 KiB)`
pub fn format_archive(archive: &PackagedArchive) -> String {
    format!(
        "{} ({} files, {})",
        archive.path.display(),
        archive.manifest.files.len(),
        format_size(archive.size)
    )
}

pub fn display_archive(archive: &PackagedArchive) {
    display_success(&format!("Packaged {}: {}", archive.dataset, format_archive(archive)));
}

pub fn display_deployed(deployed: &DeployedDataset) {
    println!("\n{}:", style(&deployed.dataset).bold());
    if deployed.replaced {
        println!("  Removed existing {}", deployed.target.display());
    }
    println!(
        "  Copied {} -> {}",
        deployed.source.display(),
        deployed.target.display()
    );
    println!("  Copied {} files", deployed.files);
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
