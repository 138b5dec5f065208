//! Persisted JSON records passed between pipeline stages.
//!
//! Absent inputs load as `Ok(None)`; malformed documents are errors.

use crate::domain::BumpPlan;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    fs::write(path, contents)?;
    Ok(())
}

pub fn load_plan(path: &Path) -> Result<Option<BumpPlan>> {
    read_optional(path)
}

pub fn save_plan(path: &Path, plan: &BumpPlan) -> Result<()> {
    write_pretty(path, plan)
}

/// Tag names created by the applier, in creation order
pub fn load_created_tags(path: &Path) -> Result<Option<Vec<String>>> {
    read_optional(path)
}

pub fn save_created_tags(path: &Path, tags: &[String]) -> Result<()> {
    write_pretty(path, tags)
}

/// Read a JSON document whose fields must survive a rewrite untouched
pub fn load_document(path: &Path) -> Result<Option<Value>> {
    read_optional(path)
}

/// Write a JSON document with two-space indentation and a trailing newline
pub fn save_document(path: &Path, document: &Value) -> Result<()> {
    write_pretty(path, document)
}
