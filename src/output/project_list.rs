//! Project list CSV
//!
//! `list` writes one row per search result; the user flips the `include`
//! column and `download-list` reads the file back.

use super::OutputResult;
use crate::crawler::ProjectRecord;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::path::Path;
use tracing::{debug, info};

/// Column names, in file order
pub const PROJECT_LIST_HEADER: [&str; 7] = [
    "id",
    "url",
    "doc_url",
    "title",
    "proponent",
    "status",
    "include",
];

/// Writes the project list, replacing any existing file
///
/// The header row is written even when `projects` is empty.
pub fn write_project_list(path: &Path, projects: &[ProjectRecord]) -> OutputResult<usize> {
    info!("Writing project list: path={}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(PROJECT_LIST_HEADER)?;
    for project in projects {
        writer.serialize(project)?;
    }
    writer.flush()?;

    debug!("Wrote {} project rows", projects.len());
    Ok(projects.len())
}

/// Reads a project list written by [`write_project_list`]
///
/// Fields are trimmed; columns missing from a hand-edited file read as empty.
pub fn read_project_list(path: &Path) -> OutputResult<Vec<ProjectRecord>> {
    info!("Reading project list: path={}", path.display());

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut projects = Vec::new();
    for row in reader.deserialize() {
        let project: ProjectRecord = row?;
        projects.push(project);
    }

    debug!("Read {} project rows", projects.len());
    Ok(projects)
}

/// Keeps the rows marked for download, in file order
pub fn select_included(projects: &[ProjectRecord]) -> Vec<&ProjectRecord> {
    projects.iter().filter(|p| p.is_included()).collect()
}
