//! Writing report output files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::JiraReportError;
use crate::report_render::RenderedReport;

/// Paths of the files produced by one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

impl ReportPaths {
    /// `<basename>_raw.json` and `<basename>.html` under `directory`.
    pub fn for_basename(directory: &Path, basename: &str) -> Self {
        ReportPaths {
            json: directory.join(format!("{basename}_raw.json")),
            html: directory.join(format!("{basename}.html")),
        }
    }
}

/// Write both report files, replacing any previous run's output.
///
/// Both contents are staged as temporary files next to their targets before
/// either target is replaced. If the HTML cannot be moved into place after
/// the JSON was, the fresh JSON is removed so no run leaves a new JSON file
/// beside an old HTML file.
///
/// # Errors
///
/// Returns `JiraReportError::Io` if staging or persisting fails.
pub fn write_report_files(paths: &ReportPaths, report: &RenderedReport) -> Result<(), JiraReportError> {
    let json = stage(&paths.json, &report.json)?;
    let html = stage(&paths.html, &report.html)?;
    persist(json, &paths.json)?;
    if let Err(error) = persist(html, &paths.html) {
        if let Err(cleanup) = fs::remove_file(&paths.json) {
            warn!(path = %paths.json.display(), %cleanup, "could not remove JSON output");
        }
        return Err(error);
    }
    Ok(())
}

fn stage(target: &Path, contents: &str) -> Result<NamedTempFile, JiraReportError> {
    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory).map_err(|error| {
        JiraReportError::Io(format!("cannot create {}: {error}", directory.display()))
    })?;
    let mut file = NamedTempFile::new_in(&directory)
        .map_err(|error| JiraReportError::Io(error.to_string()))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|error| JiraReportError::Io(error.to_string()))?;
    Ok(file)
}

fn persist(file: NamedTempFile, target: &Path) -> Result<(), JiraReportError> {
    file.persist(target).map_err(|error| {
        JiraReportError::Io(format!("cannot write {}: {}", target.display(), error.error))
    })?;
    Ok(())
}
