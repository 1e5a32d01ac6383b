// CSV export of a grouping result.
//
// Two columns (group name, member name), one row per member, UTF-8 with a
// leading byte-order mark so spreadsheet tools detect the encoding.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::participant::Group;

const BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 2] = ["group name", "member name"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("there are no groups to export")]
    NoGroups,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Serialize `groups` into CSV bytes (BOM, header, one row per member).
pub fn groups_to_csv(groups: &[Group]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BOM.to_vec());

    wtr.write_record(HEADER)?;
    for group in groups {
        for member in &group.members {
            wtr.write_record([group.name.as_str(), member.name.as_str()])?;
        }
    }

    wtr.into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// File name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("grouping_results_{}.csv", date.format("%Y-%m-%d"))
}

/// Where exports go when no directory is configured: the user's download
/// directory, else the working directory.
pub fn default_export_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Write `groups` to `<dir>/grouping_results_<date>.csv`, creating `dir` if
/// needed. Returns the written path.
pub fn write_export(groups: &[Group], dir: &Path, date: NaiveDate) -> Result<PathBuf, ExportError> {
    if groups.is_empty() {
        return Err(ExportError::NoGroups);
    }

    let bytes = groups_to_csv(groups)?;
    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = dir.join(export_file_name(date));
    std::fs::write(&path, bytes).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;

    info!("Exported {} groups to {}", groups.len(), path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
