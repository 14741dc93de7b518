use std::fs;
use std::path::Path;

use csv::Writer;

use super::{RankedReport, ReportError};

pub(crate) fn ensure_parent(path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// One row per ring member in ranked order, unscored rows last.
/// Unknown values are empty cells.
pub fn write_csv<P: AsRef<Path>>(path: P, report: &RankedReport) -> Result<(), ReportError> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let mut writer = Writer::from_path(path)?;
    for row in report.ranked() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
