//! CSV report formatting and persistence

use crate::output::ProductRecord;
use crate::Result;
use std::io;
use std::path::{Path, PathBuf};

/// File name prefix of persisted reports
pub const REPORT_PREFIX: &str = "missing-images-";

/// Formats records as CSV with the header `pageUrl,name,imageSrc,isMissing`
///
/// An empty slice produces a single placeholder row so the output always
/// has a header plus at least one data row. Fields containing commas,
/// quotes or line breaks are quoted.
///
/// # Example
///
/// ```
/// use image_audit::output::format_report;
///
/// let csv = format_report(&[]).unwrap();
/// assert_eq!(csv, "pageUrl,name,imageSrc,isMissing\n,No product card found,,false\n");
/// ```
pub fn format_report(records: &[ProductRecord]) -> Result<String> {
    let placeholder = [ProductRecord::placeholder()];
    let rows = if records.is_empty() {
        tracing::warn!("No product cards found, writing placeholder row");
        &placeholder[..]
    } else {
        records
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in rows {
        writer.serialize(record)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let text =
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(text)
}

/// Writes a report into `dir` as `missing-images-<unix-millis>.csv`
///
/// Creates the directory if needed and never overwrites an existing report.
pub fn save_report(dir: &Path, csv: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut stamp = chrono::Utc::now().timestamp_millis();
    let mut path = dir.join(report_file_name(stamp));
    while path.exists() {
        stamp += 1;
        path = dir.join(report_file_name(stamp));
    }

    std::fs::write(&path, csv)?;
    tracing::info!("CSV file saved: {}", path.display());
    Ok(path)
}

/// Finds the most recent report in `dir`
///
/// # Returns
///
/// * `Ok(Some(path))` - The report with the greatest timestamp
/// * `Ok(None)` - The directory is missing or holds no reports
/// * `Err(AuditError::Io)` - The directory could not be read
pub fn latest_report(dir: &Path) -> Result<Option<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<(i64, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let Some(stamp) = entry.file_name().to_str().and_then(report_timestamp) else {
            continue;
        };
        if latest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            latest = Some((stamp, entry.path()));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

fn report_file_name(stamp: i64) -> String {
    format!("{}{}.csv", REPORT_PREFIX, stamp)
}

/// Extracts the timestamp from a report file name
fn report_timestamp(file_name: &str) -> Option<i64> {
    file_name
        .strip_prefix(REPORT_PREFIX)?
        .strip_suffix(".csv")?
        .parse()
        .ok()
}
