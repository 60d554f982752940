//! Export of lookup results to local files.
//!
//! - CSV: appended one row per lookup, header written when the file is new
//! - JSON: a single array, rewritten in full on every append

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::LookupRecord;

/// Default CSV export file name.
pub const DEFAULT_CSV_FILE: &str = "qrz_callsigns.csv";

/// Default JSON export file name.
pub const DEFAULT_JSON_FILE: &str = "qrz_callsigns.json";

/// Append `record` as one CSV row.
pub fn export_csv(record: &LookupRecord, path: &Path) -> Result<()> {
    let is_new = !path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    writer
        .serialize(record)
        .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
    writer.flush()?;

    debug!(path = %path.display(), header = is_new, "CSV row appended");
    Ok(())
}

/// Append `record` to the JSON array in `path`.
///
/// A missing file starts a new array. So does a file that is not a JSON
/// array, after a warning; its old contents are replaced.
pub fn export_json(record: &LookupRecord, path: &Path) -> Result<()> {
    let mut entries = load_json_entries(path)?;
    entries.push(serde_json::to_value(record)?);

    let contents = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write JSON file {}", path.display()))?;

    debug!(path = %path.display(), entries = entries.len(), "JSON export rewritten");
    Ok(())
}

fn load_json_entries(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file {}", path.display()))?;

    match serde_json::from_str::<Vec<Value>>(&contents) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Existing JSON export unreadable, starting a new array");
            Ok(Vec::new())
        }
    }
}
