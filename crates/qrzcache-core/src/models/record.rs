use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Format of the locally generated `timestamp` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One callsign lookup result.
///
/// Field names and order are the export column layout, so they are
/// serialized under the short QRZ-style names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRecord {
    pub call: String,
    #[serde(rename = "fname")]
    pub first_name: String,
    pub name: String,
    #[serde(rename = "addr")]
    pub address: String,
    pub state: String,
    pub country: String,
    pub timestamp: String,
}

impl LookupRecord {
    /// Column names in serialization order.
    pub const FIELDS: [&'static str; 7] =
        ["call", "fname", "name", "addr", "state", "country", "timestamp"];

    pub fn stamp(at: DateTime<Local>) -> String {
        at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.name)
            .trim()
            .to_string()
    }

    /// "City, ST" style location, skipping whichever half is empty.
    pub fn location(&self) -> String {
        match (self.address.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}, {}", self.address, self.state),
            (false, true) => self.address.clone(),
            (true, false) => self.state.clone(),
            (true, true) => String::new(),
        }
    }
}
