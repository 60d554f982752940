//! Data models for QRZ lookups.
//!
//! - `LookupRecord`: the fixed field set extracted from one callsign query

pub mod record;

pub use record::{LookupRecord, TIMESTAMP_FORMAT};
