//! qrzcache core - QRZ callsign lookups with a cached session key.
//!
//! The session key lives in a small token store and is reused for up to an
//! hour, after a probe confirms QRZ still accepts it. Lookup results are
//! flat `LookupRecord`s that can be appended to CSV and JSON files.

pub mod api;
pub mod auth;
pub mod config;
pub mod export;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionManager, TokenSource, ValidToken};
pub use config::Config;
pub use models::LookupRecord;
