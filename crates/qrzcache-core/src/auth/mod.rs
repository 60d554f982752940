//! Session handling for the QRZ service.
//!
//! This module provides:
//! - `TokenStore`: where the session key is kept between runs (a plain
//!   text file by default, or memory only)
//! - `SessionManager`: load, probe, and replace the session key
//! - `CredentialSource`: where credentials come from when a new key is needed
//!
//! Keys are reused for at most 60 minutes after they were written.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::{CredentialSource, Credentials};
pub use session::{as_api_error, SessionManager, TokenSource, ValidToken, SESSION_LIFETIME};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, DEFAULT_SESSION_FILE};
