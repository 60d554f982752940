//! Client module for the QRZ XML data service.
//!
//! This module provides the `ApiClient` for exchanging credentials for a
//! session key, probing a cached key, and looking up callsigns.
//!
//! QRZ authenticates each request with an `s=<session key>` query
//! parameter obtained from a username/password exchange.

pub mod client;
pub mod error;
pub mod response;

pub use client::{normalize_callsign, ApiClient, HttpTransport, QrzTransport, DEFAULT_ENDPOINT};
pub use error::ApiError;
