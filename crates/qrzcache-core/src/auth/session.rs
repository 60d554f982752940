use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use super::credentials::CredentialSource;
use super::store::TokenStore;
use crate::api::{ApiClient, ApiError, QrzTransport};

/// QRZ session keys are treated as dead after 60 minutes.
pub const SESSION_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// How the token handed out by `get_valid_token` was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Reused from the store after the probe accepted it
    Cached,
    /// Minted by a fresh credential exchange
    Fresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidToken {
    pub token: String,
    pub source: TokenSource,
}

/// Owns the cached session key: loads it, checks it, replaces it.
pub struct SessionManager<S, T> {
    store: S,
    client: ApiClient<T>,
    lifetime: Duration,
}

impl<S: TokenStore, T: QrzTransport> SessionManager<S, T> {
    pub fn new(store: S, client: ApiClient<T>) -> Self {
        Self {
            store,
            client,
            lifetime: SESSION_LIFETIME,
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored token if it is younger than the lifetime window.
    /// `Ok(None)` is the normal "nothing usable" answer.
    pub fn load_cached_token(&self) -> Result<Option<String>> {
        let Some(age) = self.store.age()? else {
            return Ok(None);
        };
        if age > self.lifetime {
            debug!(age_secs = age.as_secs(), "Cached session key past its lifetime");
            return Ok(None);
        }
        self.store.read_token()
    }

    /// Probe the service with `token`. Failures of any kind mean invalid.
    pub async fn validate(&self, token: &str) -> bool {
        self.client.probe(token).await
    }

    /// Ask for credentials, exchange them for a key and persist it.
    /// The store is untouched when the exchange yields no key.
    pub async fn acquire_new_token<C: CredentialSource>(&self, credentials: &mut C) -> Result<String> {
        let creds = credentials.credentials()?;
        let token = self.client.login(&creds.username, &creds.password).await?;
        self.store.write_token(&token)?;
        info!(username = %creds.username, "Stored new QRZ session key");
        Ok(token)
    }

    /// Cached token if it is fresh and still accepted, otherwise a new one.
    pub async fn get_valid_token<C: CredentialSource>(&self, credentials: &mut C) -> Result<ValidToken> {
        let cached = self.load_cached_token().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable session cache");
            None
        });

        if let Some(token) = cached {
            if self.validate(&token).await {
                return Ok(ValidToken {
                    token,
                    source: TokenSource::Cached,
                });
            }
            debug!("Cached session key rejected by QRZ");
        }

        let token = self.acquire_new_token(credentials).await?;
        Ok(ValidToken {
            token,
            source: TokenSource::Fresh,
        })
    }

    /// Drop the stored key so the next run logs in again.
    pub fn invalidate(&self) -> Result<()> {
        self.store.clear()
    }
}

/// Convenience for callers holding an `anyhow::Error` from this module.
pub fn as_api_error(err: &anyhow::Error) -> Option<&ApiError> {
    err.downcast_ref::<ApiError>()
}
