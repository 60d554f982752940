//! API client for the QRZ XML data service.
//!
//! Every QRZ call is a GET against one endpoint; the query parameters pick
//! the operation. `QrzTransport` is the seam for that single GET so the
//! session logic can be driven by a canned transport in tests.

use std::time::Duration;

use chrono::Local;
use reqwest::Client;
use tracing::debug;

use super::response;
use super::ApiError;
use crate::models::LookupRecord;

// ============================================================================
// Constants
// ============================================================================

/// QRZ XML interface, current protocol version.
pub const DEFAULT_ENDPOINT: &str = "https://xmldata.qrz.com/xml/current/";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Callsign used for the throwaway session probe.
const PROBE_CALLSIGN: &str = "TEST";

/// One GET against the QRZ endpoint, returning the response body.
#[allow(async_fn_in_trait)]
pub trait QrzTransport {
    async fn get(&self, params: &[(&str, &str)]) -> Result<String, ApiError>;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

impl QrzTransport for HttpTransport {
    async fn get(&self, params: &[(&str, &str)]) -> Result<String, ApiError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }
}

/// QRZ operations on top of a transport.
pub struct ApiClient<T> {
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Client talking HTTP to `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        Ok(Self::with_transport(HttpTransport::new(endpoint)?))
    }
}

impl<T: QrzTransport> ApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exchange credentials for a session key.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        debug!(username = username, "Requesting new QRZ session key");
        let body = self
            .transport
            .get(&[("username", username), ("password", password)])
            .await?;
        response::parse_session_key(&body)
    }

    /// Probe whether `token` is still accepted. Any failure counts as "no".
    pub async fn probe(&self, token: &str) -> bool {
        match self
            .transport
            .get(&[("s", token), ("callsign", PROBE_CALLSIGN)])
            .await
        {
            Ok(body) => response::probe_accepts(&body),
            Err(e) => {
                debug!(error = %e, "Session probe failed");
                false
            }
        }
    }

    /// Look up one callsign. An `<Error>` in the response is returned as an
    /// error; nothing is retried.
    pub async fn lookup(&self, token: &str, callsign: &str) -> Result<LookupRecord, ApiError> {
        let callsign = normalize_callsign(callsign);
        debug!(callsign = %callsign, "Looking up callsign");
        let body = self
            .transport
            .get(&[("s", token), ("callsign", callsign.as_str())])
            .await?;
        response::parse_lookup(&body, Local::now())
    }
}

/// Callsigns are matched case-insensitively by QRZ; send them upper-cased.
pub fn normalize_callsign(callsign: &str) -> String {
    callsign.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const LOOKUP_BODY: &str = "<QRZDatabase><Callsign><call>W1AW</call><fname>ARRL HQ</fname><addr2>NEWINGTON</addr2><state>CT</state><country>United States</country></Callsign><Session><Key>k1</Key></Session></QRZDatabase>";

    #[test]
    fn test_normalize_callsign() {
        assert_eq!(normalize_callsign(" w1aw "), "W1AW");
        assert_eq!(normalize_callsign("VK2/G4ABC"), "VK2/G4ABC");
    }

    #[tokio::test]
    async fn test_http_lookup_sends_session_and_callsign() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/xml/current/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("s".into(), "k1".into()),
                Matcher::UrlEncoded("callsign".into(), "W1AW".into()),
            ]))
            .with_status(200)
            .with_body(LOOKUP_BODY)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/xml/current/", server.url())).unwrap();
        let record = client.lookup("k1", "w1aw").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.call, "W1AW");
        assert_eq!(record.first_name, "ARRL HQ");
        assert_eq!(record.name, "");
        assert_eq!(record.address, "NEWINGTON");
    }

    #[tokio::test]
    async fn test_http_login_sends_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/xml/current/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "aa7bq".into()),
                Matcher::UrlEncoded("password".into(), "p&ss word".into()),
            ]))
            .with_body("<QRZDatabase><Session><Key>fresh-key</Key></Session></QRZDatabase>")
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/xml/current/", server.url())).unwrap();
        let key = client.login("aa7bq", "p&ss word").await.unwrap();

        mock.assert_async().await;
        assert_eq!(key, "fresh-key");
    }

    #[tokio::test]
    async fn test_http_error_status_fails_probe() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/xml/current/")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/xml/current/", server.url())).unwrap();
        assert!(!client.probe("k1").await);

        let err = client.lookup("k1", "W1AW").await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(ref b) if b == "maintenance"));
    }
}
