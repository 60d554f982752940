//! Parsing of QRZ XML responses.
//!
//! QRZ wraps everything in a namespaced `<QRZDatabase>` root with a
//! `<Session>` block (holding `Key` and an optional `Error`) and, for
//! lookups, a `<Callsign>` block. Elements are matched by local name
//! anywhere in the document.

use chrono::{DateTime, Local};
use roxmltree::Document;
use tracing::debug;

use super::error::{is_session_message, ApiError};
use crate::models::LookupRecord;

fn parse(body: &str) -> Result<Document<'_>, ApiError> {
    Document::parse(body).map_err(|e| ApiError::InvalidResponse(format!("Malformed XML: {}", e)))
}

/// Trimmed text of the first element named `tag`, or `None` if absent.
fn find_text(doc: &Document<'_>, tag: &str) -> Option<String> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
        .map(|n| n.text().unwrap_or("").trim().to_string())
}

/// Extract the session key from a login response.
///
/// Anything without a non-empty `Key` element, including a body that is not
/// XML at all, is reported with the raw body attached.
pub fn parse_session_key(body: &str) -> Result<String, ApiError> {
    let key = Document::parse(body)
        .ok()
        .and_then(|doc| find_text(&doc, "Key"))
        .filter(|key| !key.is_empty());

    key.ok_or_else(|| ApiError::MissingKey {
        body: body.to_string(),
    })
}

/// Whether a probe response shows the session key is still accepted.
pub fn probe_accepts(body: &str) -> bool {
    let doc = match parse(body) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "Probe response unreadable");
            return false;
        }
    };

    match find_text(&doc, "Error") {
        Some(message) if is_session_message(&message) => {
            debug!(message = %message, "Probe rejected session");
            false
        }
        _ => true,
    }
}

/// Build a `LookupRecord` from a callsign query response.
pub fn parse_lookup(body: &str, stamped_at: DateTime<Local>) -> Result<LookupRecord, ApiError> {
    let doc = parse(body)?;

    if let Some(message) = find_text(&doc, "Error") {
        return Err(ApiError::from_service_message(&message));
    }

    let field = |tag: &str| find_text(&doc, tag).unwrap_or_default();

    Ok(LookupRecord {
        call: field("call"),
        first_name: field("fname"),
        name: field("name"),
        address: field("addr2"),
        state: field("state"),
        country: field("country"),
        timestamp: LookupRecord::stamp(stamped_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LOGIN_OK: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Key> 2331uf894c4bd29f3923f3bacf02c532d7bd9 </Key>
    <Count>123</Count>
    <SubExp>Wed Jan 1 12:34:03 2025</SubExp>
    <GMTime>Sun Aug 16 03:51:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

    const LOGIN_BAD: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Error>Username/password incorrect</Error>
    <GMTime>Sun Aug 16 03:51:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

    const LOOKUP_FULL: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Callsign>
    <call>AA7BQ</call>
    <fname>FRED L</fname>
    <name>LLOYD</name>
    <addr1>8711 E PINNACLE PEAK RD 193</addr1>
    <addr2>SCOTTSDALE</addr2>
    <state>AZ</state>
    <country>United States</country>
  </Callsign>
  <Session>
    <Key>2331uf894c4bd29f3923f3bacf02c532d7bd9</Key>
  </Session>
</QRZDatabase>"#;

    const LOOKUP_SPARSE: &str = r#"<QRZDatabase xmlns="http://xmldata.qrz.com">
  <Callsign>
    <call>VK2XX</call>
    <name></name>
    <country>Australia</country>
  </Callsign>
  <Session><Key>abc</Key></Session>
</QRZDatabase>"#;

    fn stamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 8, 16, 3, 51, 47).unwrap()
    }

    fn session_error(message: &str) -> String {
        format!(
            "<QRZDatabase xmlns=\"http://xmldata.qrz.com\"><Session><Error>{}</Error></Session></QRZDatabase>",
            message
        )
    }

    #[test]
    fn test_parse_session_key() {
        let key = parse_session_key(LOGIN_OK).unwrap();
        assert_eq!(key, "2331uf894c4bd29f3923f3bacf02c532d7bd9");
    }

    #[test]
    fn test_parse_session_key_missing_keeps_raw_body() {
        match parse_session_key(LOGIN_BAD) {
            Err(ApiError::MissingKey { body }) => assert_eq!(body, LOGIN_BAD),
            other => panic!("expected MissingKey, got {:?}", other),
        }

        match parse_session_key("<html>gateway timeout</html") {
            Err(ApiError::MissingKey { body }) => assert_eq!(body, "<html>gateway timeout</html"),
            other => panic!("expected MissingKey, got {:?}", other),
        }

        let empty_key = "<QRZDatabase><Session><Key>  </Key></Session></QRZDatabase>";
        assert!(matches!(
            parse_session_key(empty_key),
            Err(ApiError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_probe_accepts() {
        assert!(probe_accepts(LOOKUP_FULL));
        assert!(probe_accepts(&session_error("Not found: TEST")));
        assert!(!probe_accepts(&session_error("Invalid session key")));
        assert!(!probe_accepts(&session_error("Session Timeout")));
        assert!(!probe_accepts("not xml"));
        assert!(!probe_accepts(""));
    }

    #[test]
    fn test_parse_lookup_full() {
        let record = parse_lookup(LOOKUP_FULL, stamp()).unwrap();
        assert_eq!(record.call, "AA7BQ");
        assert_eq!(record.first_name, "FRED L");
        assert_eq!(record.name, "LLOYD");
        assert_eq!(record.address, "SCOTTSDALE");
        assert_eq!(record.state, "AZ");
        assert_eq!(record.country, "United States");
        assert_eq!(record.timestamp, "2024-08-16 03:51:47");
    }

    #[test]
    fn test_parse_lookup_missing_fields_are_empty() {
        let record = parse_lookup(LOOKUP_SPARSE, stamp()).unwrap();
        assert_eq!(record.call, "VK2XX");
        assert_eq!(record.first_name, "");
        assert_eq!(record.name, "");
        assert_eq!(record.address, "");
        assert_eq!(record.state, "");
        assert_eq!(record.country, "Australia");
    }

    #[test]
    fn test_parse_lookup_error_element() {
        let err = parse_lookup(&session_error("Session Timeout"), stamp()).unwrap_err();
        assert!(err.is_session_expired());

        let err = parse_lookup(&session_error("Not found: XX1XX"), stamp()).unwrap_err();
        assert!(matches!(err, ApiError::Service(ref m) if m == "Not found: XX1XX"));
    }

    #[test]
    fn test_parse_lookup_malformed() {
        assert!(matches!(
            parse_lookup("<QRZDatabase><Callsign>", stamp()),
            Err(ApiError::InvalidResponse(_))
        ));
    }
}
