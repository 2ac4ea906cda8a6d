//! Webhook signature verification and event parsing.
//!
//! The provider signs each delivery with `Stripe-Signature:
//! t=<unix>,v1=<hex>` where v1 is HMAC-SHA256 over `"{t}.{payload}"`
//! keyed by the endpoint secret. Deliveries older than five minutes are
//! rejected to limit replay.

use ring::hmac;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Accepted clock skew between the signature timestamp and now
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq)]
pub enum WebhookError {
    #[error("Missing or malformed signature header")]
    MalformedHeader,

    #[error("Signature mismatch")]
    BadSignature,

    #[error("Timestamp outside tolerance")]
    StaleTimestamp,

    #[error("Malformed event payload")]
    MalformedPayload,
}

fn parse_header(header: &str) -> Result<(i64, Vec<u8>), WebhookError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = hex::decode(value).ok(),
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(t), Some(sig)) => Ok((t, sig)),
        _ => Err(WebhookError::MalformedHeader),
    }
}

/// Verify a delivery against the endpoint secret. The secret may carry
/// the provider's `whsec_` prefix.
pub fn verify_signature(
    payload: &str,
    header: &str,
    endpoint_secret: &str,
    now_secs: i64,
) -> Result<(), WebhookError> {
    let (timestamp, signature) = parse_header(header)?;

    if (now_secs - timestamp).abs() > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::StaleTimestamp);
    }

    let secret = endpoint_secret
        .strip_prefix("whsec_")
        .unwrap_or(endpoint_secret);
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let signed_payload = format!("{timestamp}.{payload}");

    hmac::verify(&key, signed_payload.as_bytes(), &signature)
        .map_err(|_| WebhookError::BadSignature)
}

/// A parsed webhook event: type string plus the nested data object.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl WebhookEvent {
    pub fn parse(payload: &str) -> Result<Self, WebhookError> {
        serde_json::from_str(payload).map_err(|_| WebhookError::MalformedPayload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &str, timestamp: i64) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA256, b"test_secret");
        let tag = hmac::sign(&key, format!("{timestamp}.{payload}").as_bytes());
        format!("t={timestamp},v1={}", hex::encode(tag.as_ref()))
    }

    #[test]
    fn valid_signature_passes() {
        let payload = r#"{"type":"checkout.session.completed"}"#;
        let now = 1_700_000_000;
        let header = sign(payload, now);
        assert!(verify_signature(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = 1_700_000_000;
        let header = sign(r#"{"a":1}"#, now);
        assert_eq!(
            verify_signature(r#"{"a":2}"#, &header, SECRET, now),
            Err(WebhookError::BadSignature)
        );
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = "{}";
        let now = 1_700_000_000;
        let header = sign(payload, now - TIMESTAMP_TOLERANCE_SECS - 1);
        assert_eq!(
            verify_signature(payload, &header, SECRET, now),
            Err(WebhookError::StaleTimestamp)
        );
    }

    #[test]
    fn future_timestamp_within_tolerance_passes() {
        let payload = "{}";
        let now = 1_700_000_000;
        let header = sign(payload, now + 60);
        assert!(verify_signature(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert_eq!(
            verify_signature("{}", "v1=zz", SECRET, 0),
            Err(WebhookError::MalformedHeader)
        );
        assert_eq!(
            verify_signature("{}", "", SECRET, 0),
            Err(WebhookError::MalformedHeader)
        );
    }

    #[test]
    fn event_parsing() {
        let event = WebhookEvent::parse(
            r#"{"type":"invoice.payment_succeeded","data":{"object":{"subscription":"sub_1"}}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, "invoice.payment_succeeded");
        assert_eq!(
            event.data.object.get("subscription").and_then(|v| v.as_str()),
            Some("sub_1")
        );

        assert!(WebhookEvent::parse("not json").is_err());
    }
}
