//! Wire types of the `add-chain` call.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Body of an `add-chain` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddChainRequest {
    /// Base64 DER certificates, leaf first.
    pub chain: Vec<String>,
}

impl AddChainRequest {
    pub fn from_certs(certs: &[Vec<u8>]) -> Self {
        Self {
            chain: certs.iter().map(|c| BASE64.encode(c)).collect(),
        }
    }
}

/// Fields of an `add-chain` response we care about.
///
/// The signed certificate timestamp also carries `sct_version`, `id`,
/// `extensions` and `signature`; they are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AddChainResponse {
    pub timestamp: i64,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Log inclusion timestamp, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl From<AddChainResponse> for SubmissionOutcome {
    fn from(response: AddChainResponse) -> Self {
        Self {
            timestamp: response.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_is_exact() {
        let request = AddChainRequest::from_certs(&[b"X".to_vec(), b"Y".to_vec()]);
        let body = serde_json::to_string(&request).unwrap();
        assert_eq!(body, r#"{"chain":["WA==","WQ=="]}"#);
    }

    #[test]
    fn test_request_preserves_order() {
        let request =
            AddChainRequest::from_certs(&[b"leaf".to_vec(), b"i1".to_vec(), b"i2".to_vec()]);
        assert_eq!(request.chain, vec!["bGVhZg==", "aTE=", "aTI="]);
    }

    #[test]
    fn test_response_ignores_sct_fields() {
        let json = r#"{
            "sct_version": 0,
            "id": "7ku9t3XOYLrhQmkfq+GeZqMPfl+wctiDAMR7iXqo/cs=",
            "timestamp": 1712345678901,
            "extensions": "",
            "signature": "BAMARzBFAiEA"
        }"#;
        let response: AddChainResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.timestamp, 1712345678901);
    }

    #[test]
    fn test_response_without_timestamp_fails() {
        let result: Result<AddChainResponse, _> = serde_json::from_str(r#"{"id": "abc"}"#);
        assert!(result.is_err());
    }
}
