//! HTTP sink posting to a CT log's `add-chain` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{AddChainRequest, AddChainResponse, SubmissionError, SubmissionOutcome, SubmissionSink};
use crate::chain::AssembledChain;
use crate::config::LogConfig;

/// Submits chains to a live CT log.
pub struct LiveSink {
    client: Client,
    url: String,
}

impl LiveSink {
    /// Create a new LiveSink with the given configuration.
    pub fn new(config: &LogConfig) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SubmissionError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl SubmissionSink for LiveSink {
    fn name(&self) -> &str {
        "live"
    }

    async fn submit(&self, chain: &AssembledChain) -> Result<SubmissionOutcome, SubmissionError> {
        let request = AddChainRequest::from_certs(&chain.certs);

        let response = self.client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(SubmissionError::protocol(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        let parsed: AddChainResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SubmissionError::MalformedResponse(e.to_string()))?;

        debug!(
            chain_id = chain.sequence_id(),
            timestamp = parsed.timestamp,
            "Chain accepted by log"
        );

        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainIdentity;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(server: &MockServer) -> LogConfig {
        LogConfig {
            url: format!("{}/ct/v1/add-chain", server.uri()),
            timeout_secs: 5,
        }
    }

    fn test_chain() -> AssembledChain {
        AssembledChain {
            identity: ChainIdentity::new(vec![0xaa, 0xbb], 10),
            certs: vec![b"X".to_vec(), b"Y".to_vec()],
        }
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ct/v1/add-chain"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"chain":["WA==","WQ=="]}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"sct_version":0,"id":"aWQ=","timestamp":1700000000123,"extensions":"","signature":"c2ln"}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = LiveSink::new(&create_test_config(&mock_server)).unwrap();
        let outcome = sink.submit(&test_chain()).await.unwrap();

        assert_eq!(outcome.timestamp, 1700000000123);
    }

    #[tokio::test]
    async fn test_submit_non_200_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown anchor"))
            .mount(&mock_server)
            .await;

        let sink = LiveSink::new(&create_test_config(&mock_server)).unwrap();
        let err = sink.submit(&test_chain()).await.unwrap_err();

        match err {
            SubmissionError::Protocol { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "unknown anchor");
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_malformed_success_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let sink = LiveSink::new(&create_test_config(&mock_server)).unwrap();
        let err = sink.submit(&test_chain()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_submit_connection_refused_is_transport_error() {
        // Bind then drop a server so the port is closed.
        let uri = {
            let mock_server = MockServer::start().await;
            mock_server.uri()
        };

        let config = LogConfig {
            url: format!("{}/ct/v1/add-chain", uri),
            timeout_secs: 2,
        };
        let sink = LiveSink::new(&config).unwrap();
        let err = sink.submit(&test_chain()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Transport(_)));
    }
}
