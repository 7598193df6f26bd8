//! Error types for the sink module.

use thiserror::Error;

/// Errors that can occur while submitting a chain.
///
/// All of them are local to one chain: the chain is dropped and the
/// pipeline continues.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The log answered with a status other than 200.
    #[error("non-200 status code {status}, body: {body}")]
    Protocol { status: u16, body: String },

    /// The log answered 200 with a body we could not decode.
    #[error("malformed add-chain response: {0}")]
    MalformedResponse(String),

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl SubmissionError {
    /// Creates a protocol error from a status and response body.
    pub fn protocol(status: u16, body: impl Into<String>) -> Self {
        Self::Protocol {
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
