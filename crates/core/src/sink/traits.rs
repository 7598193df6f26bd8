//! Trait definitions for the sink module.

use async_trait::async_trait;

use super::error::SubmissionError;
use super::types::SubmissionOutcome;
use crate::chain::AssembledChain;

/// Something that accepts one chain submission at a time.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Returns the name of this sink implementation.
    fn name(&self) -> &str;

    /// Submits a chain once. Implementations never retry.
    async fn submit(&self, chain: &AssembledChain) -> Result<SubmissionOutcome, SubmissionError>;
}
