use thiserror::Error;

use crate::chain::{CertReport, ChainIdentity, Fingerprint};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Certificate not found: {0}")]
    CertNotFound(Fingerprint),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Read access to stored chains.
///
/// Implementations are called from blocking threads, never from async tasks.
pub trait ChainStore: Send + Sync {
    /// List valid chains ordered by sequence ID ascending.
    ///
    /// Returns at most `limit` identities, skipping the first `offset`.
    fn list_chains(&self, limit: usize, offset: i64) -> Result<Vec<ChainIdentity>, StoreError>;

    /// Distinct certificate references of a chain, in retrieval order.
    fn chain_reports(&self, chain: &Fingerprint) -> Result<Vec<CertReport>, StoreError>;

    /// Raw encoding of a certificate.
    fn raw_cert(&self, cert: &Fingerprint) -> Result<Vec<u8>, StoreError>;
}
