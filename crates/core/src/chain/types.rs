//! Types for stored chains and certificates.

use std::fmt;

/// Opaque content-derived identity of a chain or certificate.
///
/// Rendered as lowercase hex in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Fingerprint {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Fingerprint {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A chain as listed by the store, before its certificates are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainIdentity {
    /// Unique identity of the chain.
    pub fingerprint: Fingerprint,
    /// Monotonic ordinal used for pagination and as a resume offset.
    pub sequence_id: i64,
}

impl ChainIdentity {
    pub fn new(fingerprint: impl Into<Fingerprint>, sequence_id: i64) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            sequence_id,
        }
    }
}

/// One certificate reference of a chain, without its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertReport {
    pub cert_fingerprint: Fingerprint,
    pub is_end_entity: bool,
}

/// A certificate with its raw encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertRecord {
    pub fingerprint: Fingerprint,
    pub raw_bytes: Vec<u8>,
    pub is_end_entity: bool,
}

/// A chain ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledChain {
    pub identity: ChainIdentity,
    /// Leaf certificate first, remaining certificates in retrieval order.
    pub certs: Vec<Vec<u8>>,
}

impl AssembledChain {
    pub fn sequence_id(&self) -> i64 {
        self.identity.sequence_id
    }

    pub fn leaf(&self) -> Option<&[u8]> {
        self.certs.first().map(Vec::as_slice)
    }
}
