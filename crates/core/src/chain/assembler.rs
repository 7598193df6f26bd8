//! Chain assembly from store records.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use super::types::{AssembledChain, CertRecord, ChainIdentity, Fingerprint};
use crate::store::{ChainStore, StoreError};

/// A chain whose stored records cannot form a submittable chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("chain without end-entity")]
    MissingEndEntity,

    /// A report references a certificate the store has no bytes for.
    #[error("missing certificate {0}")]
    MissingCertificate(Fingerprint),
}

/// Errors that can occur while assembling a chain.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The chain is invalid and should be skipped.
    #[error("invalid chain: {0}")]
    Validation(#[from] ValidationError),

    /// The store failed. Not recoverable.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Builds submittable chains from stored chain identities.
#[derive(Clone)]
pub struct ChainAssembler {
    store: Arc<dyn ChainStore>,
}

impl ChainAssembler {
    pub fn new(store: Arc<dyn ChainStore>) -> Self {
        Self { store }
    }

    /// Fetch the certificates of `identity` and order them leaf first.
    ///
    /// If several records are marked end-entity the last one seen is used
    /// and the earlier ones are dropped.
    pub fn assemble(&self, identity: ChainIdentity) -> Result<AssembledChain, AssembleError> {
        let records = self.fetch_records(&identity)?;
        let certs = order_leaf_first(&identity, records)?;
        Ok(AssembledChain { identity, certs })
    }

    fn fetch_records(&self, identity: &ChainIdentity) -> Result<Vec<CertRecord>, AssembleError> {
        self.store
            .chain_reports(&identity.fingerprint)?
            .into_iter()
            .map(|report| {
                let raw_bytes = match self.store.raw_cert(&report.cert_fingerprint) {
                    Ok(raw) => raw,
                    Err(StoreError::CertNotFound(fp)) => {
                        return Err(ValidationError::MissingCertificate(fp).into());
                    }
                    Err(e) => return Err(e.into()),
                };
                Ok(CertRecord {
                    fingerprint: report.cert_fingerprint,
                    raw_bytes,
                    is_end_entity: report.is_end_entity,
                })
            })
            .collect()
    }
}

fn order_leaf_first(
    identity: &ChainIdentity,
    records: Vec<CertRecord>,
) -> Result<Vec<Vec<u8>>, ValidationError> {
    let mut leaf: Option<CertRecord> = None;
    let mut others = Vec::with_capacity(records.len());

    for record in records {
        if record.is_end_entity {
            if let Some(previous) = leaf.replace(record) {
                warn!(
                    chain_id = identity.sequence_id,
                    chain_fp = %identity.fingerprint,
                    dropped_leaf = %previous.fingerprint,
                    "Chain has more than one end-entity certificate, keeping the last"
                );
            }
        } else {
            others.push(record.raw_bytes);
        }
    }

    let leaf = leaf.ok_or(ValidationError::MissingEndEntity)?;

    let mut certs = Vec::with_capacity(others.len() + 1);
    certs.push(leaf.raw_bytes);
    certs.extend(others);
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChainStore;

    fn fp(tag: &str) -> Fingerprint {
        Fingerprint::new(tag.as_bytes())
    }

    fn assembler(store: MockChainStore) -> ChainAssembler {
        ChainAssembler::new(Arc::new(store))
    }

    #[test]
    fn test_leaf_then_intermediate() {
        let store = MockChainStore::new();
        store.add_chain_records(
            1,
            "chain",
            vec![("A", true, b"X".to_vec()), ("B", false, b"Y".to_vec())],
        );

        let chain = assembler(store)
            .assemble(ChainIdentity::new(fp("chain"), 1))
            .unwrap();

        assert_eq!(chain.certs, vec![b"X".to_vec(), b"Y".to_vec()]);
        assert_eq!(chain.sequence_id(), 1);
    }

    #[test]
    fn test_leaf_moved_to_front_others_keep_order() {
        let store = MockChainStore::new();
        store.add_chain_records(
            7,
            "chain",
            vec![
                ("I1", false, b"i1".to_vec()),
                ("I2", false, b"i2".to_vec()),
                ("L", true, b"leaf".to_vec()),
                ("I3", false, b"i3".to_vec()),
            ],
        );

        let chain = assembler(store)
            .assemble(ChainIdentity::new(fp("chain"), 7))
            .unwrap();

        assert_eq!(
            chain.certs,
            vec![
                b"leaf".to_vec(),
                b"i1".to_vec(),
                b"i2".to_vec(),
                b"i3".to_vec()
            ]
        );
    }

    #[test]
    fn test_leaf_only_chain() {
        let store = MockChainStore::new();
        store.add_chain_records(2, "solo", vec![("L", true, b"leaf".to_vec())]);

        let chain = assembler(store)
            .assemble(ChainIdentity::new(fp("solo"), 2))
            .unwrap();
        assert_eq!(chain.certs, vec![b"leaf".to_vec()]);
    }

    #[test]
    fn test_missing_end_entity_is_validation_error() {
        let store = MockChainStore::new();
        store.add_chain_records(
            3,
            "no-leaf",
            vec![("I1", false, b"i1".to_vec()), ("I2", false, b"i2".to_vec())],
        );

        let err = assembler(store)
            .assemble(ChainIdentity::new(fp("no-leaf"), 3))
            .unwrap_err();

        assert!(matches!(
            err,
            AssembleError::Validation(ValidationError::MissingEndEntity)
        ));
    }

    #[test]
    fn test_no_records_is_validation_error() {
        let store = MockChainStore::new();
        let err = assembler(store)
            .assemble(ChainIdentity::new(fp("empty"), 4))
            .unwrap_err();
        assert!(matches!(err, AssembleError::Validation(_)));
    }

    #[test]
    fn test_multiple_leaves_last_wins() {
        let store = MockChainStore::new();
        store.add_chain_records(
            5,
            "two-leaves",
            vec![
                ("L1", true, b"first".to_vec()),
                ("I", false, b"inter".to_vec()),
                ("L2", true, b"second".to_vec()),
            ],
        );

        let chain = assembler(store)
            .assemble(ChainIdentity::new(fp("two-leaves"), 5))
            .unwrap();
        assert_eq!(chain.certs, vec![b"second".to_vec(), b"inter".to_vec()]);
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let store = MockChainStore::new();
        store.add_chain_records(6, "chain", vec![("L", true, b"leaf".to_vec())]);
        store.fail_cert_lookups("connection reset");

        let err = assembler(store)
            .assemble(ChainIdentity::new(fp("chain"), 6))
            .unwrap_err();
        assert!(matches!(err, AssembleError::Store(StoreError::Database(_))));
    }

    #[test]
    fn test_missing_cert_row_is_validation_error() {
        let store = MockChainStore::new();
        store.add_chain_records(
            8,
            "dangling",
            vec![("L", true, b"leaf".to_vec()), ("I", false, b"inter".to_vec())],
        );
        store.remove_cert("I");

        let err = assembler(store)
            .assemble(ChainIdentity::new(fp("dangling"), 8))
            .unwrap_err();
        assert!(matches!(
            err,
            AssembleError::Validation(ValidationError::MissingCertificate(ref missing))
                if *missing == fp("I")
        ));
    }
}
