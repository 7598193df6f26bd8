//! Mock chain store for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::chain::{CertReport, ChainIdentity, Fingerprint};
use crate::store::{ChainStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    /// Kept sorted by sequence ID.
    chains: Vec<ChainIdentity>,
    reports: HashMap<Fingerprint, Vec<CertReport>>,
    certs: HashMap<Fingerprint, Vec<u8>>,
    page_requests: Vec<(usize, i64)>,
    list_failure: Option<(i64, String)>,
    cert_failure: Option<String>,
}

/// In-memory implementation of the ChainStore trait.
///
/// Provides controllable behavior for testing:
/// - Seed chains with arbitrary certificate records
/// - Record every page request for pagination assertions
/// - Inject listing and certificate lookup failures
#[derive(Debug, Default)]
pub struct MockChainStore {
    inner: Mutex<Inner>,
}

impl MockChainStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `count` valid chains, sequence IDs `1..=count`.
    ///
    /// Chain `n` has fingerprint `chain-n`, a leaf `leaf-n` with bytes
    /// `leaf-n-der` and one intermediate `inter-n` with bytes `inter-n-der`.
    pub fn with_chains(count: i64) -> Self {
        let store = Self::new();
        for id in 1..=count {
            let leaf = format!("leaf-{}", id);
            let inter = format!("inter-{}", id);
            store.add_chain_records(
                id,
                &format!("chain-{}", id),
                vec![
                    (leaf.as_str(), true, format!("{}-der", leaf).into_bytes()),
                    (inter.as_str(), false, format!("{}-der", inter).into_bytes()),
                ],
            );
        }
        store
    }

    /// Add a chain with records given as `(cert fingerprint, is_end_entity, raw bytes)`,
    /// in retrieval order.
    pub fn add_chain_records(
        &self,
        sequence_id: i64,
        chain: &str,
        records: Vec<(&str, bool, Vec<u8>)>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        let identity = ChainIdentity::new(chain.as_bytes(), sequence_id);

        let reports: Vec<CertReport> = records
            .into_iter()
            .map(|(cert, is_end_entity, raw)| {
                let fingerprint = Fingerprint::new(cert.as_bytes());
                inner.certs.insert(fingerprint.clone(), raw);
                CertReport {
                    cert_fingerprint: fingerprint,
                    is_end_entity,
                }
            })
            .collect();
        inner.reports.insert(identity.fingerprint.clone(), reports);

        let pos = inner
            .chains
            .partition_point(|c| c.sequence_id < sequence_id);
        inner.chains.insert(pos, identity);
    }

    /// Remove a certificate's bytes while leaving references to it.
    pub fn remove_cert(&self, cert: &str) {
        self.inner
            .lock()
            .unwrap()
            .certs
            .remove(&Fingerprint::new(cert.as_bytes()));
    }

    /// Fail `list_chains` calls made at `offset`.
    pub fn fail_list_at_offset(&self, offset: i64, message: &str) {
        self.inner.lock().unwrap().list_failure = Some((offset, message.to_string()));
    }

    /// Fail every certificate lookup.
    pub fn fail_cert_lookups(&self, message: &str) {
        self.inner.lock().unwrap().cert_failure = Some(message.to_string());
    }

    /// Every `(limit, offset)` passed to `list_chains`, in call order.
    pub fn page_requests(&self) -> Vec<(usize, i64)> {
        self.inner.lock().unwrap().page_requests.clone()
    }
}

impl ChainStore for MockChainStore {
    fn list_chains(&self, limit: usize, offset: i64) -> Result<Vec<ChainIdentity>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.page_requests.push((limit, offset));

        if let Some((fail_at, message)) = &inner.list_failure {
            if *fail_at == offset {
                return Err(StoreError::Database(message.clone()));
            }
        }

        let start = (offset.max(0) as usize).min(inner.chains.len());
        let end = start.saturating_add(limit).min(inner.chains.len());
        Ok(inner.chains[start..end].to_vec())
    }

    fn chain_reports(&self, chain: &Fingerprint) -> Result<Vec<CertReport>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.reports.get(chain).cloned().unwrap_or_default())
    }

    fn raw_cert(&self, cert: &Fingerprint) -> Result<Vec<u8>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.cert_failure {
            return Err(StoreError::Database(message.clone()));
        }
        inner
            .certs
            .get(cert)
            .cloned()
            .ok_or_else(|| StoreError::CertNotFound(cert.clone()))
    }
}
