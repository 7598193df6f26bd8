//! SQLite-backed chain store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{ChainStore, StoreError};
use crate::chain::{CertReport, ChainIdentity, Fingerprint};

/// SQLite-backed chain store.
pub struct SqliteChainStore {
    conn: Mutex<Connection>,
}

impl SqliteChainStore {
    /// Open a SQLite chain store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite chain store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chains (
                chain_fp BLOB NOT NULL,
                chain_id INTEGER PRIMARY KEY,
                valid INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS reports (
                chain_fp BLOB NOT NULL,
                cert_fp BLOB NOT NULL,
                is_end_entity INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS certs (
                cert_fp BLOB PRIMARY KEY,
                raw_cert BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chains_valid ON chains(valid, chain_id);
            CREATE INDEX IF NOT EXISTS idx_reports_chain_fp ON reports(chain_fp);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Insert a chain row.
    pub fn insert_chain(&self, chain: &ChainIdentity, valid: bool) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO chains (chain_fp, chain_id, valid) VALUES (?, ?, ?)",
            params![chain.fingerprint.as_bytes(), chain.sequence_id, valid],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert a report linking a certificate to a chain.
    pub fn insert_report(
        &self,
        chain: &Fingerprint,
        cert: &Fingerprint,
        is_end_entity: bool,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reports (chain_fp, cert_fp, is_end_entity) VALUES (?, ?, ?)",
            params![chain.as_bytes(), cert.as_bytes(), is_end_entity],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert or replace a raw certificate.
    pub fn insert_cert(&self, cert: &Fingerprint, raw: &[u8]) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO certs (cert_fp, raw_cert) VALUES (?, ?)",
            params![cert.as_bytes(), raw],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

impl ChainStore for SqliteChainStore {
    fn list_chains(&self, limit: usize, offset: i64) -> Result<Vec<ChainIdentity>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT chain_fp, chain_id FROM chains WHERE valid = 1 ORDER BY chain_id ASC LIMIT ? OFFSET ?",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64, offset], |row| {
                let fingerprint: Vec<u8> = row.get(0)?;
                let sequence_id: i64 = row.get(1)?;
                Ok(ChainIdentity::new(fingerprint, sequence_id))
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let collected = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()));
        collected
    }

    fn chain_reports(&self, chain: &Fingerprint) -> Result<Vec<CertReport>, StoreError> {
        let conn = self.lock()?;

        // Grouping keeps the pairs distinct while preserving insertion order.
        let mut stmt = conn
            .prepare(
                "SELECT cert_fp, is_end_entity FROM reports WHERE chain_fp = ? GROUP BY cert_fp, is_end_entity ORDER BY MIN(rowid)",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![chain.as_bytes()], |row| {
                let cert_fp: Vec<u8> = row.get(0)?;
                let is_end_entity: bool = row.get(1)?;
                Ok(CertReport {
                    cert_fingerprint: cert_fp.into(),
                    is_end_entity,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let collected = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()));
        collected
    }

    fn raw_cert(&self, cert: &Fingerprint) -> Result<Vec<u8>, StoreError> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT raw_cert FROM certs WHERE cert_fp = ?",
            params![cert.as_bytes()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))?
        .ok_or_else(|| StoreError::CertNotFound(cert.clone()))
    }
}
