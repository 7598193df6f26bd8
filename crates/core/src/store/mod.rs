//! Backing store of chains, chain reports and raw certificates.

mod sqlite;
mod traits;

pub use sqlite::SqliteChainStore;
pub use traits::{ChainStore, StoreError};
