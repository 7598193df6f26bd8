//! Testing utilities and mock implementations.
//!
//! Mocks for the two external seams of the pipeline, so it can be driven
//! end to end without a database or a log.
//!
//! # Example
//!
//! ```rust,ignore
//! use ctfeeder_core::testing::{MockChainStore, MockSink};
//!
//! let store = MockChainStore::with_chains(1400);
//! let sink = MockSink::new();
//! sink.fail_chain(17);
//!
//! // Run an Orchestrator over them, then:
//! assert_eq!(store.page_requests(), vec![(1000, 0), (1000, 1000)]);
//! ```

mod mock_sink;
mod mock_store;

pub use mock_sink::MockSink;
pub use mock_store::MockChainStore;
