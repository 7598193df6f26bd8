//! Paginated reader of chain identities.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::queue::QueueSender;
use super::shutdown::Shutdown;
use super::types::SourceSummary;
use crate::chain::ChainIdentity;
use crate::store::{ChainStore, StoreError};

/// Reads valid chains page by page and emits each page as one batch.
pub struct ChainSource {
    store: Arc<dyn ChainStore>,
    page_size: usize,
    offset: i64,
}

impl ChainSource {
    pub fn new(store: Arc<dyn ChainStore>, page_size: usize, initial_offset: i64) -> Self {
        Self {
            store,
            page_size,
            offset: initial_offset,
        }
    }

    /// Read pages until the store runs out, pushing each into `batches`.
    ///
    /// Blocking: run it on a blocking thread. A page shorter than the page
    /// size is the last one requested. Store errors trigger `shutdown` and
    /// are returned as-is; they are never retried.
    pub fn run(
        mut self,
        batches: QueueSender<Vec<ChainIdentity>>,
        shutdown: &Shutdown,
    ) -> Result<SourceSummary, StoreError> {
        let mut summary = SourceSummary::default();
        info!(offset = self.offset, page_size = self.page_size, "Chain source started");

        while !shutdown.is_triggered() {
            let page = match self.store.list_chains(self.page_size, self.offset) {
                Ok(page) => page,
                Err(e) => {
                    error!(offset = self.offset, "Failed to list chains: {}", e);
                    shutdown.trigger();
                    return Err(e);
                }
            };

            let len = page.len();
            if len == 0 {
                break;
            }

            debug!(offset = self.offset, chains = len, "Read chain page");
            if batches.blocking_push(page).is_err() {
                debug!("Batch consumer gone, chain source stopping");
                break;
            }

            summary.pages += 1;
            summary.identities += len;
            self.offset += len as i64;

            if len < self.page_size {
                break;
            }
        }

        summary.next_offset = self.offset;
        info!(
            pages = summary.pages,
            chains = summary.identities,
            "Chain source finished"
        );
        Ok(summary)
    }
}
