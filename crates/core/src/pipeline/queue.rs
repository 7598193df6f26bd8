//! Bounded multi-consumer hand-off queue.
//!
//! A thin layer over `tokio::sync::mpsc` that lets several consumers share
//! one receiver and lets an observer read the queue depth without holding
//! either end. Pushing into a full queue waits for a free slot; it never
//! drops. The queue closes once every `QueueSender` is dropped and consumers
//! see `None` after draining what is left.

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

/// The consuming side is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue closed")]
pub struct QueueClosed;

/// Create a bounded queue holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is 0, like `tokio::sync::mpsc::channel`.
pub fn bounded<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    let depth = QueueDepth {
        len: Arc::new(AtomicIsize::new(0)),
        capacity,
    };
    (
        QueueSender {
            tx,
            depth: depth.clone(),
        },
        QueueReceiver {
            rx: Arc::new(Mutex::new(rx)),
            depth,
        },
    )
}

/// Read-only view of a queue's fill level.
#[derive(Debug, Clone)]
pub struct QueueDepth {
    // Incremented after a send completes and decremented after a receive,
    // so it can dip below zero for a moment; `len()` clamps.
    len: Arc<AtomicIsize>,
    capacity: usize,
}

impl QueueDepth {
    /// Items currently buffered.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed).clamp(0, self.capacity as isize) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Producer handle. Cheap to clone.
#[derive(Debug)]
pub struct QueueSender<T> {
    tx: mpsc::Sender<T>,
    depth: QueueDepth,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            depth: self.depth.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    /// Push an item, waiting while the queue is full.
    ///
    /// Cancel safe: dropping the future before it resolves leaves the item unsent.
    pub async fn push(&self, item: T) -> Result<(), QueueClosed> {
        self.tx.send(item).await.map_err(|_| QueueClosed)?;
        self.depth.len.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Push an item from a blocking thread, waiting while the queue is full.
    ///
    /// Must not be called from an async context.
    pub fn blocking_push(&self, item: T) -> Result<(), QueueClosed> {
        self.tx.blocking_send(item).map_err(|_| QueueClosed)?;
        self.depth.len.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn depth(&self) -> QueueDepth {
        self.depth.clone()
    }
}

/// Consumer handle. Clones share the same underlying receiver, so every
/// item is delivered to exactly one consumer.
#[derive(Debug)]
pub struct QueueReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
    depth: QueueDepth,
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
            depth: self.depth.clone(),
        }
    }
}

impl<T> QueueReceiver<T> {
    /// Wait for the next item. `None` once the queue is closed and drained.
    ///
    /// Cancel safe: an item is never lost if the future is dropped.
    pub async fn pop(&self) -> Option<T> {
        let item = self.rx.lock().await.recv().await;
        self.settle(item)
    }

    /// Blocking variant of [`pop`](Self::pop) for use outside the runtime.
    pub fn blocking_pop(&self) -> Option<T> {
        let item = self.rx.blocking_lock().blocking_recv();
        self.settle(item)
    }

    pub fn depth(&self) -> QueueDepth {
        self.depth.clone()
    }

    fn settle(&self, item: Option<T>) -> Option<T> {
        if item.is_some() {
            self.depth.len.fetch_sub(1, Ordering::Relaxed);
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let (tx, rx) = bounded(4);
        for i in 0..4 {
            tx.push(i).await.unwrap();
        }
        drop(tx);

        let mut seen = Vec::new();
        while let Some(i) = rx.pop().await {
            seen.push(i);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_push_blocks_when_full_until_slot_frees() {
        let (tx, rx) = bounded(2);
        tx.push(1).await.unwrap();
        tx.push(2).await.unwrap();
        assert_eq!(tx.depth().len(), 2);

        // Full and nobody draining: the push must wait, not drop.
        let blocked = tokio::time::timeout(Duration::from_millis(50), tx.push(3)).await;
        assert!(blocked.is_err(), "push into a full queue should wait");

        let pusher = {
            let tx = tx.clone();
            tokio::spawn(async move { tx.push(3).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pusher.is_finished());

        assert_eq!(rx.pop().await, Some(1));
        pusher.await.unwrap().unwrap();

        drop(tx);
        assert_eq!(rx.pop().await, Some(2));
        assert_eq!(rx.pop().await, Some(3));
        assert_eq!(rx.pop().await, None);
    }

    #[tokio::test]
    async fn test_each_item_delivered_once_across_consumers() {
        let (tx, rx) = bounded(16);
        let mut consumers = Vec::new();
        for _ in 0..4 {
            let rx = rx.clone();
            consumers.push(tokio::spawn(async move {
                let mut got = Vec::new();
                while let Some(i) = rx.pop().await {
                    got.push(i);
                }
                got
            }));
        }
        drop(rx);

        for i in 0..100 {
            tx.push(i).await.unwrap();
        }
        drop(tx);

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_push_after_consumers_dropped_fails() {
        let (tx, rx) = bounded::<u32>(2);
        let depth = tx.depth();
        drop(rx);

        assert_eq!(tx.push(1).await, Err(QueueClosed));
        assert!(depth.is_empty());
    }

    #[test]
    fn test_blocking_push_and_pop() {
        let (tx, rx) = bounded(2);
        let producer = std::thread::spawn(move || {
            for i in 0..10 {
                tx.blocking_push(i).unwrap();
            }
        });

        let mut seen = Vec::new();
        while let Some(i) = rx.blocking_pop() {
            seen.push(i);
        }
        producer.join().unwrap();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert!(rx.depth().is_empty());
    }

    #[tokio::test]
    async fn test_depth_tracks_len() {
        let (tx, rx) = bounded(8);
        let depth = rx.depth();
        assert_eq!(depth.capacity(), 8);

        tx.push("a").await.unwrap();
        tx.push("b").await.unwrap();
        assert_eq!(depth.len(), 2);

        rx.pop().await.unwrap();
        assert_eq!(depth.len(), 1);
    }
}
