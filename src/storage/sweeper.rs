//! Background Expiry Sweeper
//!
//! This module implements the background task that periodically scans the
//! store's expiry index and evicts expired keys.
//!
//! ## Design
//!
//! The sweeper runs as a Tokio task and:
//! 1. Sleeps for the configured period
//! 2. Wakes up and runs one sweep cycle over the expiry index
//! 3. Logs how many keys were evicted
//!
//! Each cycle acquires the store's mutex once, so a sweep competes with
//! connection tasks exactly like any other store operation. Eviction is
//! "no earlier than" the deadline: wake-up jitter only ever delays it.
//!
//! The task is owned by the [`Sweeper`] handle and is stopped through a
//! `watch` channel when the handle is dropped, rather than rescheduling
//! itself forever.

use crate::storage::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct Sweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
}

impl Sweeper {
    /// Starts the expiry sweeper as a background task.
    ///
    /// # Arguments
    ///
    /// * `store` - The store to sweep
    /// * `period` - Time between sweep cycles
    ///
    /// # Returns
    ///
    /// Returns a handle that can be used to stop the sweeper.
    /// The sweeper will automatically stop when the handle is dropped.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use stashkv::storage::{Store, Sweeper};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let store = Arc::new(Store::new());
    /// let sweeper = Sweeper::start(store, Duration::from_secs(5));
    ///
    /// // Sweeper runs in the background...
    ///
    /// // Dropping the sweeper will stop it
    /// drop(sweeper);
    /// ```
    pub fn start(store: Arc<Store>, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(store, period, shutdown_rx));

        info!(period_secs = period.as_secs(), "Expiry sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the expiry sweeper.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        info!("Expiry sweeper stopped");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop(store: Arc<Store>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        // Wait for the period or for a shutdown signal
        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let evicted = store.sweep_expired();

        if evicted > 0 {
            debug!(
                evicted = evicted,
                keys_remaining = store.len(),
                "Expired keys evicted"
            );
        } else {
            trace!(pending = store.expiry_count(), "Sweep cycle found nothing to evict");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_sweeper_evicts_expired_keys() {
        let store = Arc::new(Store::new());

        for i in 0..10 {
            let key = format!("key{}", i);
            store.set(&key, Bytes::from("value"));
            store.expire(&key, -1);
        }
        store.set("persistent", Bytes::from("value"));

        assert_eq!(store.len(), 11);

        let _sweeper = Sweeper::start(Arc::clone(&store), Duration::from_millis(10));

        // Wait for at least one sweep cycle
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.len(), 1);
        assert!(store.has_key("persistent"));
        assert_eq!(store.expiry_count(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_drop() {
        let store = Arc::new(Store::new());

        {
            let _sweeper = Sweeper::start(Arc::clone(&store), Duration::from_millis(10));
            tokio::time::sleep(Duration::from_millis(30)).await;
            // Sweeper is dropped here
        }

        // Expire a key after the sweeper is stopped
        store.set("key", Bytes::from("value"));
        store.expire("key", -1);

        tokio::time::sleep(Duration::from_millis(50)).await;

        // Nothing sweeps it any more
        assert!(store.has_key("key"));
        assert_eq!(store.expiry_count(), 1);
    }
}
