// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background polling of the queue store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::store::QueueStore;

/// Refreshes a [`QueueStore`] on a fixed interval until dropped.
///
/// The first refresh happens immediately.
pub struct QueuePoller {
    handle: JoinHandle<()>,
    interval: Duration,
}

impl QueuePoller {
    /// Start polling. Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<QueueStore>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.invalidate().await;
            }
        });
        debug!(?interval, "queue poller started");
        Self { handle, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for QueuePoller {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("queue poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, item};
    use printfleet_core::types::QueueStatus;

    #[tokio::test]
    async fn polls_until_dropped() {
        let api = Arc::new(FakeApi::with_items(vec![item(1, QueueStatus::Pending).build()]));
        let store = Arc::new(QueueStore::new(api.clone()));

        let poller = QueuePoller::spawn(store.clone(), Duration::from_millis(10));
        assert!(poller.is_running());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(api.list_count() >= 2);
        assert!(store.snapshot().is_loaded());

        drop(poller);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_drop = api.list_count();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(api.list_count(), after_drop);
    }

    #[tokio::test]
    async fn failures_do_not_stop_polling() {
        let api = Arc::new(FakeApi::with_items(Vec::new()));
        api.fail_listing(true);
        let store = Arc::new(QueueStore::new(api.clone()));

        let poller = QueuePoller::spawn(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(api.list_count() >= 2);
        assert!(poller.is_running());
        assert!(!store.snapshot().is_loaded());
    }
}
