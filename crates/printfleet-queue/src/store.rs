// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue snapshot store.
//
// All queue data flows one way: a fetch or mutation produces a new immutable
// `QueueSnapshot`, which replaces the previous one on a watch channel. Views
// subscribe and derive their lists from whatever snapshot is current.
//
// Every fetch takes a ticket from a generation counter. A response is only
// published if no newer fetch, filter change or optimistic update happened
// while it was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use printfleet_core::error::{FleetError, Result};
use printfleet_core::types::{Printer, QueueItem, QueueItemId, ReorderEntry};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::client::QueueApi;
use crate::filter::QueueFilter;
use crate::mutation::{self, MutationIntent, MutationOutcome};

/// One consistent view of the backend queue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    /// Items as returned by the server for `filter.query()`.
    pub items: Vec<QueueItem>,
    pub printers: Vec<Printer>,
    /// Filter in force when this snapshot was published.
    pub filter: QueueFilter,
    /// `None` until the first successful fetch.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl QueueSnapshot {
    /// Items after the client-side filters.
    pub fn visible(&self) -> Vec<QueueItem> {
        self.filter.apply(&self.items, &self.printers)
    }

    pub fn find(&self, id: QueueItemId) -> Option<&QueueItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }
}

/// Owns the current snapshot and the active filter.
pub struct QueueStore {
    api: Arc<dyn QueueApi>,
    filter: Mutex<QueueFilter>,
    generation: AtomicU64,
    tx: watch::Sender<Arc<QueueSnapshot>>,
}

impl QueueStore {
    pub fn new(api: Arc<dyn QueueApi>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(QueueSnapshot::default()));
        Self {
            api,
            filter: Mutex::new(QueueFilter::default()),
            generation: AtomicU64::new(0),
            tx,
        }
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<QueueSnapshot>> {
        self.tx.subscribe()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<QueueSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn filter(&self) -> QueueFilter {
        self.filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the filter. Fetches immediately when the server-side part
    /// changed; otherwise republishes the current items under the new filter.
    #[instrument(skip(self))]
    pub async fn set_filter(&self, filter: QueueFilter) -> Result<()> {
        let previous = {
            let mut guard = self.filter.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, filter.clone())
        };
        if previous == filter {
            return Ok(());
        }
        if previous.needs_refetch(&filter) {
            self.refresh().await
        } else {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let current = self.snapshot();
            self.publish(QueueSnapshot {
                filter,
                ..(*current).clone()
            });
            Ok(())
        }
    }

    /// Fetch the queue and printers and publish the result.
    ///
    /// On failure the previous snapshot stays in place. A response that was
    /// overtaken by a newer fetch or a filter change is dropped.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let filter = self.filter();
        let query = filter.query();

        let fetched = tokio::try_join!(self.api.list_queue(&query), self.api.list_printers());
        let (items, printers) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "queue fetch failed, keeping last snapshot");
                return Err(e);
            }
        };

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding superseded queue response");
            return Ok(());
        }
        debug!(items = items.len(), printers = printers.len(), "queue refreshed");
        self.publish(QueueSnapshot {
            items,
            printers,
            filter,
            fetched_at: Some(Utc::now()),
        });
        Ok(())
    }

    /// Refresh, logging instead of returning failures.
    pub async fn invalidate(&self) {
        // refresh() already logged the failure.
        let _ = self.refresh().await;
    }

    /// Write new positions into the current snapshot ahead of the server.
    pub fn apply_positions(&self, entries: &[ReorderEntry]) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let current = self.snapshot();
        let mut next = (*current).clone();
        for entry in entries {
            if let Some(item) = next.items.iter_mut().find(|i| i.id == entry.id) {
                item.position = entry.position;
            }
        }
        self.publish(next);
    }

    /// Run a mutation against the backend and bring the snapshot up to date.
    ///
    /// Successful mutations always refetch. Failed ones refetch only when
    /// part of the change may have been applied (sequential operations) or
    /// when an optimistic update has to be rolled back (reorder).
    #[instrument(skip(self, intent), fields(kind = intent.kind()))]
    pub async fn apply_mutation(&self, intent: MutationIntent) -> Result<MutationOutcome> {
        if let MutationIntent::Reorder(entries) = &intent {
            self.apply_positions(entries);
        }

        let snapshot = self.snapshot();
        let lookup = |id: QueueItemId| {
            snapshot
                .find(id)
                .cloned()
                .ok_or(FleetError::ItemNotFound(id))
        };

        match mutation::execute(self.api.as_ref(), &intent, lookup).await {
            Ok(outcome) => {
                info!(?outcome, "mutation applied");
                self.invalidate().await;
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, "mutation failed");
                if intent.refetch_on_failure() {
                    self.invalidate().await;
                }
                Err(e)
            }
        }
    }

    fn publish(&self, snapshot: QueueSnapshot) {
        self.tx.send_replace(Arc::new(snapshot));
    }
}
