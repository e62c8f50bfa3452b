// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrintFleet Queue — client-side view of the fleet print queue: the backend
// API client, the snapshot store and its poller, list ordering, selection
// and bulk edit, and the mutation dispatcher behind the queue page.

pub mod classify;
pub mod client;
pub mod dispatch;
pub mod filter;
pub mod mutation;
pub mod order;
pub mod poller;
pub mod selection;
pub mod store;
pub mod viewmodel;

#[cfg(test)]
mod testing;

pub use classify::{Partition, classify};
pub use client::{HttpQueueClient, QueueApi};
pub use dispatch::Dispatcher;
pub use filter::{LocationFilter, PrinterFilter, QueueFilter, StatusFilter};
pub use mutation::{MutationIntent, MutationOutcome};
pub use order::Step;
pub use poller::QueuePoller;
pub use selection::{BulkEdit, BulkFlag, PrinterChange, Selection, TriState};
pub use store::{QueueSnapshot, QueueStore};
pub use viewmodel::{ItemActions, QueueAction, QueueView, QueueViewModel};
