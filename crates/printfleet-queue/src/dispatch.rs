// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mutation dispatcher: runs intents through the store and reports every
// outcome as a toast.

use std::sync::Arc;

use printfleet_core::error::{FleetError, Result};
use printfleet_core::toast::{Toast, ToastSink, humanize_error};
use tracing::instrument;

use crate::mutation::{MutationIntent, MutationOutcome};
use crate::store::QueueStore;

/// Turns user actions into backend mutations and toasts.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<QueueStore>,
    toasts: Arc<dyn ToastSink>,
}

impl Dispatcher {
    pub fn new(store: Arc<QueueStore>, toasts: Arc<dyn ToastSink>) -> Self {
        Self { store, toasts }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    /// Apply `intent` and show a toast describing the result.
    ///
    /// The result is returned as well so callers can update local state
    /// (e.g. clear a selection) on success.
    #[instrument(skip(self, intent), fields(kind = intent.kind()))]
    pub async fn dispatch(&self, intent: MutationIntent) -> Result<MutationOutcome> {
        let result = self.store.apply_mutation(intent.clone()).await;
        let toast = match &result {
            Ok(outcome) => Toast::success(success_message(&intent, outcome)),
            Err(e) => Toast::error(failure_message(&intent, e)),
        };
        self.toasts.show_toast(toast);
        result
    }

    /// Report a failure caught before any request was made.
    pub fn reject(&self, err: &FleetError) {
        self.toasts.show_toast(Toast::error(humanize_error(err)));
    }
}

fn success_message(intent: &MutationIntent, outcome: &MutationOutcome) -> String {
    let count = match outcome {
        MutationOutcome::Count(n) => *n,
        _ => 0,
    };
    match intent {
        MutationIntent::Cancel(_) => "Queue item cancelled".into(),
        MutationIntent::Stop(_) => "Print stopped".into(),
        MutationIntent::Remove(_) => "Queue item removed".into(),
        MutationIntent::Start(_) => "Print released to queue".into(),
        MutationIntent::Requeue(_) => "Print added to queue".into(),
        MutationIntent::Reorder(_) => "Queue reordered".into(),
        MutationIntent::BulkUpdate(_) => match outcome {
            MutationOutcome::Message(m) if !m.is_empty() => m.clone(),
            _ => "Queue items updated".into(),
        },
        MutationIntent::BulkCancel(_) => format!("Cancelled {count} items"),
        MutationIntent::ClearHistory(_) => format!("Cleared {count} history items"),
        MutationIntent::BulkRequeue(_) => format!("Requeued {count} items"),
    }
}

fn failure_message(intent: &MutationIntent, err: &FleetError) -> String {
    match intent {
        MutationIntent::Cancel(_) => "Failed to cancel queue item".into(),
        MutationIntent::Stop(_) => "Failed to stop print".into(),
        MutationIntent::Remove(_) => "Failed to remove queue item".into(),
        MutationIntent::Start(_) => "Failed to start print".into(),
        MutationIntent::Requeue(_) => "Failed to requeue print".into(),
        MutationIntent::Reorder(_) => "Failed to reorder queue".into(),
        MutationIntent::BulkUpdate(_) => "Failed to update queue items".into(),
        MutationIntent::BulkCancel(_) => "Failed to cancel selected items".into(),
        MutationIntent::ClearHistory(_) => "Failed to clear history".into(),
        MutationIntent::BulkRequeue(_) => humanize_error(err),
    }
}
