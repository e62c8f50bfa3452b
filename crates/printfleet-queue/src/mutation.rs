// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue mutations: what the user asked for and what came back.

use printfleet_core::error::Result;
use printfleet_core::types::{QueueItem, QueueItemCreate, QueueItemId, ReorderEntry};
use tracing::{debug, info};

use crate::client::QueueApi;
use crate::selection::BulkUpdateRequest;

/// A change requested against the backend queue.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationIntent {
    Cancel(QueueItemId),
    Stop(QueueItemId),
    Remove(QueueItemId),
    /// Release a staged item.
    Start(QueueItemId),
    /// Re-create a finished item as a new pending job.
    Requeue(QueueItemId),
    /// New positions for every pending item.
    Reorder(Vec<ReorderEntry>),
    BulkUpdate(BulkUpdateRequest),
    BulkCancel(Vec<QueueItemId>),
    /// Remove the listed history items one by one.
    ClearHistory(Vec<QueueItemId>),
    BulkRequeue(Vec<QueueItemId>),
}

impl MutationIntent {
    /// Operations issued as a series of requests. A failure part way
    /// through leaves earlier requests applied.
    pub fn is_sequential(&self) -> bool {
        matches!(
            self,
            Self::BulkCancel(_) | Self::ClearHistory(_) | Self::BulkRequeue(_)
        )
    }

    /// Whether server state should be re-read after a failure.
    pub fn refetch_on_failure(&self) -> bool {
        self.is_sequential() || matches!(self, Self::Reorder(_))
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cancel(_) => "cancel",
            Self::Stop(_) => "stop",
            Self::Remove(_) => "remove",
            Self::Start(_) => "start",
            Self::Requeue(_) => "requeue",
            Self::Reorder(_) => "reorder",
            Self::BulkUpdate(_) => "bulk_update",
            Self::BulkCancel(_) => "bulk_cancel",
            Self::ClearHistory(_) => "clear_history",
            Self::BulkRequeue(_) => "bulk_requeue",
        }
    }
}

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Done,
    /// Server-supplied summary (bulk update).
    Message(String),
    /// Number of items a sequential operation touched.
    Count(usize),
}

/// Issue the requests for `intent`.
///
/// `lookup` resolves ids to items for requeueing. Sequential operations stop
/// at the first failure.
pub(crate) async fn execute(
    api: &dyn QueueApi,
    intent: &MutationIntent,
    lookup: impl Fn(QueueItemId) -> Result<QueueItem>,
) -> Result<MutationOutcome> {
    match intent {
        MutationIntent::Cancel(id) => api.cancel(*id).await.map(|_| MutationOutcome::Done),
        MutationIntent::Stop(id) => api.stop(*id).await.map(|_| MutationOutcome::Done),
        MutationIntent::Remove(id) => api.remove(*id).await.map(|_| MutationOutcome::Done),
        MutationIntent::Start(id) => api.start(*id).await.map(|_| MutationOutcome::Done),
        MutationIntent::Requeue(id) => {
            let body = QueueItemCreate::requeue_of(&lookup(*id)?);
            let created = api.create(&body).await?;
            info!(from = %id, new = %created.id, "requeued");
            Ok(MutationOutcome::Done)
        }
        MutationIntent::Reorder(entries) => {
            api.reorder(entries).await?;
            Ok(MutationOutcome::Done)
        }
        MutationIntent::BulkUpdate(request) => {
            let response = api.bulk_update(request).await?;
            Ok(MutationOutcome::Message(response.message))
        }
        MutationIntent::BulkCancel(ids) => {
            for id in ids {
                debug!(%id, "cancelling");
                api.cancel(*id).await?;
            }
            Ok(MutationOutcome::Count(ids.len()))
        }
        MutationIntent::ClearHistory(ids) => {
            for id in ids {
                debug!(%id, "removing from history");
                api.remove(*id).await?;
            }
            Ok(MutationOutcome::Count(ids.len()))
        }
        MutationIntent::BulkRequeue(ids) => {
            // Resolve everything first so a stale id fails before any request.
            let bodies = ids
                .iter()
                .map(|id| lookup(*id).map(|item| QueueItemCreate::requeue_of(&item)))
                .collect::<Result<Vec<_>>>()?;
            for body in &bodies {
                api.create(body).await?;
            }
            Ok(MutationOutcome::Count(bodies.len()))
        }
    }
}
