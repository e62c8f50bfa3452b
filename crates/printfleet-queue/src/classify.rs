// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Split a queue snapshot into the three lists the queue page shows.

use printfleet_core::types::{QueueItem, QueueStatus};

/// Active, pending and history lists. Every item lands in exactly one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Currently printing.
    pub active: Vec<QueueItem>,
    /// Waiting to print, including staged items.
    pub pending: Vec<QueueItem>,
    /// Completed, failed, skipped or cancelled.
    pub history: Vec<QueueItem>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.active.len() + self.pending.len() + self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `items` by status, preserving input order within each list.
pub fn classify(items: impl IntoIterator<Item = QueueItem>) -> Partition {
    let mut partition = Partition::default();
    for item in items {
        match item.status {
            QueueStatus::Printing => partition.active.push(item),
            QueueStatus::Pending => partition.pending.push(item),
            QueueStatus::Completed
            | QueueStatus::Failed
            | QueueStatus::Skipped
            | QueueStatus::Cancelled => partition.history.push(item),
        }
    }
    partition
}
