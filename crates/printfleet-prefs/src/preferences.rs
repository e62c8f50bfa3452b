// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sort preferences for the pending and history lists.

use std::sync::Arc;

use printfleet_core::error::Result;
use printfleet_core::types::{HistorySortField, PendingSortField, SortDirection};
use tracing::warn;

use crate::store::PreferenceStore;

pub const PENDING_SORT_FIELD_KEY: &str = "queue.pending.sort_field";
pub const PENDING_SORT_DIR_KEY: &str = "queue.pending.sort_dir";
pub const HISTORY_SORT_FIELD_KEY: &str = "queue.history.sort_field";
pub const HISTORY_SORT_DIR_KEY: &str = "queue.history.sort_dir";

/// Field and direction for one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortPreference<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl Default for SortPreference<PendingSortField> {
    fn default() -> Self {
        Self {
            field: PendingSortField::Position,
            direction: SortDirection::Asc,
        }
    }
}

impl Default for SortPreference<HistorySortField> {
    fn default() -> Self {
        Self {
            field: HistorySortField::Date,
            direction: SortDirection::Desc,
        }
    }
}

/// Sort preferences, written through to a [`PreferenceStore`] on change.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    pending: SortPreference<PendingSortField>,
    history: SortPreference<HistorySortField>,
}

impl Preferences {
    /// Load preferences, falling back to defaults for missing or unreadable
    /// values.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let pending_default = SortPreference::<PendingSortField>::default();
        let history_default = SortPreference::<HistorySortField>::default();

        let pending = SortPreference {
            field: read(&*store, PENDING_SORT_FIELD_KEY)
                .and_then(|v| PendingSortField::from_keyword(&v))
                .unwrap_or(pending_default.field),
            direction: read(&*store, PENDING_SORT_DIR_KEY)
                .and_then(|v| SortDirection::from_keyword(&v))
                .unwrap_or(pending_default.direction),
        };
        let history = SortPreference {
            field: read(&*store, HISTORY_SORT_FIELD_KEY)
                .and_then(|v| HistorySortField::from_keyword(&v))
                .unwrap_or(history_default.field),
            direction: read(&*store, HISTORY_SORT_DIR_KEY)
                .and_then(|v| SortDirection::from_keyword(&v))
                .unwrap_or(history_default.direction),
        };

        Self {
            store,
            pending,
            history,
        }
    }

    pub fn pending(&self) -> SortPreference<PendingSortField> {
        self.pending
    }

    pub fn history(&self) -> SortPreference<HistorySortField> {
        self.history
    }

    /// The in-memory value changes even if persisting fails.
    pub fn set_pending(&mut self, pref: SortPreference<PendingSortField>) -> Result<()> {
        self.pending = pref;
        self.store.set(PENDING_SORT_FIELD_KEY, pref.field.as_str())?;
        self.store.set(PENDING_SORT_DIR_KEY, pref.direction.as_str())
    }

    pub fn set_history(&mut self, pref: SortPreference<HistorySortField>) -> Result<()> {
        self.history = pref;
        self.store.set(HISTORY_SORT_FIELD_KEY, pref.field.as_str())?;
        self.store.set(HISTORY_SORT_DIR_KEY, pref.direction.as_str())
    }

    /// The backing store, for other per-view state such as layouts.
    pub fn store(&self) -> Arc<dyn PreferenceStore> {
        Arc::clone(&self.store)
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("pending", &self.pending)
            .field("history", &self.history)
            .finish()
    }
}

fn read(store: &dyn PreferenceStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "failed to read preference");
            None
        }
    }
}
