// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrintFleet Prefs — client-side state that outlives a session: list sort
// preferences and dashboard widget layouts, kept in a small SQLite store.

pub mod layout;
pub mod preferences;
pub mod store;

pub use layout::{DashboardLayout, LayoutState, WidgetManifest, WidgetSize, WidgetSpec};
pub use preferences::{Preferences, SortPreference};
pub use store::{MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore};
