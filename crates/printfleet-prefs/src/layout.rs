// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dashboard widget layout: order, visibility and size per widget.
//
// Stored as JSON under a caller-supplied key:
//   {"order": ["printers", ...], "hidden": ["stats"], "sizes": {"queue": 2}}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use printfleet_core::error::{FleetError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::PreferenceStore;

/// Width class of a widget, in quarters of the dashboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WidgetSize {
    Quarter,
    Half,
    Full,
}

impl WidgetSize {
    /// Next size when the user clicks the resize control.
    pub fn cycled(self) -> Self {
        match self {
            Self::Quarter => Self::Half,
            Self::Half => Self::Full,
            Self::Full => Self::Quarter,
        }
    }

    pub fn quarters(self) -> u8 {
        u8::from(self)
    }
}

impl From<WidgetSize> for u8 {
    fn from(size: WidgetSize) -> Self {
        match size {
            WidgetSize::Quarter => 1,
            WidgetSize::Half => 2,
            WidgetSize::Full => 4,
        }
    }
}

impl TryFrom<u8> for WidgetSize {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Quarter),
            2 => Ok(Self::Half),
            4 => Ok(Self::Full),
            other => Err(format!("invalid widget size {other}")),
        }
    }
}

/// Static description of one widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSpec {
    pub id: String,
    pub title: String,
    pub default_size: WidgetSize,
    pub default_visible: bool,
}

impl WidgetSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, default_size: WidgetSize) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            default_size,
            default_visible: true,
        }
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.default_visible = false;
        self
    }
}

/// The set of widgets a view can show, in default order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetManifest {
    widgets: Vec<WidgetSpec>,
}

impl WidgetManifest {
    pub fn new(widgets: Vec<WidgetSpec>) -> Self {
        Self { widgets }
    }

    pub fn get(&self, id: &str) -> Option<&WidgetSpec> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetSpec> {
        self.widgets.iter()
    }
}

/// Persisted layout of one view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub order: Vec<String>,
    #[serde(default)]
    pub hidden: BTreeSet<String>,
    #[serde(default)]
    pub sizes: BTreeMap<String, WidgetSize>,
}

impl LayoutState {
    pub fn defaults(manifest: &WidgetManifest) -> Self {
        Self {
            order: manifest.iter().map(|w| w.id.clone()).collect(),
            hidden: manifest
                .iter()
                .filter(|w| !w.default_visible)
                .map(|w| w.id.clone())
                .collect(),
            sizes: manifest
                .iter()
                .map(|w| (w.id.clone(), w.default_size))
                .collect(),
        }
    }

    /// Drop widgets the manifest no longer knows and append new ones.
    pub fn reconcile(mut self, manifest: &WidgetManifest) -> Self {
        let mut seen = BTreeSet::new();
        self.order
            .retain(|id| manifest.get(id).is_some() && seen.insert(id.clone()));
        for spec in manifest.iter() {
            if !seen.contains(&spec.id) {
                self.order.push(spec.id.clone());
                if !spec.default_visible {
                    self.hidden.insert(spec.id.clone());
                }
            }
        }
        self.hidden.retain(|id| manifest.get(id).is_some());
        self.sizes.retain(|id, _| manifest.get(id).is_some());
        for spec in manifest.iter() {
            self.sizes
                .entry(spec.id.clone())
                .or_insert(spec.default_size);
        }
        self
    }

    /// Move `active` to the index currently held by `over`.
    pub fn move_widget(&mut self, active: &str, over: &str) -> bool {
        let (Some(from), Some(to)) = (
            self.order.iter().position(|id| id == active),
            self.order.iter().position(|id| id == over),
        ) else {
            return false;
        };
        if from == to {
            return false;
        }
        let id = self.order.remove(from);
        self.order.insert(to, id);
        true
    }

    pub fn toggle_visibility(&mut self, id: &str) {
        if !self.hidden.remove(id) {
            self.hidden.insert(id.to_string());
        }
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    pub fn size_of(&self, id: &str) -> WidgetSize {
        self.sizes.get(id).copied().unwrap_or(WidgetSize::Half)
    }

    pub fn cycle_size(&mut self, id: &str) -> WidgetSize {
        let next = self.size_of(id).cycled();
        self.sizes.insert(id.to_string(), next);
        next
    }

    /// Visible widget ids in display order.
    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(|id| !self.hidden.contains(*id))
            .map(String::as_str)
    }
}

/// A view's layout bound to its storage key. Every change is saved.
pub struct DashboardLayout {
    key: String,
    manifest: WidgetManifest,
    state: LayoutState,
    store: Arc<dyn PreferenceStore>,
}

impl DashboardLayout {
    /// Load the layout stored under `key`, or the manifest defaults.
    pub fn load(
        store: Arc<dyn PreferenceStore>,
        key: impl Into<String>,
        manifest: WidgetManifest,
    ) -> Self {
        let key = key.into();
        let stored = match store.get(&key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read layout");
                None
            }
        };
        let state = match stored.map(|raw| serde_json::from_str::<LayoutState>(&raw)) {
            Some(Ok(state)) => state.reconcile(&manifest),
            Some(Err(e)) => {
                warn!(key = %key, error = %e, "stored layout is invalid, using defaults");
                LayoutState::defaults(&manifest)
            }
            None => LayoutState::defaults(&manifest),
        };
        debug!(key = %key, widgets = state.order.len(), "layout loaded");
        Self {
            key,
            manifest,
            state,
            store,
        }
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn manifest(&self) -> &WidgetManifest {
        &self.manifest
    }

    pub fn move_widget(&mut self, active: &str, over: &str) -> Result<()> {
        if self.state.move_widget(active, over) {
            self.save()?;
        }
        Ok(())
    }

    pub fn toggle_visibility(&mut self, id: &str) -> Result<()> {
        self.ensure_known(id)?;
        self.state.toggle_visibility(id);
        self.save()
    }

    pub fn cycle_size(&mut self, id: &str) -> Result<WidgetSize> {
        self.ensure_known(id)?;
        let size = self.state.cycle_size(id);
        self.save()?;
        Ok(size)
    }

    /// Restore manifest defaults and forget the stored layout.
    pub fn reset(&mut self) -> Result<()> {
        self.state = LayoutState::defaults(&self.manifest);
        self.store.remove(&self.key)
    }

    fn ensure_known(&self, id: &str) -> Result<()> {
        match self.manifest.get(id) {
            Some(_) => Ok(()),
            None => Err(FleetError::UnknownWidget(id.to_string())),
        }
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.state)?;
        self.store.set(&self.key, &json)
    }
}
