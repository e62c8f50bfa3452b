// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection of pending items and the tri-state bulk edit patch.
//
// A bulk edit only sends the fields the user actually touched. Each field is
// `Unchanged` until set, and unchanged fields never reach the wire.

use std::collections::BTreeSet;

use printfleet_core::error::{FleetError, Result};
use printfleet_core::types::{PrinterId, QueueItem, QueueItemId};
use serde::{Deserialize, Serialize};

/// Identifiers of the selected pending items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<QueueItemId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: QueueItemId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Select every pending item, or clear if all are already selected.
    pub fn toggle_all(&mut self, pending: &[QueueItem]) {
        let all: BTreeSet<QueueItemId> = pending.iter().map(|i| i.id).collect();
        if !all.is_empty() && all.is_subset(&self.ids) {
            self.ids.clear();
        } else {
            self.ids = all;
        }
    }

    /// Whether every item in `pending` is selected.
    pub fn all_selected(&self, pending: &[QueueItem]) -> bool {
        !pending.is_empty() && pending.iter().all(|i| self.ids.contains(&i.id))
    }

    /// Drop ids that are no longer pending. Returns how many were dropped.
    pub fn prune(&mut self, pending: &[QueueItem]) -> usize {
        let before = self.ids.len();
        let live: BTreeSet<QueueItemId> = pending.iter().map(|i| i.id).collect();
        self.ids.retain(|id| live.contains(id));
        before - self.ids.len()
    }

    pub fn contains(&self, id: QueueItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<QueueItemId> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// One boolean field of a bulk edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unchanged,
    Set(bool),
}

impl TriState {
    /// Unchanged → on → off → unchanged.
    pub fn cycled(self) -> Self {
        match self {
            Self::Unchanged => Self::Set(true),
            Self::Set(true) => Self::Set(false),
            Self::Set(false) => Self::Unchanged,
        }
    }

    pub fn value(self) -> Option<bool> {
        match self {
            Self::Unchanged => None,
            Self::Set(v) => Some(v),
        }
    }
}

/// Printer reassignment in a bulk edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrinterChange {
    #[default]
    Unchanged,
    /// Clear the printer assignment.
    Unassigned,
    Printer(PrinterId),
}

/// The boolean options a bulk edit can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkFlag {
    BedLevelling,
    FlowCali,
    VibrationCali,
    LayerInspect,
    Timelapse,
    UseAms,
    RequirePreviousSuccess,
    AutoOffAfter,
    ManualStart,
}

impl BulkFlag {
    pub const ALL: [BulkFlag; 9] = [
        Self::BedLevelling,
        Self::FlowCali,
        Self::VibrationCali,
        Self::LayerInspect,
        Self::Timelapse,
        Self::UseAms,
        Self::RequirePreviousSuccess,
        Self::AutoOffAfter,
        Self::ManualStart,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::BedLevelling => "Bed levelling",
            Self::FlowCali => "Flow calibration",
            Self::VibrationCali => "Vibration calibration",
            Self::LayerInspect => "First layer inspection",
            Self::Timelapse => "Timelapse",
            Self::UseAms => "Use AMS",
            Self::RequirePreviousSuccess => "Require previous success",
            Self::AutoOffAfter => "Power off when done",
            Self::ManualStart => "Staged (manual start)",
        }
    }
}

/// Pending bulk edit form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkEdit {
    pub bed_levelling: TriState,
    pub flow_cali: TriState,
    pub vibration_cali: TriState,
    pub layer_inspect: TriState,
    pub timelapse: TriState,
    pub use_ams: TriState,
    pub require_previous_success: TriState,
    pub auto_off_after: TriState,
    pub manual_start: TriState,
    pub printer: PrinterChange,
}

impl BulkEdit {
    pub fn get(&self, flag: BulkFlag) -> TriState {
        match flag {
            BulkFlag::BedLevelling => self.bed_levelling,
            BulkFlag::FlowCali => self.flow_cali,
            BulkFlag::VibrationCali => self.vibration_cali,
            BulkFlag::LayerInspect => self.layer_inspect,
            BulkFlag::Timelapse => self.timelapse,
            BulkFlag::UseAms => self.use_ams,
            BulkFlag::RequirePreviousSuccess => self.require_previous_success,
            BulkFlag::AutoOffAfter => self.auto_off_after,
            BulkFlag::ManualStart => self.manual_start,
        }
    }

    pub fn set(&mut self, flag: BulkFlag, state: TriState) {
        let slot = match flag {
            BulkFlag::BedLevelling => &mut self.bed_levelling,
            BulkFlag::FlowCali => &mut self.flow_cali,
            BulkFlag::VibrationCali => &mut self.vibration_cali,
            BulkFlag::LayerInspect => &mut self.layer_inspect,
            BulkFlag::Timelapse => &mut self.timelapse,
            BulkFlag::UseAms => &mut self.use_ams,
            BulkFlag::RequirePreviousSuccess => &mut self.require_previous_success,
            BulkFlag::AutoOffAfter => &mut self.auto_off_after,
            BulkFlag::ManualStart => &mut self.manual_start,
        };
        *slot = state;
    }

    /// True when no field deviates from `Unchanged`.
    pub fn is_empty(&self) -> bool {
        self.printer == PrinterChange::Unchanged
            && BulkFlag::ALL
                .iter()
                .all(|flag| self.get(*flag) == TriState::Unchanged)
    }

    /// Build the request body. Empty patches and empty selections are
    /// rejected so no request is ever made for them.
    pub fn request(&self, selection: &Selection) -> Result<BulkUpdateRequest> {
        if selection.is_empty() {
            return Err(FleetError::EmptySelection);
        }
        if self.is_empty() {
            return Err(FleetError::EmptyPatch);
        }
        Ok(BulkUpdateRequest {
            item_ids: selection.ids(),
            printer_id: match self.printer {
                PrinterChange::Unchanged => None,
                PrinterChange::Unassigned => Some(None),
                PrinterChange::Printer(id) => Some(Some(id)),
            },
            bed_levelling: self.bed_levelling.value(),
            flow_cali: self.flow_cali.value(),
            vibration_cali: self.vibration_cali.value(),
            layer_inspect: self.layer_inspect.value(),
            timelapse: self.timelapse.value(),
            use_ams: self.use_ams.value(),
            require_previous_success: self.require_previous_success.value(),
            auto_off_after: self.auto_off_after.value(),
            manual_start: self.manual_start.value(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Body of `POST /queue/bulk-update`. Absent fields are left untouched by
/// the server; `printer_id: null` clears the assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkUpdateRequest {
    pub item_ids: Vec<QueueItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_id: Option<Option<PrinterId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_levelling: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_cali: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibration_cali: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_inspect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timelapse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ams: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_previous_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_off_after: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_start: Option<bool>,
}

/// Response of `POST /queue/bulk-update`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BulkUpdateResponse {
    #[serde(default)]
    pub message: String,
}
