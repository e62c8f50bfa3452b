// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue page view model.
//
// Combines the snapshot store, sort preferences, selection and bulk edit
// state into what the queue page renders, and turns page actions into
// dispatched mutations.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use printfleet_core::error::{FleetError, Result};
use printfleet_core::permissions::{Action, Permission, PermissionGate};
use printfleet_core::types::{
    HistorySortField, PendingSortField, Printer, QueueItem, QueueItemId, QueueStatus,
    ReorderEntry, SortDirection,
};
use printfleet_prefs::{Preferences, SortPreference};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::dispatch::Dispatcher;
use crate::filter::{QueueFilter, known_locations};
use crate::mutation::{MutationIntent, MutationOutcome};
use crate::order::{self, Step, TimeContext};
use crate::selection::{BulkEdit, BulkFlag, PrinterChange, Selection, TriState};
use crate::store::QueueStore;

/// Resource name passed to [`PermissionGate::can_modify`].
const QUEUE_RESOURCE: &str = "queue";

/// Everything the queue page draws for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueView {
    pub active: Vec<QueueItem>,
    /// Sorted by the pending sort preference.
    pub pending: Vec<QueueItem>,
    /// Sorted by the history sort preference.
    pub history: Vec<QueueItem>,
    pub printers: Vec<Printer>,
    pub locations: Vec<String>,
    pub filter: QueueFilter,
    pub pending_sort: SortPreference<PendingSortField>,
    pub history_sort: SortPreference<HistorySortField>,
    pub drag_enabled: bool,
    pub selected: Vec<QueueItemId>,
    pub all_selected: bool,
    /// Current bulk edit form.
    pub bulk_edit: BulkEdit,
    pub can_bulk_edit: bool,
    /// Row actions for every listed item.
    pub actions: BTreeMap<QueueItemId, ItemActions>,
    pub loaded: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl QueueView {
    pub fn actions(&self, id: QueueItemId) -> ItemActions {
        self.actions.get(&id).copied().unwrap_or_default()
    }

    pub fn is_selected(&self, id: QueueItemId) -> bool {
        self.selected.contains(&id)
    }
}

/// Which row actions to offer for an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemActions {
    pub cancel: bool,
    pub start: bool,
    pub stop: bool,
    pub remove: bool,
    pub requeue: bool,
    pub reorder: bool,
    /// May be added to the bulk edit selection.
    pub select: bool,
}

/// Everything the queue page can ask the view model to do.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueAction {
    SetFilter(QueueFilter),
    SortPending(PendingSortField),
    SortHistory(HistorySortField),
    Cancel(QueueItemId),
    Stop(QueueItemId),
    Start(QueueItemId),
    Remove(QueueItemId),
    Requeue(QueueItemId),
    DropOnto { dragged: QueueItemId, over: QueueItemId },
    Move(QueueItemId, Step),
    ToggleSelected(QueueItemId),
    ToggleAll,
    /// Clears the selection and the bulk edit form.
    ClearSelection,
    SetFlag(BulkFlag, TriState),
    SetPrinterChange(PrinterChange),
    SubmitBulkEdit,
    BulkCancel,
    ClearHistory,
    BulkRequeue(Vec<QueueItemId>),
}

/// The part of a [`QueueAction`] that runs after the view model is unlocked.
enum Followup {
    Done,
    Filter(QueueFilter),
    Mutate(MutationIntent, AfterSuccess),
}

impl Followup {
    fn send(intent: MutationIntent) -> Self {
        Self::Mutate(intent, AfterSuccess::Keep)
    }

    fn maybe(intent: Option<MutationIntent>) -> Self {
        intent.map_or(Self::Done, Self::send)
    }
}

/// Local state to reset once a mutation has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterSuccess {
    Keep,
    ClearSelection,
    /// Selection and bulk edit form.
    ClearForm,
}

/// State and actions behind the queue page.
pub struct QueueViewModel {
    dispatcher: Dispatcher,
    preferences: Preferences,
    permissions: Arc<dyn PermissionGate>,
    horizon: Option<chrono::Duration>,
    selection: Selection,
    bulk_edit: BulkEdit,
}

impl QueueViewModel {
    pub fn new(
        dispatcher: Dispatcher,
        preferences: Preferences,
        permissions: Arc<dyn PermissionGate>,
        horizon: Option<chrono::Duration>,
    ) -> Self {
        Self {
            dispatcher,
            preferences,
            permissions,
            horizon,
            selection: Selection::new(),
            bulk_edit: BulkEdit::default(),
        }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        self.dispatcher.store()
    }

    /// Build the current view. Selected ids that are no longer pending are
    /// dropped from the selection.
    pub fn view(&mut self, now: DateTime<Utc>) -> QueueView {
        let snapshot = self.store().snapshot();
        let mut parts = classify(snapshot.visible());

        let pending_sort = self.preferences.pending();
        let history_sort = self.preferences.history();
        let time = TimeContext::new(now, self.horizon);
        order::sort_pending(
            &mut parts.pending,
            pending_sort.field,
            pending_sort.direction,
            &time,
        );
        order::sort_history(&mut parts.history, history_sort.field, history_sort.direction);

        let dropped = self.selection.prune(&parts.pending);
        if dropped > 0 {
            debug!(dropped, "pruned selection");
        }

        let actions = parts
            .active
            .iter()
            .chain(&parts.pending)
            .chain(&parts.history)
            .map(|item| (item.id, self.actions_for(item)))
            .collect();

        QueueView {
            all_selected: self.selection.all_selected(&parts.pending),
            selected: self.selection.ids(),
            bulk_edit: self.bulk_edit,
            can_bulk_edit: self.can_bulk_edit(),
            actions,
            active: parts.active,
            pending: parts.pending,
            history: parts.history,
            locations: known_locations(&snapshot.printers),
            printers: snapshot.printers.clone(),
            filter: snapshot.filter.clone(),
            pending_sort,
            history_sort,
            drag_enabled: self.drag_enabled(),
            loaded: snapshot.is_loaded(),
            fetched_at: snapshot.fetched_at,
        }
    }

    // -- Filters --

    /// Change the filter. Fetch failures are logged by the store and leave
    /// the previous items on screen.
    pub async fn set_filter(&self, filter: QueueFilter) {
        apply_filter(&self.dispatcher, filter).await;
    }

    // -- Sorting --

    pub fn pending_sort(&self) -> SortPreference<PendingSortField> {
        self.preferences.pending()
    }

    pub fn history_sort(&self) -> SortPreference<HistorySortField> {
        self.preferences.history()
    }

    pub fn set_pending_sort(&mut self, pref: SortPreference<PendingSortField>) {
        if let Err(e) = self.preferences.set_pending(pref) {
            warn!(error = %e, "failed to persist pending sort");
        }
    }

    pub fn set_history_sort(&mut self, pref: SortPreference<HistorySortField>) {
        if let Err(e) = self.preferences.set_history(pref) {
            warn!(error = %e, "failed to persist history sort");
        }
    }

    /// Header click: the same field flips direction, a new field starts
    /// ascending.
    pub fn sort_pending_by(&mut self, field: PendingSortField) {
        let current = self.preferences.pending();
        let direction = if current.field == field {
            current.direction.toggled()
        } else {
            SortDirection::Asc
        };
        self.set_pending_sort(SortPreference { field, direction });
    }

    /// Like [`sort_pending_by`](Self::sort_pending_by); a new `date` sort
    /// starts newest first.
    pub fn sort_history_by(&mut self, field: HistorySortField) {
        let current = self.preferences.history();
        let direction = if current.field == field {
            current.direction.toggled()
        } else if field == HistorySortField::Date {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.set_history_sort(SortPreference { field, direction });
    }

    // -- Reordering --

    pub fn drag_enabled(&self) -> bool {
        order::drag_enabled(self.preferences.pending().field)
            && self.permissions.has_permission(Permission::QueueReorder)
    }

    /// Finish a drag of `dragged` onto the row holding `over`.
    pub async fn commit_drag(
        &mut self,
        dragged: QueueItemId,
        over: QueueItemId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let intent = self.drag_intent(dragged, over, now)?;
        self.dispatch_reorder(intent).await
    }

    /// Keyboard reorder: move `id` one row.
    pub async fn move_item(
        &mut self,
        id: QueueItemId,
        step: Step,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let intent = self.step_intent(id, step, now)?;
        self.dispatch_reorder(intent).await
    }

    fn drag_intent(
        &mut self,
        dragged: QueueItemId,
        over: QueueItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<MutationIntent>> {
        let (direction, queue, visible) = self.reorder_rows(now)?;
        self.reorder_intent(order::plan_drop(&queue, &visible, dragged, over, direction))
    }

    fn step_intent(
        &mut self,
        id: QueueItemId,
        step: Step,
        now: DateTime<Utc>,
    ) -> Result<Option<MutationIntent>> {
        let (direction, queue, visible) = self.reorder_rows(now)?;
        self.reorder_intent(order::plan_step(&queue, &visible, id, step, direction))
    }

    /// Every known pending item in queue order, and the pending rows on
    /// screen in the same order.
    fn reorder_rows(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<(SortDirection, Vec<QueueItem>, Vec<QueueItem>)> {
        let direction = self.reorder_direction()?;
        let visible = self.view(now).pending;
        let mut queue = classify(self.store().snapshot().items.iter().cloned()).pending;
        let time = TimeContext::new(now, self.horizon);
        order::sort_pending(&mut queue, PendingSortField::Position, direction, &time);
        Ok((direction, queue, visible))
    }

    fn reorder_direction(&self) -> Result<SortDirection> {
        if self.drag_enabled() {
            return Ok(self.preferences.pending().direction);
        }
        let err = FleetError::ReorderUnavailable(format!(
            "pending list is sorted by {}",
            self.preferences.pending().field.as_str()
        ));
        self.dispatcher.reject(&err);
        Err(err)
    }

    fn reorder_intent(
        &self,
        plan: Result<Option<Vec<ReorderEntry>>>,
    ) -> Result<Option<MutationIntent>> {
        plan.map(|entries| entries.map(MutationIntent::Reorder))
            .inspect_err(|e| self.dispatcher.reject(e))
    }

    async fn dispatch_reorder(&self, intent: Option<MutationIntent>) -> Result<()> {
        if let Some(intent) = intent {
            self.dispatcher.dispatch(intent).await?;
        }
        Ok(())
    }

    // -- Selection and bulk edit --

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toggle_selected(&mut self, id: QueueItemId) {
        self.selection.toggle(id);
    }

    pub fn toggle_select_all(&mut self, now: DateTime<Utc>) {
        let pending = self.view(now).pending;
        self.selection.toggle_all(&pending);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn bulk_edit(&self) -> &BulkEdit {
        &self.bulk_edit
    }

    pub fn bulk_edit_mut(&mut self) -> &mut BulkEdit {
        &mut self.bulk_edit
    }

    /// Send the bulk edit for the selected items. On success the selection
    /// and the form are cleared; on failure both are kept.
    pub async fn submit_bulk_edit(&mut self) -> Result<MutationOutcome> {
        let intent = self.bulk_edit_intent()?;
        let outcome = self.dispatcher.dispatch(intent).await?;
        self.settle(AfterSuccess::ClearForm);
        Ok(outcome)
    }

    /// Cancel every selected item, one request at a time.
    pub async fn bulk_cancel(&mut self) -> Result<MutationOutcome> {
        let intent = self.bulk_cancel_intent()?;
        let outcome = self.dispatcher.dispatch(intent).await?;
        self.settle(AfterSuccess::ClearSelection);
        Ok(outcome)
    }

    fn bulk_edit_intent(&self) -> Result<MutationIntent> {
        self.bulk_edit
            .request(&self.selection)
            .map(MutationIntent::BulkUpdate)
            .inspect_err(|e| self.dispatcher.reject(e))
    }

    fn bulk_cancel_intent(&self) -> Result<MutationIntent> {
        if self.selection.is_empty() {
            let err = FleetError::EmptySelection;
            self.dispatcher.reject(&err);
            return Err(err);
        }
        Ok(MutationIntent::BulkCancel(self.selection.ids()))
    }

    fn settle(&mut self, after: AfterSuccess) {
        match after {
            AfterSuccess::Keep => {}
            AfterSuccess::ClearSelection => self.selection.clear(),
            AfterSuccess::ClearForm => {
                self.selection.clear();
                self.bulk_edit.reset();
            }
        }
    }

    // -- Single-item actions --

    pub async fn cancel(&self, id: QueueItemId) -> Result<MutationOutcome> {
        self.dispatcher.dispatch(MutationIntent::Cancel(id)).await
    }

    pub async fn stop(&self, id: QueueItemId) -> Result<MutationOutcome> {
        self.dispatcher.dispatch(MutationIntent::Stop(id)).await
    }

    pub async fn start(&self, id: QueueItemId) -> Result<MutationOutcome> {
        self.dispatcher.dispatch(MutationIntent::Start(id)).await
    }

    pub async fn remove(&self, id: QueueItemId) -> Result<MutationOutcome> {
        self.dispatcher.dispatch(MutationIntent::Remove(id)).await
    }

    pub async fn requeue(&self, id: QueueItemId) -> Result<MutationOutcome> {
        self.dispatcher.dispatch(MutationIntent::Requeue(id)).await
    }

    // -- History --

    /// Remove every history item currently shown. Nothing is sent when the
    /// history list is empty.
    pub async fn clear_history(&mut self, now: DateTime<Utc>) -> Result<MutationOutcome> {
        match self.clear_history_intent(now) {
            Some(intent) => self.dispatcher.dispatch(intent).await,
            None => Ok(MutationOutcome::Count(0)),
        }
    }

    pub async fn bulk_requeue(&self, ids: Vec<QueueItemId>) -> Result<MutationOutcome> {
        let intent = self.bulk_requeue_intent(ids)?;
        self.dispatcher.dispatch(intent).await
    }

    fn clear_history_intent(&mut self, now: DateTime<Utc>) -> Option<MutationIntent> {
        let ids: Vec<QueueItemId> = self.view(now).history.iter().map(|i| i.id).collect();
        (!ids.is_empty()).then_some(MutationIntent::ClearHistory(ids))
    }

    fn bulk_requeue_intent(&self, ids: Vec<QueueItemId>) -> Result<MutationIntent> {
        if ids.is_empty() {
            let err = FleetError::EmptySelection;
            self.dispatcher.reject(&err);
            return Err(err);
        }
        Ok(MutationIntent::BulkRequeue(ids))
    }

    // -- Shared page actions --

    /// Run a page action against a shared view model.
    ///
    /// Local state changes and request planning happen under the lock; the
    /// lock is released while the backend call runs, so the page can keep
    /// rebuilding views and the poller can keep publishing.
    pub async fn perform(
        shared: &Mutex<Self>,
        action: QueueAction,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (dispatcher, followup) = {
            let mut vm = shared.lock().await;
            let followup = vm.prepare(action, now)?;
            (vm.dispatcher.clone(), followup)
        };
        match followup {
            Followup::Done => {}
            Followup::Filter(filter) => apply_filter(&dispatcher, filter).await,
            Followup::Mutate(intent, after) => {
                dispatcher.dispatch(intent).await?;
                if after != AfterSuccess::Keep {
                    shared.lock().await.settle(after);
                }
            }
        }
        Ok(())
    }

    /// Apply the local part of `action` and return what is left to send.
    fn prepare(&mut self, action: QueueAction, now: DateTime<Utc>) -> Result<Followup> {
        let followup = match action {
            QueueAction::SetFilter(filter) => Followup::Filter(filter),
            QueueAction::SortPending(field) => {
                self.sort_pending_by(field);
                Followup::Done
            }
            QueueAction::SortHistory(field) => {
                self.sort_history_by(field);
                Followup::Done
            }
            QueueAction::Cancel(id) => Followup::send(MutationIntent::Cancel(id)),
            QueueAction::Stop(id) => Followup::send(MutationIntent::Stop(id)),
            QueueAction::Start(id) => Followup::send(MutationIntent::Start(id)),
            QueueAction::Remove(id) => Followup::send(MutationIntent::Remove(id)),
            QueueAction::Requeue(id) => Followup::send(MutationIntent::Requeue(id)),
            QueueAction::DropOnto { dragged, over } => {
                Followup::maybe(self.drag_intent(dragged, over, now)?)
            }
            QueueAction::Move(id, step) => Followup::maybe(self.step_intent(id, step, now)?),
            QueueAction::ToggleSelected(id) => {
                self.toggle_selected(id);
                Followup::Done
            }
            QueueAction::ToggleAll => {
                self.toggle_select_all(now);
                Followup::Done
            }
            QueueAction::ClearSelection => {
                self.settle(AfterSuccess::ClearForm);
                Followup::Done
            }
            QueueAction::SetFlag(flag, value) => {
                self.bulk_edit.set(flag, value);
                Followup::Done
            }
            QueueAction::SetPrinterChange(change) => {
                self.bulk_edit.printer = change;
                Followup::Done
            }
            QueueAction::SubmitBulkEdit => {
                Followup::Mutate(self.bulk_edit_intent()?, AfterSuccess::ClearForm)
            }
            QueueAction::BulkCancel => {
                Followup::Mutate(self.bulk_cancel_intent()?, AfterSuccess::ClearSelection)
            }
            QueueAction::ClearHistory => Followup::maybe(self.clear_history_intent(now)),
            QueueAction::BulkRequeue(ids) => Followup::send(self.bulk_requeue_intent(ids)?),
        };
        Ok(followup)
    }

    // -- Permissions --

    /// Actions to offer for `item`, from its status and the user's rights.
    pub fn actions_for(&self, item: &QueueItem) -> ItemActions {
        let gate = self.permissions.as_ref();
        let may_update = gate.can_modify(QUEUE_RESOURCE, Action::Update, item.created_by_id);
        let may_delete = gate.can_modify(QUEUE_RESOURCE, Action::Delete, item.created_by_id);
        match item.status {
            QueueStatus::Pending => ItemActions {
                cancel: may_update,
                start: item.is_staged() && may_update,
                reorder: self.drag_enabled(),
                select: may_update,
                ..Default::default()
            },
            QueueStatus::Printing => ItemActions {
                stop: gate.has_permission(Permission::PrintersControl),
                ..Default::default()
            },
            QueueStatus::Completed
            | QueueStatus::Failed
            | QueueStatus::Skipped
            | QueueStatus::Cancelled => ItemActions {
                remove: may_delete,
                requeue: gate.has_permission(Permission::QueueCreate),
                ..Default::default()
            },
        }
    }

    /// Whether the bulk edit and bulk cancel controls should be shown.
    pub fn can_bulk_edit(&self) -> bool {
        self.permissions
            .can_modify(QUEUE_RESOURCE, Action::Update, None)
    }
}

async fn apply_filter(dispatcher: &Dispatcher, filter: QueueFilter) {
    if let Err(e) = dispatcher.store().set_filter(filter).await {
        debug!(error = %e, "filter change fetch failed");
    }
}
