// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue page: filters, the active/pending/history lists, drag and keyboard
// reordering, bulk edit and per-item actions.

use chrono::Utc;
use dioxus::prelude::*;

use printfleet_core::format::{format_duration, format_relative_time, format_scheduled_time};
use printfleet_core::types::{
    HistorySortField, PendingSortField, PrinterId, QueueItem, QueueItemId, QueueStatus,
    SortDirection,
};
use printfleet_queue::{
    BulkFlag, LocationFilter, PrinterChange, PrinterFilter, QueueAction, QueueFilter, QueueView,
    QueueViewModel, StatusFilter, Step, TriState,
};

use crate::services::app_services::AppServices;
use crate::state::AppState;

/// Run `action` on the shared view model, then redraw from its new view.
fn perform(svc: AppServices, mut state: Signal<AppState>, action: QueueAction) {
    spawn(async move {
        let queue = svc.queue();
        if let Err(e) = QueueViewModel::perform(&queue, action, Utc::now()).await {
            tracing::debug!(error = %e, "queue action did not complete");
        }
        let view = svc.queue_view().await;
        state.write().queue = Some(view);
    });
}

#[component]
pub fn Queue() -> Element {
    let state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut dragging = use_signal(|| Option::<QueueItemId>::None);

    let Some(view) = state.read().queue.clone() else {
        return rsx! {
            p { style: "text-align: center; color: #aaa; margin: 48px 0;", "Loading queue..." }
        };
    };
    let horizon = state.read().config.placeholder_horizon();
    let now = Utc::now();

    let act = {
        let svc = svc.clone();
        move |action: QueueAction| perform(svc.clone(), state, action)
    };

    let failed_ids: Vec<QueueItemId> = view
        .history
        .iter()
        .filter(|i| i.status == QueueStatus::Failed)
        .map(|i| i.id)
        .collect();

    rsx! {
        div {
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                h1 { "Queue" }
                div { style: "display: flex; gap: 8px; align-items: center;",
                    if let Some(at) = view.fetched_at {
                        span { style: "color: #999; font-size: 12px;",
                            "Updated {format_relative_time(at, now)}"
                        }
                    }
                    button {
                        style: "{BUTTON}",
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                let svc = svc.clone();
                                spawn(async move { svc.refresh().await; });
                            }
                        },
                        "Refresh"
                    }
                }
            }

            FilterBar { view: view.clone(), on_action: act.clone() }

            if !view.loaded {
                p { style: "color: #999; font-size: 14px;", "Waiting for the print server..." }
            }

            // -- Active --------------------------------------------------
            section { style: "margin: 16px 0;",
                h3 { "Printing ({view.active.len()})" }
                if view.active.is_empty() {
                    p { style: "color: #aaa; font-size: 14px;", "Nothing is printing." }
                }
                for item in view.active.iter() {
                    {
                        let id = item.id;
                        let actions = view.actions(id);
                        let act = act.clone();
                        rsx! {
                            div { key: "{id}", style: "{ROW}",
                                ItemSummary { item: item.clone() }
                                span { style: "color: #666; font-size: 13px;",
                                    "{format_duration(item.print_time_seconds)}"
                                }
                                if actions.stop {
                                    button {
                                        style: "{DANGER_BUTTON}",
                                        onclick: move |_| act(QueueAction::Stop(id)),
                                        "Stop"
                                    }
                                }
                            }
                        }
                    }
                }
            }

            // -- Pending -------------------------------------------------
            section { style: "margin: 16px 0;",
                div { style: "display: flex; justify-content: space-between; align-items: center;",
                    h3 { "Up next ({view.pending.len()})" }
                    div { style: "display: flex; gap: 4px;",
                        for field in PendingSortField::ALL {
                            {
                                let act = act.clone();
                                let label = sort_label(
                                    pending_field_label(field),
                                    view.pending_sort.field == field,
                                    view.pending_sort.direction,
                                );
                                rsx! {
                                    button {
                                        style: "{SMALL_BUTTON}",
                                        onclick: move |_| act(QueueAction::SortPending(field)),
                                        "{label}"
                                    }
                                }
                            }
                        }
                    }
                }

                if !view.drag_enabled && !view.pending.is_empty() {
                    p { style: "color: #999; font-size: 12px;",
                        "Sort by position to rearrange the queue."
                    }
                }

                if view.can_bulk_edit && !view.pending.is_empty() {
                    label { style: "display: flex; gap: 6px; align-items: center; font-size: 13px; margin: 4px 0;",
                        input {
                            r#type: "checkbox",
                            checked: view.all_selected,
                            onchange: {
                                let act = act.clone();
                                move |_| act(QueueAction::ToggleAll)
                            },
                        }
                        "Select all"
                    }
                }

                if !view.selected.is_empty() {
                    BulkEditBar { view: view.clone(), on_action: act.clone() }
                }

                if view.pending.is_empty() {
                    p { style: "color: #aaa; font-size: 14px;", "The queue is empty." }
                }

                for (index, item) in view.pending.iter().enumerate() {
                    {
                        let id = item.id;
                        let actions = view.actions(id);
                        let selected = view.is_selected(id);
                        let is_first = index == 0;
                        let is_last = index + 1 == view.pending.len();
                        let scheduled = format_scheduled_time(item, now, horizon);
                        let draggable = if actions.reorder { "true" } else { "false" };
                        let act = act.clone();
                        rsx! {
                            div {
                                key: "{id}",
                                style: "{ROW}",
                                draggable: draggable,
                                ondragstart: move |_| dragging.set(Some(id)),
                                ondragover: move |evt| evt.prevent_default(),
                                ondrop: {
                                    let act = act.clone();
                                    move |evt: DragEvent| {
                                        evt.prevent_default();
                                        if let Some(dragged) = dragging.take() {
                                            act(QueueAction::DropOnto { dragged, over: id });
                                        }
                                    }
                                },
                                if actions.select {
                                    input {
                                        r#type: "checkbox",
                                        checked: selected,
                                        onchange: {
                                            let act = act.clone();
                                            move |_| act(QueueAction::ToggleSelected(id))
                                        },
                                    }
                                }
                                if actions.reorder {
                                    div { style: "display: flex; flex-direction: column;",
                                        button {
                                            style: "{ARROW_BUTTON}",
                                            disabled: is_first,
                                            onclick: {
                                                let act = act.clone();
                                                move |_| act(QueueAction::Move(id, Step::Up))
                                            },
                                            "^"
                                        }
                                        button {
                                            style: "{ARROW_BUTTON}",
                                            disabled: is_last,
                                            onclick: {
                                                let act = act.clone();
                                                move |_| act(QueueAction::Move(id, Step::Down))
                                            },
                                            "v"
                                        }
                                    }
                                }
                                ItemSummary { item: item.clone() }
                                span { style: "color: #666; font-size: 13px; min-width: 120px;", "{scheduled}" }
                                span { style: "color: #666; font-size: 13px;",
                                    "{format_duration(item.print_time_seconds)}"
                                }
                                if actions.start {
                                    button {
                                        style: "{PRIMARY_BUTTON}",
                                        onclick: {
                                            let act = act.clone();
                                            move |_| act(QueueAction::Start(id))
                                        },
                                        "Start"
                                    }
                                }
                                if actions.cancel {
                                    button {
                                        style: "{DANGER_BUTTON}",
                                        onclick: move |_| act(QueueAction::Cancel(id)),
                                        "Cancel"
                                    }
                                }
                            }
                        }
                    }
                }
            }

            // -- History -------------------------------------------------
            section { style: "margin: 16px 0;",
                div { style: "display: flex; justify-content: space-between; align-items: center;",
                    h3 { "History ({view.history.len()})" }
                    div { style: "display: flex; gap: 4px;",
                        for field in HistorySortField::ALL {
                            {
                                let act = act.clone();
                                let label = sort_label(
                                    history_field_label(field),
                                    view.history_sort.field == field,
                                    view.history_sort.direction,
                                );
                                rsx! {
                                    button {
                                        style: "{SMALL_BUTTON}",
                                        onclick: move |_| act(QueueAction::SortHistory(field)),
                                        "{label}"
                                    }
                                }
                            }
                        }
                        if !failed_ids.is_empty() {
                            button {
                                style: "{SMALL_BUTTON}",
                                onclick: {
                                    let act = act.clone();
                                    let ids = failed_ids.clone();
                                    move |_| act(QueueAction::BulkRequeue(ids.clone()))
                                },
                                "Requeue failed ({failed_ids.len()})"
                            }
                        }
                        if !view.history.is_empty() {
                            button {
                                style: "{SMALL_DANGER_BUTTON}",
                                onclick: {
                                    let act = act.clone();
                                    move |_| act(QueueAction::ClearHistory)
                                },
                                "Clear history"
                            }
                        }
                    }
                }

                if view.history.is_empty() {
                    p { style: "color: #aaa; font-size: 14px;", "No finished jobs." }
                }

                for item in view.history.iter() {
                    {
                        let id = item.id;
                        let actions = view.actions(id);
                        let when = format_relative_time(item.history_timestamp(), now);
                        let act = act.clone();
                        rsx! {
                            div { key: "{id}", style: "{ROW}",
                                ItemSummary { item: item.clone() }
                                span { style: "color: #666; font-size: 13px; min-width: 80px;", "{when}" }
                                if actions.requeue {
                                    button {
                                        style: "{BUTTON}",
                                        onclick: {
                                            let act = act.clone();
                                            move |_| act(QueueAction::Requeue(id))
                                        },
                                        "Requeue"
                                    }
                                }
                                if actions.remove {
                                    button {
                                        style: "{DANGER_BUTTON}",
                                        onclick: move |_| act(QueueAction::Remove(id)),
                                        "Remove"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Printer, status and location pickers.
#[component]
fn FilterBar(view: QueueView, on_action: Callback<QueueAction>) -> Element {
    let filter = view.filter.clone();
    let printer_value = match filter.printer {
        PrinterFilter::All => "all".to_string(),
        PrinterFilter::Unassigned => "unassigned".to_string(),
        PrinterFilter::Printer(id) => id.to_string(),
    };
    let status_value = match filter.status {
        StatusFilter::All => "all",
        StatusFilter::Status(s) => s.as_str(),
    };
    let location_value = match &filter.location {
        LocationFilter::All => "all".to_string(),
        LocationFilter::Location(name) => name.clone(),
    };

    rsx! {
        div { style: "display: flex; gap: 12px; flex-wrap: wrap; margin: 8px 0;",
            label { style: "{FILTER_LABEL}",
                "Printer"
                select {
                    style: "{SELECT}",
                    value: "{printer_value}",
                    onchange: {
                        let filter = filter.clone();
                        move |evt: FormEvent| {
                            let printer = match evt.value().as_str() {
                                "all" => PrinterFilter::All,
                                "unassigned" => PrinterFilter::Unassigned,
                                other => match other.parse::<i64>() {
                                    Ok(id) => PrinterFilter::Printer(PrinterId(id)),
                                    Err(_) => return,
                                },
                            };
                            on_action.call(QueueAction::SetFilter(QueueFilter { printer, ..filter.clone() }));
                        }
                    },
                    option { value: "all", "All printers" }
                    option { value: "unassigned", "Unassigned" }
                    for printer in view.printers.iter() {
                        option { value: "{printer.id}", "{printer.name}" }
                    }
                }
            }
            label { style: "{FILTER_LABEL}",
                "Status"
                select {
                    style: "{SELECT}",
                    value: "{status_value}",
                    onchange: {
                        let filter = filter.clone();
                        move |evt: FormEvent| {
                            let status = match QueueStatus::from_keyword(&evt.value()) {
                                Some(s) => StatusFilter::Status(s),
                                None => StatusFilter::All,
                            };
                            on_action.call(QueueAction::SetFilter(QueueFilter { status, ..filter.clone() }));
                        }
                    },
                    option { value: "all", "All statuses" }
                    for status in QueueStatus::ALL {
                        option { value: "{status.as_str()}", "{status}" }
                    }
                }
            }
            if !view.locations.is_empty() {
                label { style: "{FILTER_LABEL}",
                    "Location"
                    select {
                        style: "{SELECT}",
                        value: "{location_value}",
                        onchange: {
                            let filter = filter.clone();
                            move |evt: FormEvent| {
                                let location = match evt.value().as_str() {
                                    "all" => LocationFilter::All,
                                    name => LocationFilter::Location(name.to_string()),
                                };
                                on_action.call(QueueAction::SetFilter(QueueFilter { location, ..filter.clone() }));
                            }
                        },
                        option { value: "all", "All locations" }
                        for location in view.locations.iter() {
                            option { value: "{location}", "{location}" }
                        }
                    }
                }
            }
        }
    }
}

/// Tri-state option toggles and printer reassignment for the selection.
#[component]
fn BulkEditBar(view: QueueView, on_action: Callback<QueueAction>) -> Element {
    let edit = view.bulk_edit;
    let printer_value = match edit.printer {
        PrinterChange::Unchanged => "unchanged".to_string(),
        PrinterChange::Unassigned => "unassigned".to_string(),
        PrinterChange::Printer(id) => id.to_string(),
    };

    rsx! {
        div { style: "padding: 12px; margin: 8px 0; border: 1px solid #b3d7ff; border-radius: 8px; background: #f3f8ff;",
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                strong { "{view.selected.len()} selected" }
                div { style: "display: flex; gap: 8px;",
                    button {
                        style: "{PRIMARY_BUTTON}",
                        disabled: edit.is_empty(),
                        onclick: move |_| on_action.call(QueueAction::SubmitBulkEdit),
                        "Apply"
                    }
                    button {
                        style: "{DANGER_BUTTON}",
                        onclick: move |_| on_action.call(QueueAction::BulkCancel),
                        "Cancel selected"
                    }
                    button {
                        style: "{BUTTON}",
                        onclick: move |_| on_action.call(QueueAction::ClearSelection),
                        "Clear"
                    }
                }
            }
            div { style: "display: flex; flex-wrap: wrap; gap: 6px; margin-top: 8px;",
                for flag in BulkFlag::ALL {
                    {
                        let current = edit.get(flag);
                        rsx! {
                            button {
                                style: "padding: 4px 8px; border-radius: 4px; border: 1px solid #ccc; font-size: 12px; background: {tristate_bg(current)};",
                                onclick: move |_| on_action.call(QueueAction::SetFlag(flag, current.cycled())),
                                "{flag.label()}: {tristate_text(current)}"
                            }
                        }
                    }
                }
            }
            label { style: "{FILTER_LABEL} margin-top: 8px;",
                "Printer"
                select {
                    style: "{SELECT}",
                    value: "{printer_value}",
                    onchange: move |evt: FormEvent| {
                        let change = match evt.value().as_str() {
                            "unchanged" => PrinterChange::Unchanged,
                            "unassigned" => PrinterChange::Unassigned,
                            other => match other.parse::<i64>() {
                                Ok(id) => PrinterChange::Printer(PrinterId(id)),
                                Err(_) => return,
                            },
                        };
                        on_action.call(QueueAction::SetPrinterChange(change));
                    },
                    option { value: "unchanged", "Keep current" }
                    option { value: "unassigned", "Unassign" }
                    for printer in view.printers.iter() {
                        option { value: "{printer.id}", "{printer.name}" }
                    }
                }
            }
        }
    }
}

/// Name, target and status badge for a row.
#[component]
fn ItemSummary(item: QueueItem) -> Element {
    let status = item.status;
    rsx! {
        div { style: "flex: 1; min-width: 0;",
            div { style: "display: flex; gap: 8px; align-items: center;",
                strong { "{item.display_name()}" }
                span { style: "font-size: 11px; padding: 2px 6px; border-radius: 4px; background: {status_bg(status)}; color: {status_fg(status)};",
                    "{status_text(status)}"
                }
                if item.is_staged() {
                    span { style: "font-size: 11px; padding: 2px 6px; border-radius: 4px; background: #e7e1f7; color: #4b2e83;",
                        "Staged"
                    }
                }
            }
            p { style: "color: #666; font-size: 13px; margin: 2px 0;", "{item.printer_label()}" }
            if let Some(ref reason) = item.waiting_reason {
                p { style: "color: #999; font-size: 12px; margin: 2px 0;", "{reason}" }
            }
            if let Some(ref err) = item.error_message {
                p { style: "color: #ff3b30; font-size: 12px; margin: 2px 0;", "{err}" }
            }
        }
    }
}

const ROW: &str = "display: flex; gap: 12px; align-items: center; padding: 10px 12px; margin: 6px 0; border: 1px solid #e0e0e0; border-radius: 8px; background: white;";
const BUTTON: &str = "padding: 4px 12px; border-radius: 4px; border: 1px solid #ccc; color: #333; background: white; font-size: 12px;";
const PRIMARY_BUTTON: &str = "padding: 4px 12px; border-radius: 4px; border: none; color: white; background: #007aff; font-size: 12px;";
const DANGER_BUTTON: &str = "padding: 4px 12px; border-radius: 4px; border: 1px solid #ff3b30; color: #ff3b30; background: white; font-size: 12px;";
const SMALL_BUTTON: &str = "padding: 2px 8px; border-radius: 4px; border: 1px solid #ddd; background: white; font-size: 12px;";
const SMALL_DANGER_BUTTON: &str = "padding: 2px 8px; border-radius: 4px; border: 1px solid #ff3b30; color: #ff3b30; background: white; font-size: 12px;";
const ARROW_BUTTON: &str = "padding: 0 6px; border: none; background: none; font-size: 11px; color: #666;";
const FILTER_LABEL: &str = "display: flex; gap: 6px; align-items: center; font-size: 13px; color: #555;";
const SELECT: &str = "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;";

fn sort_label(name: &str, active: bool, direction: SortDirection) -> String {
    if !active {
        return name.to_string();
    }
    match direction {
        SortDirection::Asc => format!("{name} ↑"),
        SortDirection::Desc => format!("{name} ↓"),
    }
}

fn pending_field_label(field: PendingSortField) -> &'static str {
    match field {
        PendingSortField::Position => "Position",
        PendingSortField::Name => "Name",
        PendingSortField::Printer => "Printer",
        PendingSortField::Time => "Time",
    }
}

fn history_field_label(field: HistorySortField) -> &'static str {
    match field {
        HistorySortField::Date => "Date",
        HistorySortField::Name => "Name",
        HistorySortField::Printer => "Printer",
        HistorySortField::Status => "Status",
    }
}

fn tristate_text(state: TriState) -> &'static str {
    match state {
        TriState::Unchanged => "keep",
        TriState::Set(true) => "on",
        TriState::Set(false) => "off",
    }
}

fn tristate_bg(state: TriState) -> &'static str {
    match state {
        TriState::Unchanged => "white",
        TriState::Set(true) => "#d4edda",
        TriState::Set(false) => "#f8d7da",
    }
}

fn status_bg(s: QueueStatus) -> &'static str {
    match s {
        QueueStatus::Pending => "#f0f0f0",
        QueueStatus::Printing => "#fff3cd",
        QueueStatus::Completed => "#d4edda",
        QueueStatus::Failed => "#f8d7da",
        QueueStatus::Skipped | QueueStatus::Cancelled => "#e2e3e5",
    }
}

fn status_fg(s: QueueStatus) -> &'static str {
    match s {
        QueueStatus::Pending => "#333",
        QueueStatus::Printing => "#856404",
        QueueStatus::Completed => "#155724",
        QueueStatus::Failed => "#721c24",
        QueueStatus::Skipped | QueueStatus::Cancelled => "#383d41",
    }
}

fn status_text(s: QueueStatus) -> &'static str {
    match s {
        QueueStatus::Pending => "Pending",
        QueueStatus::Printing => "Printing...",
        QueueStatus::Completed => "Done",
        QueueStatus::Failed => "Failed",
        QueueStatus::Skipped => "Skipped",
        QueueStatus::Cancelled => "Cancelled",
    }
}
