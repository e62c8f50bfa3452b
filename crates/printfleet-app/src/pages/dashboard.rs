// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dashboard: a grid of rearrangeable widgets summarising the fleet.

use chrono::Utc;
use dioxus::prelude::*;

use printfleet_core::error::Result as FleetResult;
use printfleet_core::format::{format_duration, format_relative_time};
use printfleet_core::types::QueueStatus;
use printfleet_prefs::LayoutState;
use printfleet_queue::QueueView;

use crate::Route;
use crate::services::app_services::AppServices;
use crate::state::AppState;

/// Rows shown in list widgets.
const LIST_LIMIT: usize = 5;

#[component]
pub fn Dashboard() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let layout = state.read().layout.clone();
    let visible: Vec<String> = layout.visible().map(str::to_string).collect();
    let hidden: Vec<String> = layout
        .order
        .iter()
        .filter(|id| layout.is_hidden(id))
        .cloned()
        .collect();
    let queue = state.read().queue.clone();

    // Apply a layout change and redraw from the saved state.
    let mut apply = move |result: FleetResult<LayoutState>| match result {
        Ok(layout) => state.write().layout = layout,
        Err(e) => tracing::warn!(error = %e, "dashboard layout change failed"),
    };

    rsx! {
        div {
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                h1 { "Dashboard" }
                button {
                    style: "{BUTTON}",
                    onclick: {
                        let svc = svc.clone();
                        move |_| apply(svc.reset_layout())
                    },
                    "Reset layout"
                }
            }

            div { style: "display: flex; flex-wrap: wrap; gap: 12px;",
                for (index, id) in visible.iter().enumerate() {
                    {
                        let id = id.clone();
                        let title = svc.widget_title(&id);
                        let width = widget_width(layout.size_of(&id).quarters());
                        let prev = index.checked_sub(1).and_then(|i| visible.get(i)).cloned();
                        let next = visible.get(index + 1).cloned();
                        let (first, last) = (prev.is_none(), next.is_none());
                        let svc = svc.clone();
                        rsx! {
                            div { key: "{id}",
                                style: "flex: 0 0 {width}; box-sizing: border-box; padding: 12px; border: 1px solid #e0e0e0; border-radius: 8px; background: white;",
                                div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 8px;",
                                    strong { "{title}" }
                                    div { style: "display: flex; gap: 4px;",
                                        button {
                                            style: "{ICON_BUTTON}",
                                            disabled: first,
                                            onclick: {
                                                let svc = svc.clone();
                                                let id = id.clone();
                                                move |_| {
                                                    if let Some(ref over) = prev {
                                                        apply(svc.move_widget(&id, over));
                                                    }
                                                }
                                            },
                                            "<"
                                        }
                                        button {
                                            style: "{ICON_BUTTON}",
                                            disabled: last,
                                            onclick: {
                                                let svc = svc.clone();
                                                let id = id.clone();
                                                move |_| {
                                                    if let Some(ref over) = next {
                                                        apply(svc.move_widget(&id, over));
                                                    }
                                                }
                                            },
                                            ">"
                                        }
                                        button {
                                            style: "{ICON_BUTTON}",
                                            onclick: {
                                                let svc = svc.clone();
                                                let id = id.clone();
                                                move |_| apply(svc.cycle_widget_size(&id))
                                            },
                                            "Size"
                                        }
                                        button {
                                            style: "{ICON_BUTTON}",
                                            onclick: {
                                                let svc = svc.clone();
                                                let id = id.clone();
                                                move |_| apply(svc.toggle_widget(&id))
                                            },
                                            "Hide"
                                        }
                                    }
                                }
                                {
                                    match &queue {
                                        Some(view) => rsx! { WidgetBody { id: id.clone(), view: view.clone() } },
                                        None => rsx! { p { style: "{EMPTY}", "Loading..." } },
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if !hidden.is_empty() {
                section { style: "margin: 24px 0;",
                    h3 { "Hidden widgets" }
                    div { style: "display: flex; flex-wrap: wrap; gap: 8px;",
                        for id in hidden.iter() {
                            {
                                let title = svc.widget_title(id);
                                let svc = svc.clone();
                                let id = id.clone();
                                rsx! {
                                    button {
                                        key: "{id}",
                                        style: "{BUTTON}",
                                        onclick: move |_| apply(svc.toggle_widget(&id)),
                                        "Show {title}"
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

/// Contents of one widget.
#[component]
fn WidgetBody(id: String, view: QueueView) -> Element {
    let now = Utc::now();
    match id.as_str() {
        "stats" => {
            let failed = view
                .history
                .iter()
                .filter(|i| i.status == QueueStatus::Failed)
                .count();
            rsx! {
                div { style: "display: flex; gap: 12px;",
                    StatCard { label: "Printing", value: view.active.len(), color: "#ff9500" }
                    StatCard { label: "Queued", value: view.pending.len(), color: "#007aff" }
                    StatCard { label: "Finished", value: view.history.len(), color: "#34c759" }
                    StatCard { label: "Failed", value: failed, color: "#ff3b30" }
                }
            }
        }
        "active" => rsx! {
            if view.active.is_empty() {
                p { style: "{EMPTY}", "Nothing is printing." }
            }
            for item in view.active.iter().take(LIST_LIMIT) {
                div { key: "{item.id}", style: "{LINE}",
                    span { "{item.display_name()}" }
                    span { style: "color: #666;", "{item.printer_label()}" }
                }
            }
        },
        "next" => rsx! {
            if view.pending.is_empty() {
                p { style: "{EMPTY}", "The queue is empty." }
            }
            for item in view.pending.iter().take(LIST_LIMIT) {
                div { key: "{item.id}", style: "{LINE}",
                    span { "{item.display_name()}" }
                    span { style: "color: #666;", "{format_duration(item.print_time_seconds)}" }
                }
            }
            if view.pending.len() > LIST_LIMIT {
                Link { to: Route::Queue {}, style: "font-size: 13px;",
                    "{view.pending.len() - LIST_LIMIT} more in the queue"
                }
            }
        },
        "printers" => rsx! {
            if view.printers.is_empty() {
                p { style: "{EMPTY}", "No printers configured." }
            }
            for printer in view.printers.iter() {
                div { key: "{printer.id}", style: "{LINE}",
                    span { "{printer.name}" }
                    span { style: "color: #666;",
                        "{printer.model.clone().unwrap_or_default()} {printer.location.clone().unwrap_or_default()}"
                    }
                }
            }
        },
        "recent" => rsx! {
            if view.history.is_empty() {
                p { style: "{EMPTY}", "No finished jobs." }
            }
            for item in view.history.iter().take(LIST_LIMIT) {
                div { key: "{item.id}", style: "{LINE}",
                    span { "{item.display_name()}" }
                    span { style: "color: #666;",
                        "{item.status} {format_relative_time(item.history_timestamp(), now)}"
                    }
                }
            }
        },
        "failures" => {
            let failures: Vec<_> = view
                .history
                .iter()
                .filter(|i| i.status == QueueStatus::Failed)
                .take(LIST_LIMIT)
                .cloned()
                .collect();
            rsx! {
                if failures.is_empty() {
                    p { style: "{EMPTY}", "No failures." }
                }
                for item in failures.iter() {
                    div { key: "{item.id}", style: "padding: 4px 0; font-size: 13px;",
                        strong { "{item.display_name()}" }
                        if let Some(ref err) = item.error_message {
                            p { style: "color: #ff3b30; margin: 2px 0;", "{err}" }
                        }
                    }
                }
            }
        }
        other => rsx! {
            p { style: "{EMPTY}", "Unknown widget \"{other}\"" }
        },
    }
}

#[component]
fn StatCard(label: &'static str, value: usize, color: &'static str) -> Element {
    rsx! {
        div { style: "flex: 1; text-align: center; padding: 8px; border-radius: 6px; background: #fafafa;",
            div { style: "font-size: 24px; font-weight: bold; color: {color};", "{value}" }
            div { style: "font-size: 12px; color: #666;", "{label}" }
        }
    }
}

const BUTTON: &str = "padding: 4px 12px; border-radius: 4px; border: 1px solid #ccc; color: #333; background: white; font-size: 12px;";
const ICON_BUTTON: &str = "padding: 2px 6px; border-radius: 4px; border: 1px solid #ddd; background: white; font-size: 11px;";
const LINE: &str = "display: flex; justify-content: space-between; padding: 4px 0; font-size: 13px; border-bottom: 1px solid #f5f5f5;";
const EMPTY: &str = "color: #aaa; font-size: 13px;";

/// CSS width for a widget spanning `quarters` of the grid row.
fn widget_width(quarters: u8) -> String {
    match quarters {
        4 => "100%".into(),
        q => format!("calc({}% - 12px)", u32::from(q) * 25),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_widths() {
        assert_eq!(widget_width(4), "100%");
        assert_eq!(widget_width(2), "calc(50% - 12px)");
        assert_eq!(widget_width(1), "calc(25% - 12px)");
    }
}
