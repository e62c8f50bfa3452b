// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page: backend address, polling and scheduling display.

use dioxus::prelude::*;

use printfleet_core::config::MAX_PLACEHOLDER_HORIZON_DAYS;

use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Settings() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut save_msg = use_signal(|| Option::<String>::None);

    let horizon_value = state
        .read()
        .config
        .placeholder_horizon_days
        .map(|d| d.to_string())
        .unwrap_or_default();

    rsx! {
        div {
            h1 { "Settings" }

            section { style: "margin: 16px 0;",
                h3 { "Backend" }
                div { style: "{ROW}",
                    span { "API address" }
                    input {
                        r#type: "text",
                        style: "width: 280px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: "{state.read().config.api_base_url}",
                        onchange: move |evt| {
                            let url = evt.value().trim().to_string();
                            if !url.is_empty() {
                                state.write().config.api_base_url = url;
                            }
                        },
                    }
                }
                NumberRow {
                    label: "Request timeout (seconds)",
                    value: state.read().config.request_timeout_secs,
                    on_change: move |v: u64| { state.write().config.request_timeout_secs = v; },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Queue" }
                NumberRow {
                    label: "Refresh every (seconds)",
                    value: state.read().config.poll_interval_secs,
                    on_change: move |v: u64| { state.write().config.poll_interval_secs = v; },
                }
                div { style: "{ROW}",
                    span { "Treat schedules beyond (days) as ASAP" }
                    input {
                        r#type: "number",
                        placeholder: "off",
                        style: "width: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                        value: "{horizon_value}",
                        onchange: move |evt| {
                            let raw = evt.value();
                            let raw = raw.trim();
                            if raw.is_empty() {
                                state.write().config.placeholder_horizon_days = None;
                            } else if let Ok(days) = raw.parse::<i64>()
                                && days > 0
                            {
                                state.write().config.placeholder_horizon_days =
                                    Some(days.min(MAX_PLACEHOLDER_HORIZON_DAYS));
                            }
                        },
                    }
                }
            }

            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let config = state.read().config.clone();
                        let address_changed = config.api_base_url != svc.config().api_base_url;
                        match svc.save_config(&config) {
                            Ok(()) => {
                                tracing::info!("settings saved");
                                let msg = if address_changed {
                                    "Settings saved. The new API address applies after a restart."
                                } else {
                                    "Settings saved."
                                };
                                save_msg.set(Some(msg.into()));
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "failed to save settings");
                                save_msg.set(Some(format!("Save failed: {e}")));
                            }
                        }
                    }
                },
                "Save Settings"
            }
            if let Some(ref msg) = *save_msg.read() {
                p { style: "color: #34c759; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }

            section { style: "margin: 24px 0;",
                h3 { "About" }
                p { style: "color: #666; font-size: 14px;",
                    "PrintFleet v{VERSION}"
                    br {}
                    "Print queue and dashboard for 3D-printer fleets"
                    br {}
                    "Data: {svc.data_dir().display()}"
                    br {}
                    "PMPL-1.0-or-later"
                }
            }
        }
    }
}

const VERSION: &str = env!("CARGO_PKG_VERSION");

const ROW: &str = "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;";

/// Positive whole-number setting. Zero and junk input are ignored.
#[component]
fn NumberRow(label: &'static str, value: u64, on_change: EventHandler<u64>) -> Element {
    rsx! {
        div { style: "{ROW}",
            span { "{label}" }
            input {
                r#type: "number",
                style: "width: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                value: "{value}",
                onchange: move |evt| {
                    if let Ok(v) = evt.value().parse::<u64>()
                        && v > 0
                    {
                        on_change.call(v);
                    }
                },
            }
        }
    }
}
