// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrintFleet — print queue and dashboard for 3D-printer fleets
//
// Entry point. Initialises logging, backend services and app state, and
// launches the Dioxus UI.

mod pages;
mod services;
mod state;

use std::time::Duration;

use dioxus::prelude::*;
use printfleet_core::toast::Severity;

use pages::dashboard::Dashboard;
use pages::queue::Queue;
use pages::settings::Settings;

use services::app_services::AppServices;
use state::AppState;

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(4);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("PrintFleet starting");

    dioxus::launch(app);
}

/// Top-level route enum.
#[derive(Debug, Clone, Routable, PartialEq)]
enum Route {
    #[layout(TabLayout)]
    #[route("/")]
    Dashboard {},
    #[route("/queue")]
    Queue {},
    #[route("/settings")]
    Settings {},
}

/// Root component.
fn app() -> Element {
    let started = use_hook(|| {
        AppServices::start().map_err(|e| {
            tracing::error!(error = %e, "no backend services could be started");
            e.to_string()
        })
    });

    match started {
        Ok(svc) => rsx! { Fleet { svc } },
        Err(message) => rsx! { StartupFailed { message } },
    }
}

/// The running app: shares the services and routes between pages.
#[component]
fn Fleet(svc: AppServices) -> Element {
    use_context_provider(|| svc.clone());
    use_context_provider(|| Signal::new(AppState::new(&svc)));

    rsx! {
        Router::<Route> {}
    }
}

/// Shown instead of the app when no services could be built.
#[component]
fn StartupFailed(message: String) -> Element {
    rsx! {
        div { style: "max-width: 480px; margin: 96px auto; font-family: system-ui, -apple-system, sans-serif;",
            h1 { "PrintFleet could not start" }
            p { style: "color: #ff3b30;", "{message}" }
            p { style: "color: #666;", "Check the log output, then restart the app." }
        }
    }
}

/// Persistent layout: navigation, page content and the toast stack.
///
/// Owns the queue subscription so every page sees the same live view.
#[component]
fn TabLayout() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    // Poll the backend and rebuild the view on every published snapshot.
    let svc_sync = svc.clone();
    let _queue_sync = use_resource(move || {
        let svc = svc_sync.clone();
        async move {
            svc.start_polling();
            let mut rx = svc.subscribe();
            loop {
                let view = svc.queue_view().await;
                state.write().queue = Some(view);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    // Move toasts from the dispatcher's channel onto the screen.
    let svc_toasts = svc.clone();
    let _toast_pump = use_resource(move || {
        let receiver = svc_toasts.toasts();
        async move {
            let mut rx = receiver.lock().await;
            while let Some(toast) = rx.recv().await {
                let key = state.write().push_toast(toast);
                spawn(async move {
                    tokio::time::sleep(TOAST_TTL).await;
                    state.write().dismiss_toast(key);
                });
            }
        }
    });

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: row; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            nav { class: "side-bar",
                style: "display: flex; flex-direction: column; gap: 4px; width: 160px; padding: 16px 8px; border-right: 1px solid #e0e0e0; background: #fafafa;",
                strong { style: "padding: 0 8px 12px; font-size: 16px;", "PrintFleet" }
                NavButton { to: Route::Dashboard {}, label: "Dashboard" }
                NavButton { to: Route::Queue {}, label: "Queue" }
                NavButton { to: Route::Settings {}, label: "Settings" }
            }

            div { class: "page-content",
                style: "flex: 1; overflow-y: auto; padding: 16px 24px;",
                Outlet::<Route> {}
            }

            div { class: "toast-stack",
                style: "position: fixed; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 10;",
                for entry in state.read().toasts.iter() {
                    {
                        let key = entry.key;
                        let (bg, fg) = toast_colors(entry.toast.severity);
                        rsx! {
                            div {
                                key: "{key}",
                                style: "min-width: 240px; padding: 10px 14px; border-radius: 6px; background: {bg}; color: {fg}; font-size: 14px; box-shadow: 0 2px 6px rgba(0,0,0,0.15); cursor: pointer;",
                                onclick: move |_| state.write().dismiss_toast(key),
                                "{entry.toast.message}"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn NavButton(to: Route, label: &'static str) -> Element {
    rsx! {
        Link { to: to,
            style: "padding: 8px; border-radius: 6px; text-decoration: none; color: #333; font-size: 14px;",
            "{label}"
        }
    }
}

fn toast_colors(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::Success => ("#d4edda", "#155724"),
        Severity::Info => ("#d1ecf1", "#0c5460"),
        Severity::Warning => ("#fff3cd", "#856404"),
        Severity::Error => ("#f8d7da", "#721c24"),
    }
}
