// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state: reactive signals for the Dioxus UI.

use printfleet_core::AppConfig;
use printfleet_core::toast::Toast;
use printfleet_prefs::LayoutState;
use printfleet_queue::QueueView;

use crate::services::app_services::AppServices;

/// A toast on screen, keyed so it can be dismissed individually.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastEntry {
    pub key: u64,
    pub toast: Toast,
}

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Settings being edited; saved explicitly from the settings page.
    pub config: AppConfig,
    /// Latest queue view. `None` until the view model has been asked once.
    pub queue: Option<QueueView>,
    pub layout: LayoutState,
    /// Toasts currently shown, oldest first.
    pub toasts: Vec<ToastEntry>,
    next_toast_key: u64,
}

impl AppState {
    pub fn new(svc: &AppServices) -> Self {
        Self {
            config: svc.config(),
            queue: None,
            layout: svc.layout_state(),
            toasts: Vec::new(),
            next_toast_key: 0,
        }
    }

    /// Show `toast` and return the key to dismiss it with.
    pub fn push_toast(&mut self, toast: Toast) -> u64 {
        let key = self.next_toast_key;
        self.next_toast_key += 1;
        self.toasts.push(ToastEntry { key, toast });
        key
    }

    pub fn dismiss_toast(&mut self, key: u64) {
        self.toasts.retain(|t| t.key != key);
    }
}
