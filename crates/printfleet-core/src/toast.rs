// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Toast notifications and human-readable error text.
//
// Every user-visible outcome of a queue action is a short, non-blocking toast.
// Failures never escape to a top-level handler; they end up here.

use crate::error::FleetError;

/// Severity of a toast, drives colour in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }
}

/// Sink that displays toasts. Implemented by the UI.
pub trait ToastSink: Send + Sync {
    fn show_toast(&self, toast: Toast);
}

/// Sink that only logs. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogToastSink;

impl ToastSink for LogToastSink {
    fn show_toast(&self, toast: Toast) {
        match toast.severity {
            Severity::Error => tracing::warn!(message = %toast.message, "toast"),
            _ => tracing::info!(message = %toast.message, "toast"),
        }
    }
}

/// Convert an error into a sentence fit for a toast.
///
/// Server-supplied detail is passed through as-is; transport failures get a
/// plain explanation instead of the raw client error.
pub fn humanize_error(err: &FleetError) -> String {
    match err {
        FleetError::Api { detail, .. } if !detail.is_empty() => detail.clone(),
        FleetError::Api { status, .. } => format!("The server rejected the request ({status})."),
        FleetError::Http(_) => "Could not reach the print server.".into(),
        FleetError::Decode(_) => "The server sent an unexpected response.".into(),
        FleetError::InvalidUrl(_) => "The server address in Settings is not valid.".into(),
        FleetError::EmptyPatch => "Change at least one field before applying.".into(),
        FleetError::EmptySelection => "Select at least one queue item.".into(),
        FleetError::ReorderUnavailable(_) => "Sort by queue order to rearrange items.".into(),
        FleetError::ItemNotFound(id) => format!("Queue item {id} no longer exists."),
        FleetError::UnknownWidget(id) => format!("The dashboard has no widget called \"{id}\"."),
        FleetError::Database(_) | FleetError::Io(_) | FleetError::Serialization(_) => {
            "Local settings could not be read or saved.".into()
        }
    }
}
