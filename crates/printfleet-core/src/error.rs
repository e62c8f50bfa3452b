// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for PrintFleet.

use thiserror::Error;

use crate::types::QueueItemId;

/// Top-level error type for all PrintFleet operations.
#[derive(Debug, Error)]
pub enum FleetError {
    // -- Backend API --
    #[error("request failed: {0}")]
    Http(String),

    #[error("server returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    // -- Client-side validation --
    #[error("bulk edit has no changed fields")]
    EmptyPatch,

    #[error("no queue items selected")]
    EmptySelection,

    #[error("reordering is not available: {0}")]
    ReorderUnavailable(String),

    #[error("queue item {0} not found")]
    ItemNotFound(QueueItemId),

    #[error("unknown dashboard widget {0:?}")]
    UnknownWidget(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FleetError {
    /// Validation failures are caught before any request is made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyPatch | Self::EmptySelection | Self::ReorderUnavailable(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FleetError>;
