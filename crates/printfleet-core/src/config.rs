// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest placeholder horizon honoured, in days (about a century).
pub const MAX_PLACEHOLDER_HORIZON_DAYS: i64 = 36_500;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the fleet backend API, without a trailing slash.
    pub api_base_url: String,
    /// How often the queue is re-fetched.
    pub poll_interval_secs: u64,
    /// Per-request timeout for backend calls.
    pub request_timeout_secs: u64,
    /// Scheduled times further out than this many days are placeholders and
    /// mean "as soon as possible". `None` treats every timestamp literally.
    pub placeholder_horizon_days: Option<i64>,
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// `None` when disabled or not a positive number of days.
    pub fn placeholder_horizon(&self) -> Option<chrono::Duration> {
        self.placeholder_horizon_days
            .filter(|days| *days > 0)
            .map(|days| days.min(MAX_PLACEHOLDER_HORIZON_DAYS))
            .and_then(chrono::Duration::try_days)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/v1".into(),
            poll_interval_secs: 5,
            request_timeout_secs: 30,
            placeholder_horizon_days: Some(180),
        }
    }
}
