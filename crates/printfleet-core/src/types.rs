// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the PrintFleet queue client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueItemId(pub i64);

impl std::fmt::Display for QueueItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrinterId(pub i64);

impl PrinterId {
    /// Query-string sentinel the backend understands as "no printer assigned".
    pub const UNASSIGNED_SENTINEL: i64 = -1;
}

impl std::fmt::Display for PrinterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a queue item. Transitions are owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    /// Waiting to be dispatched to a printer.
    Pending,
    /// Currently executing on a printer.
    Printing,
    Completed,
    Failed,
    /// Skipped by the scheduler (e.g. previous print failed).
    Skipped,
    Cancelled,
}

impl QueueStatus {
    pub const ALL: [QueueStatus; 6] = [
        Self::Pending,
        Self::Printing,
        Self::Completed,
        Self::Failed,
        Self::Skipped,
        Self::Cancelled,
    ];

    /// Wire keyword, also used as the `status` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Printing => "printing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Completed, failed, skipped and cancelled items form the history.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Skipped | Self::Cancelled
        )
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a queue item prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef {
    Archive(i64),
    LibraryFile(i64),
}

/// Where a queue item will execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionTarget {
    /// A concrete printer.
    Printer(PrinterId),
    /// Any idle printer of the given model, optionally restricted by location.
    Model {
        model: String,
        location: Option<String>,
    },
    Unassigned,
}

/// Per-job execution options. Shared by queue items and creation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    #[serde(default = "default_true")]
    pub bed_levelling: bool,
    #[serde(default)]
    pub flow_cali: bool,
    #[serde(default)]
    pub vibration_cali: bool,
    #[serde(default)]
    pub layer_inspect: bool,
    #[serde(default)]
    pub timelapse: bool,
    #[serde(default = "default_true")]
    pub use_ams: bool,
    /// Skip this job if the previous job on the same printer failed.
    #[serde(default)]
    pub require_previous_success: bool,
    /// Power the printer off once the job finishes.
    #[serde(default)]
    pub auto_off_after: bool,
    /// Staged: held out of dispatch until explicitly started.
    #[serde(default)]
    pub manual_start: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            bed_levelling: true,
            flow_cali: false,
            vibration_cali: false,
            layer_inspect: false,
            timelapse: false,
            use_ams: true,
            require_previous_success: false,
            auto_off_after: false,
            manual_start: false,
        }
    }
}

/// One scheduled, executing, or finished print job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub status: QueueStatus,
    #[serde(default)]
    pub position: i32,

    #[serde(default)]
    pub printer_id: Option<PrinterId>,
    #[serde(default)]
    pub printer_name: Option<String>,
    #[serde(default)]
    pub target_model: Option<String>,
    #[serde(default)]
    pub target_location: Option<String>,
    /// Why a model-matched item has not been assigned a printer yet.
    #[serde(default)]
    pub waiting_reason: Option<String>,

    #[serde(default)]
    pub archive_id: Option<i64>,
    #[serde(default)]
    pub archive_name: Option<String>,
    #[serde(default)]
    pub library_file_id: Option<i64>,
    #[serde(default)]
    pub library_file_name: Option<String>,
    #[serde(default)]
    pub plate_id: Option<i32>,
    /// Estimated print duration.
    #[serde(default)]
    pub print_time_seconds: Option<i64>,

    #[serde(default, with = "timestamp::option")]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub options: ExecutionOptions,

    #[serde(default)]
    pub created_by_id: Option<i64>,
    #[serde(default)]
    pub created_by_username: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl QueueItem {
    /// Source reference. Archive wins if the backend ever sends both.
    pub fn source(&self) -> Option<SourceRef> {
        match (self.archive_id, self.library_file_id) {
            (Some(id), _) => Some(SourceRef::Archive(id)),
            (None, Some(id)) => Some(SourceRef::LibraryFile(id)),
            (None, None) => None,
        }
    }

    pub fn target(&self) -> ExecutionTarget {
        match (self.printer_id, &self.target_model) {
            (Some(id), _) => ExecutionTarget::Printer(id),
            (None, Some(model)) => ExecutionTarget::Model {
                model: model.clone(),
                location: self.target_location.clone(),
            },
            (None, None) => ExecutionTarget::Unassigned,
        }
    }

    /// No concrete printer and no model to match against.
    pub fn is_unassigned(&self) -> bool {
        self.printer_id.is_none() && self.target_model.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this pending item is held until a user starts it.
    pub fn is_staged(&self) -> bool {
        self.status == QueueStatus::Pending && self.options.manual_start
    }

    /// Human-readable job name.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.archive_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        if let Some(name) = self.library_file_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        match self.source() {
            Some(SourceRef::Archive(id)) => format!("Archive #{id}"),
            Some(SourceRef::LibraryFile(id)) => format!("File #{id}"),
            None => format!("Job #{}", self.id),
        }
    }

    /// Human-readable execution target.
    pub fn printer_label(&self) -> String {
        match self.target() {
            ExecutionTarget::Printer(id) => self
                .printer_name
                .clone()
                .unwrap_or_else(|| format!("Printer #{id}")),
            ExecutionTarget::Model { model, .. } => format!("Any {model}"),
            ExecutionTarget::Unassigned => "Unassigned".to_string(),
        }
    }

    /// Scheduled time with placeholders resolved. `None` means ASAP.
    ///
    /// A time more than `horizon` past `now` is a far-future placeholder the
    /// backend uses for "no specific time".
    pub fn effective_scheduled_time(
        &self,
        now: DateTime<Utc>,
        horizon: Option<chrono::Duration>,
    ) -> Option<DateTime<Utc>> {
        let scheduled = self.scheduled_time?;
        // A horizon past the end of time marks nothing as a placeholder.
        match horizon.and_then(|h| now.checked_add_signed(h)) {
            Some(limit) if scheduled > limit => None,
            _ => Some(scheduled),
        }
    }

    /// Timestamp used to order history: completion, else creation.
    pub fn history_timestamp(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.created_at)
    }
}

/// A printer known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printer {
    pub id: PrinterId,
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Body of `POST /queue/`: add a job or requeue a finished one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItemCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_id: Option<PrinterId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_file_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub options: ExecutionOptions,
}

impl QueueItemCreate {
    /// Clone a finished item's source, target and options into a new job.
    ///
    /// The schedule is dropped: a requeued job runs as soon as possible.
    pub fn requeue_of(item: &QueueItem) -> Self {
        Self {
            printer_id: item.printer_id,
            target_model: item.target_model.clone(),
            target_location: item.target_location.clone(),
            archive_id: item.archive_id,
            library_file_id: if item.archive_id.is_some() {
                None
            } else {
                item.library_file_id
            },
            plate_id: item.plate_id,
            scheduled_time: None,
            options: item.options,
        }
    }
}

/// One entry of a `POST /queue/reorder` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub id: QueueItemId,
    pub position: i32,
}

// ---------------------------------------------------------------------------
// Sort preferences
// ---------------------------------------------------------------------------

/// Sort direction shared by both queue lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Sort keys available for pending items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingSortField {
    /// Manual queue order.
    Position,
    Name,
    Printer,
    /// Effective scheduled time (ASAP first).
    Time,
}

impl PendingSortField {
    pub const ALL: [PendingSortField; 4] = [Self::Position, Self::Name, Self::Printer, Self::Time];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Name => "name",
            Self::Printer => "printer",
            Self::Time => "time",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

/// Sort keys available for history items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySortField {
    /// Completion time, falling back to creation time.
    Date,
    Name,
    Printer,
    Status,
}

impl HistorySortField {
    pub const ALL: [HistorySortField; 4] = [Self::Date, Self::Name, Self::Printer, Self::Status];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Name => "name",
            Self::Printer => "printer",
            Self::Status => "status",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

// ---------------------------------------------------------------------------
// Timestamp (de)serialization
// ---------------------------------------------------------------------------

/// The backend emits RFC 3339 timestamps, or naive ISO-8601 ones that are
/// implicitly UTC. Both are accepted; RFC 3339 is always written.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_str(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {raw}"))
                }),
            }
        }
    }
}
