// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue filters.
//
// Printer and status narrow the fetch on the server. Location cannot: it is
// derived by joining items against the printer list, so it runs client-side
// after every fetch.

use std::collections::HashMap;

use printfleet_core::types::{Printer, PrinterId, QueueItem, QueueStatus};

/// Printer filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrinterFilter {
    #[default]
    All,
    /// No concrete printer and no target model.
    Unassigned,
    Printer(PrinterId),
}

impl PrinterFilter {
    /// Value of the `printer_id` query parameter.
    pub fn query_value(&self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Unassigned => Some(PrinterId::UNASSIGNED_SENTINEL),
            Self::Printer(id) => Some(id.0),
        }
    }

    /// Inverse of [`query_value`](Self::query_value).
    pub fn from_query_value(value: Option<i64>) -> Self {
        match value {
            None => Self::All,
            Some(PrinterId::UNASSIGNED_SENTINEL) => Self::Unassigned,
            Some(id) => Self::Printer(PrinterId(id)),
        }
    }

    pub fn matches(&self, item: &QueueItem) -> bool {
        match self {
            Self::All => true,
            Self::Unassigned => item.is_unassigned(),
            Self::Printer(id) => item.printer_id == Some(*id),
        }
    }
}

/// Status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Status(QueueStatus),
}

impl StatusFilter {
    pub fn matches(&self, item: &QueueItem) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => item.status == *status,
        }
    }
}

/// Location filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationFilter {
    #[default]
    All,
    Location(String),
}

/// Server-side query parameters for `GET /queue/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueQuery {
    pub printer_id: Option<i64>,
    pub status: Option<QueueStatus>,
}

impl QueueQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.printer_id {
            params.push(("printer_id", id.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        params
    }
}

/// All three filters, AND-combined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueFilter {
    pub printer: PrinterFilter,
    pub status: StatusFilter,
    pub location: LocationFilter,
}

impl QueueFilter {
    pub fn query(&self) -> QueueQuery {
        QueueQuery {
            printer_id: self.printer.query_value(),
            status: match self.status {
                StatusFilter::All => None,
                StatusFilter::Status(status) => Some(status),
            },
        }
    }

    /// Whether changing from `self` to `other` needs a new fetch.
    pub fn needs_refetch(&self, other: &QueueFilter) -> bool {
        self.query() != other.query()
    }

    /// Apply every filter client-side.
    ///
    /// Printer and status were already applied by the server; re-checking
    /// them keeps optimistic snapshots and stale responses consistent.
    pub fn apply(&self, items: &[QueueItem], printers: &[Printer]) -> Vec<QueueItem> {
        let locations = LocationIndex::new(printers);
        items
            .iter()
            .filter(|item| {
                self.printer.matches(item)
                    && self.status.matches(item)
                    && self.matches_location(item, &locations)
            })
            .cloned()
            .collect()
    }

    fn matches_location(&self, item: &QueueItem, locations: &LocationIndex<'_>) -> bool {
        match &self.location {
            LocationFilter::All => true,
            LocationFilter::Location(wanted) => {
                locations.location_of(item).is_some_and(|loc| loc == wanted.as_str())
            }
        }
    }
}

/// Printer id → location lookup.
pub struct LocationIndex<'a> {
    by_printer: HashMap<PrinterId, &'a str>,
}

impl<'a> LocationIndex<'a> {
    pub fn new(printers: &'a [Printer]) -> Self {
        Self {
            by_printer: printers
                .iter()
                .filter_map(|p| p.location.as_deref().map(|loc| (p.id, loc)))
                .collect(),
        }
    }

    /// The item's requested location, else its assigned printer's location.
    pub fn location_of<'b>(&self, item: &'b QueueItem) -> Option<&'b str>
    where
        'a: 'b,
    {
        if let Some(loc) = item.target_location.as_deref().filter(|l| !l.is_empty()) {
            return Some(loc);
        }
        item.printer_id
            .and_then(|id| self.by_printer.get(&id).copied())
    }
}

/// Distinct printer locations, sorted, for the location picker.
pub fn known_locations(printers: &[Printer]) -> Vec<String> {
    let mut locations: Vec<String> = printers
        .iter()
        .filter_map(|p| p.location.clone())
        .filter(|l| !l.is_empty())
        .collect();
    locations.sort();
    locations.dedup();
    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{item, printer};

    #[test]
    fn unassigned_sentinel_round_trips() {
        assert_eq!(PrinterFilter::Unassigned.query_value(), Some(-1));
        assert_eq!(PrinterFilter::from_query_value(Some(-1)), PrinterFilter::Unassigned);
        assert_eq!(
            PrinterFilter::from_query_value(Some(3)),
            PrinterFilter::Printer(PrinterId(3))
        );
        assert_eq!(PrinterFilter::from_query_value(None), PrinterFilter::All);
    }

    #[test]
    fn query_params_only_include_set_filters() {
        let filter = QueueFilter::default();
        assert!(filter.query().params().is_empty());

        let filter = QueueFilter {
            printer: PrinterFilter::Unassigned,
            status: StatusFilter::Status(QueueStatus::Pending),
            location: LocationFilter::Location("Lab".into()),
        };
        assert_eq!(
            filter.query().params(),
            vec![("printer_id", "-1".to_string()), ("status", "pending".to_string())]
        );
    }

    #[test]
    fn unassigned_excludes_model_targets() {
        let assigned = item(1, QueueStatus::Pending).printer(2);
        let model = item(2, QueueStatus::Pending).model("P1S");
        let loose = item(3, QueueStatus::Pending);

        let filter = QueueFilter {
            printer: PrinterFilter::Unassigned,
            ..Default::default()
        };
        let kept = filter.apply(&[assigned.build(), model.build(), loose.build()], &[]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.0, 3);
    }

    #[test]
    fn location_joins_printer_list() {
        let printers = vec![printer(1, "Alpha", Some("Lab A")), printer(2, "Beta", Some("Lab B"))];
        let on_a = item(1, QueueStatus::Pending).printer(1).build();
        let on_b = item(2, QueueStatus::Printing).printer(2).build();
        let targeted = item(3, QueueStatus::Pending)
            .model("X1C")
            .location("Lab A")
            .build();
        let nowhere = item(4, QueueStatus::Pending).build();

        let filter = QueueFilter {
            location: LocationFilter::Location("Lab A".into()),
            ..Default::default()
        };
        let kept: Vec<i64> = filter
            .apply(&[on_a, on_b, targeted, nowhere], &printers)
            .iter()
            .map(|i| i.id.0)
            .collect();
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn filters_combine_with_and() {
        let printers = vec![printer(1, "Alpha", Some("Lab A"))];
        let items = vec![
            item(1, QueueStatus::Pending).printer(1).build(),
            item(2, QueueStatus::Completed).printer(1).build(),
        ];
        let filter = QueueFilter {
            printer: PrinterFilter::Printer(PrinterId(1)),
            status: StatusFilter::Status(QueueStatus::Completed),
            location: LocationFilter::Location("Lab A".into()),
        };
        let kept = filter.apply(&items, &printers);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.0, 2);
    }

    #[test]
    fn location_change_does_not_refetch() {
        let a = QueueFilter::default();
        let b = QueueFilter {
            location: LocationFilter::Location("Lab".into()),
            ..Default::default()
        };
        assert!(!a.needs_refetch(&b));
        let c = QueueFilter {
            status: StatusFilter::Status(QueueStatus::Failed),
            ..Default::default()
        };
        assert!(a.needs_refetch(&c));
    }

    #[test]
    fn locations_are_deduplicated() {
        let printers = vec![
            printer(1, "A", Some("Lab B")),
            printer(2, "B", Some("Lab A")),
            printer(3, "C", Some("Lab B")),
            printer(4, "D", None),
        ];
        assert_eq!(known_locations(&printers), vec!["Lab A", "Lab B"]);
    }
}
