// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordering of the pending and history lists, and reorder planning.
//
// Sorting is total: after the primary key, ties fall back to position and
// then id, so sorting an already sorted list never moves anything. The
// direction flips only the primary key.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use printfleet_core::error::{FleetError, Result};
use printfleet_core::types::{
    HistorySortField, PendingSortField, QueueItem, QueueItemId, ReorderEntry, SortDirection,
};

/// Clock and placeholder horizon used to resolve scheduled times.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    pub now: DateTime<Utc>,
    pub horizon: Option<chrono::Duration>,
}

impl TimeContext {
    pub fn new(now: DateTime<Utc>, horizon: Option<chrono::Duration>) -> Self {
        Self { now, horizon }
    }

    /// Sort key for the `time` field. ASAP and placeholders sort as epoch.
    fn time_key(&self, item: &QueueItem) -> i64 {
        item.effective_scheduled_time(self.now, self.horizon)
            .map(|t| t.timestamp_millis())
            .unwrap_or(0)
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Compare two pending items.
pub fn compare_pending(
    a: &QueueItem,
    b: &QueueItem,
    field: PendingSortField,
    direction: SortDirection,
    time: &TimeContext,
) -> Ordering {
    let primary = match field {
        PendingSortField::Position => a.position.cmp(&b.position),
        PendingSortField::Name => fold(&a.display_name()).cmp(&fold(&b.display_name())),
        PendingSortField::Printer => fold(&a.printer_label()).cmp(&fold(&b.printer_label())),
        PendingSortField::Time => time.time_key(a).cmp(&time.time_key(b)),
    };
    directed(primary, direction)
        .then_with(|| a.position.cmp(&b.position))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_pending(
    items: &mut [QueueItem],
    field: PendingSortField,
    direction: SortDirection,
    time: &TimeContext,
) {
    items.sort_by(|a, b| compare_pending(a, b, field, direction, time));
}

/// Compare two history items.
pub fn compare_history(
    a: &QueueItem,
    b: &QueueItem,
    field: HistorySortField,
    direction: SortDirection,
) -> Ordering {
    let primary = match field {
        HistorySortField::Date => a.history_timestamp().cmp(&b.history_timestamp()),
        HistorySortField::Name => fold(&a.display_name()).cmp(&fold(&b.display_name())),
        HistorySortField::Printer => fold(&a.printer_label()).cmp(&fold(&b.printer_label())),
        HistorySortField::Status => a.status.as_str().cmp(b.status.as_str()),
    };
    directed(primary, direction)
        .then_with(|| a.position.cmp(&b.position))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_history(items: &mut [QueueItem], field: HistorySortField, direction: SortDirection) {
    items.sort_by(|a, b| compare_history(a, b, field, direction));
}

/// Manual reordering only makes sense when the list shows queue order.
pub fn drag_enabled(field: PendingSortField) -> bool {
    field == PendingSortField::Position
}

/// Positions for `order` (top to bottom) such that sorting by position in
/// `direction` reproduces it.
pub fn renumber(order: &[QueueItemId], direction: SortDirection) -> Vec<ReorderEntry> {
    let n = order.len() as i32;
    order
        .iter()
        .enumerate()
        .map(|(i, id)| ReorderEntry {
            id: *id,
            position: match direction {
                SortDirection::Asc => i as i32 + 1,
                SortDirection::Desc => n - i as i32,
            },
        })
        .collect()
}

/// Move the row at `from` to index `to` of the visible pending list and
/// renumber the whole queue.
///
/// `queue` is every pending item in display order; `visible` is the subset
/// on screen after client-side filters. Hidden items keep their slots and
/// the moved rows fill the slots the visible rows held, so positions stay
/// dense across the full queue. Returns `None` when nothing moves.
pub fn plan_reorder(
    queue: &[QueueItem],
    visible: &[QueueItem],
    from: usize,
    to: usize,
    direction: SortDirection,
) -> Result<Option<Vec<ReorderEntry>>> {
    let len = visible.len();
    if from >= len || to >= len {
        return Err(FleetError::ReorderUnavailable(format!(
            "index {} out of range for {len} items",
            from.max(to)
        )));
    }
    if from == to {
        return Ok(None);
    }
    let mut moved: Vec<QueueItemId> = visible.iter().map(|i| i.id).collect();
    let id = moved.remove(from);
    moved.insert(to, id);
    let order = splice_visible(queue, &moved)?;
    Ok(Some(renumber(&order, direction)))
}

/// Lay `moved` over the slots its items occupy in `queue`.
fn splice_visible(queue: &[QueueItem], moved: &[QueueItemId]) -> Result<Vec<QueueItemId>> {
    let shown: BTreeSet<QueueItemId> = moved.iter().copied().collect();
    let slots = queue.iter().filter(|i| shown.contains(&i.id)).count();
    if slots != moved.len() {
        return Err(FleetError::ReorderUnavailable(
            "visible rows are not all in the pending queue".into(),
        ));
    }
    let mut next = moved.iter().copied();
    Ok(queue
        .iter()
        .map(|item| {
            if shown.contains(&item.id) {
                next.next().unwrap_or(item.id)
            } else {
                item.id
            }
        })
        .collect())
}

/// Drag `dragged` onto the row currently holding `over`.
pub fn plan_drop(
    queue: &[QueueItem],
    visible: &[QueueItem],
    dragged: QueueItemId,
    over: QueueItemId,
    direction: SortDirection,
) -> Result<Option<Vec<ReorderEntry>>> {
    let from = index_of(visible, dragged)?;
    let to = index_of(visible, over)?;
    plan_reorder(queue, visible, from, to, direction)
}

/// One-step move for keyboard reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

/// Move `id` one visible row up or down. `None` at the ends of the list.
pub fn plan_step(
    queue: &[QueueItem],
    visible: &[QueueItem],
    id: QueueItemId,
    step: Step,
    direction: SortDirection,
) -> Result<Option<Vec<ReorderEntry>>> {
    let from = index_of(visible, id)?;
    let to = match step {
        Step::Up if from == 0 => return Ok(None),
        Step::Up => from - 1,
        Step::Down if from + 1 >= visible.len() => return Ok(None),
        Step::Down => from + 1,
    };
    plan_reorder(queue, visible, from, to, direction)
}

fn index_of(visible: &[QueueItem], id: QueueItemId) -> Result<usize> {
    visible
        .iter()
        .position(|i| i.id == id)
        .ok_or(FleetError::ItemNotFound(id))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testing::{base_time, item};
    use printfleet_core::types::QueueStatus;

    fn ctx() -> TimeContext {
        TimeContext::new(base_time(), Some(Duration::days(180)))
    }

    fn ids(items: &[QueueItem]) -> Vec<i64> {
        items.iter().map(|i| i.id.0).collect()
    }

    fn sample() -> Vec<QueueItem> {
        let now = base_time();
        vec![
            item(1, QueueStatus::Pending).name("beta").printer(2).position(3).build(),
            item(2, QueueStatus::Pending)
                .name("Alpha")
                .printer(5)
                .printer_name("zeta")
                .position(1)
                .scheduled(now + Duration::hours(2))
                .build(),
            item(3, QueueStatus::Pending)
                .name("alpha")
                .position(2)
                .scheduled(now + Duration::days(3650))
                .build(),
            item(4, QueueStatus::Pending)
                .name("Gamma")
                .model("P1S")
                .position(2)
                .scheduled(now + Duration::hours(1))
                .build(),
        ]
    }

    #[test]
    fn sorting_is_idempotent_for_every_field_and_direction() {
        let time = ctx();
        for field in PendingSortField::ALL {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let mut once = sample();
                sort_pending(&mut once, field, direction, &time);
                let mut twice = once.clone();
                sort_pending(&mut twice, field, direction, &time);
                assert_eq!(ids(&once), ids(&twice), "{field:?} {direction:?}");
            }
        }
        for field in HistorySortField::ALL {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let mut once = sample();
                sort_history(&mut once, field, direction);
                let mut twice = once.clone();
                sort_history(&mut twice, field, direction);
                assert_eq!(ids(&once), ids(&twice), "{field:?} {direction:?}");
            }
        }
    }

    #[test]
    fn position_ties_break_on_id() {
        let mut items = sample();
        sort_pending(&mut items, PendingSortField::Position, SortDirection::Asc, &ctx());
        assert_eq!(ids(&items), vec![2, 3, 4, 1]);
    }

    #[test]
    fn descending_flips_only_the_primary_key() {
        let mut items = sample();
        sort_pending(&mut items, PendingSortField::Position, SortDirection::Desc, &ctx());
        // 3 and 4 share position 2 and keep ascending id order.
        assert_eq!(ids(&items), vec![1, 3, 4, 2]);
    }

    #[test]
    fn names_compare_case_insensitively() {
        let mut items = sample();
        sort_pending(&mut items, PendingSortField::Name, SortDirection::Asc, &ctx());
        // "Alpha"(pos 1) and "alpha"(pos 2) tie on name, then position.
        assert_eq!(ids(&items), vec![2, 3, 1, 4]);
    }

    #[test]
    fn printer_sort_uses_target_label() {
        let mut items = sample();
        sort_pending(&mut items, PendingSortField::Printer, SortDirection::Asc, &ctx());
        // "Any P1S", "Printer 2", "Unassigned", "zeta"
        assert_eq!(ids(&items), vec![4, 1, 3, 2]);
    }

    #[test]
    fn placeholder_and_asap_times_sort_first() {
        let mut items = sample();
        sort_pending(&mut items, PendingSortField::Time, SortDirection::Asc, &ctx());
        // 1 (ASAP) and 3 (placeholder) collapse to epoch; position breaks the tie.
        assert_eq!(ids(&items), vec![3, 1, 4, 2]);
    }

    #[test]
    fn without_horizon_far_future_is_literal() {
        let mut items = sample();
        let time = TimeContext::new(base_time(), None);
        sort_pending(&mut items, PendingSortField::Time, SortDirection::Asc, &time);
        assert_eq!(ids(&items), vec![1, 4, 2, 3]);
    }

    #[test]
    fn history_defaults_to_newest_first() {
        let now = base_time();
        let mut items = vec![
            item(1, QueueStatus::Completed).completed(now - Duration::hours(5)).build(),
            item(2, QueueStatus::Failed).completed(now - Duration::hours(1)).build(),
            // Never completed: falls back to created_at, two days back.
            item(3, QueueStatus::Cancelled).build(),
        ];
        sort_history(&mut items, HistorySortField::Date, SortDirection::Desc);
        assert_eq!(ids(&items), vec![2, 1, 3]);

        sort_history(&mut items, HistorySortField::Status, SortDirection::Asc);
        assert_eq!(ids(&items), vec![3, 1, 2]);
    }

    #[test]
    fn drag_only_in_position_order() {
        assert!(drag_enabled(PendingSortField::Position));
        assert!(!drag_enabled(PendingSortField::Name));
        assert!(!drag_enabled(PendingSortField::Printer));
        assert!(!drag_enabled(PendingSortField::Time));
    }

    #[test]
    fn dragging_last_onto_first() {
        let visible = vec![
            item(1, QueueStatus::Pending).name("A").build(),
            item(2, QueueStatus::Pending).name("B").build(),
            item(3, QueueStatus::Pending).name("C").build(),
        ];
        let plan = plan_drop(&visible, &visible, QueueItemId(3), QueueItemId(1), SortDirection::Asc)
            .expect("plan")
            .expect("moved");
        assert_eq!(
            plan,
            vec![
                ReorderEntry { id: QueueItemId(3), position: 1 },
                ReorderEntry { id: QueueItemId(1), position: 2 },
                ReorderEntry { id: QueueItemId(2), position: 3 },
            ]
        );
    }

    #[test]
    fn renumbering_is_contiguous_and_reproduces_visual_order() {
        let time = ctx();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let mut visible: Vec<QueueItem> = (1..=6)
                .map(|id| item(id, QueueStatus::Pending).position((id * 10) as i32).build())
                .collect();
            sort_pending(&mut visible, PendingSortField::Position, direction, &time);

            let plan = plan_reorder(&visible, &visible, 4, 1, direction)
                .expect("plan")
                .expect("moved");
            let mut positions: Vec<i32> = plan.iter().map(|e| e.position).collect();
            positions.sort_unstable();
            assert_eq!(positions, (1..=6).collect::<Vec<_>>());

            let expected: Vec<QueueItemId> = plan.iter().map(|e| e.id).collect();
            for entry in &plan {
                if let Some(target) = visible.iter_mut().find(|i| i.id == entry.id) {
                    target.position = entry.position;
                }
            }
            sort_pending(&mut visible, PendingSortField::Position, direction, &time);
            assert_eq!(visible.iter().map(|i| i.id).collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn descending_assigns_highest_position_to_top() {
        let order = [QueueItemId(7), QueueItemId(8), QueueItemId(9)];
        let plan = renumber(&order, SortDirection::Desc);
        assert_eq!(
            plan.iter().map(|e| e.position).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
    }

    #[test]
    fn dropping_in_place_is_a_noop() {
        let visible = vec![item(1, QueueStatus::Pending).build()];
        assert_eq!(
            plan_reorder(&visible, &visible, 0, 0, SortDirection::Asc).expect("plan"),
            None
        );
        assert!(plan_reorder(&visible, &visible, 0, 3, SortDirection::Asc).is_err());
        assert!(matches!(
            plan_drop(&visible, &visible, QueueItemId(9), QueueItemId(1), SortDirection::Asc),
            Err(FleetError::ItemNotFound(_))
        ));
    }

    #[test]
    fn keyboard_steps_stop_at_the_edges() {
        let visible: Vec<QueueItem> = (1..=3)
            .map(|id| item(id, QueueStatus::Pending).build())
            .collect();
        assert_eq!(
            plan_step(&visible, &visible, QueueItemId(1), Step::Up, SortDirection::Asc).expect("plan"),
            None
        );
        assert_eq!(
            plan_step(&visible, &visible, QueueItemId(3), Step::Down, SortDirection::Asc).expect("plan"),
            None
        );
        let plan = plan_step(&visible, &visible, QueueItemId(2), Step::Up, SortDirection::Asc)
            .expect("plan")
            .expect("moved");
        assert_eq!(
            plan.iter().map(|e| e.id.0).collect::<Vec<_>>(),
            vec![2, 1, 3]
        );
    }

    #[test]
    fn hidden_rows_keep_their_slots() {
        let queue: Vec<QueueItem> = (1..=4)
            .map(|id| item(id, QueueStatus::Pending).build())
            .collect();
        let visible = vec![queue[0].clone(), queue[2].clone()];

        let plan = plan_drop(&queue, &visible, QueueItemId(3), QueueItemId(1), SortDirection::Asc)
            .expect("plan")
            .expect("moved");
        assert_eq!(
            plan.iter().map(|e| (e.id.0, e.position)).collect::<Vec<_>>(),
            vec![(3, 1), (2, 2), (1, 3), (4, 4)]
        );

        let plan = plan_step(&queue, &visible, QueueItemId(1), Step::Down, SortDirection::Desc)
            .expect("plan")
            .expect("moved");
        assert_eq!(
            plan.iter().map(|e| (e.id.0, e.position)).collect::<Vec<_>>(),
            vec![(3, 4), (2, 3), (1, 2), (4, 1)]
        );
    }

    #[test]
    fn visible_rows_must_belong_to_the_queue() {
        let queue = vec![item(1, QueueStatus::Pending).build()];
        let visible = vec![
            item(1, QueueStatus::Pending).build(),
            item(2, QueueStatus::Pending).build(),
        ];
        assert!(matches!(
            plan_reorder(&queue, &visible, 1, 0, SortDirection::Asc),
            Err(FleetError::ReorderUnavailable(_))
        ));
    }
}
