// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures: item builders, a recording in-memory backend and a
// recording toast sink.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use printfleet_core::error::{FleetError, Result};
use tokio::sync::Semaphore;
use printfleet_core::toast::{Toast, ToastSink};
use printfleet_core::types::{
    ExecutionOptions, Printer, PrinterId, QueueItem, QueueItemCreate, QueueItemId, QueueStatus,
    ReorderEntry,
};

use crate::client::QueueApi;
use crate::filter::QueueQuery;
use crate::selection::{BulkUpdateRequest, BulkUpdateResponse};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap()
}

pub struct ItemBuilder {
    item: QueueItem,
}

pub fn item(id: i64, status: QueueStatus) -> ItemBuilder {
    ItemBuilder {
        item: QueueItem {
            id: QueueItemId(id),
            status,
            position: id as i32,
            printer_id: None,
            printer_name: None,
            target_model: None,
            target_location: None,
            waiting_reason: None,
            archive_id: Some(100 + id),
            archive_name: Some(format!("job-{id}")),
            library_file_id: None,
            library_file_name: None,
            plate_id: None,
            print_time_seconds: None,
            scheduled_time: None,
            options: ExecutionOptions::default(),
            created_by_id: None,
            created_by_username: None,
            created_at: base_time() - chrono::Duration::hours(48) + chrono::Duration::minutes(id),
            started_at: None,
            completed_at: None,
            error_message: None,
        },
    }
}

impl ItemBuilder {
    pub fn printer(mut self, id: i64) -> Self {
        self.item.printer_id = Some(PrinterId(id));
        self.item.printer_name = Some(format!("Printer {id}"));
        self
    }

    pub fn printer_name(mut self, name: &str) -> Self {
        self.item.printer_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.item.target_model = Some(model.into());
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.item.target_location = Some(location.into());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.item.archive_name = Some(name.into());
        self
    }

    pub fn position(mut self, position: i32) -> Self {
        self.item.position = position;
        self
    }

    pub fn scheduled(mut self, at: DateTime<Utc>) -> Self {
        self.item.scheduled_time = Some(at);
        self
    }

    pub fn completed(mut self, at: DateTime<Utc>) -> Self {
        self.item.completed_at = Some(at);
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.item.created_at = at;
        self
    }

    pub fn owner(mut self, id: i64) -> Self {
        self.item.created_by_id = Some(id);
        self
    }

    pub fn staged(mut self) -> Self {
        self.item.options.manual_start = true;
        self
    }

    pub fn build(self) -> QueueItem {
        self.item
    }
}

pub fn printer(id: i64, name: &str, location: Option<&str>) -> Printer {
    Printer {
        id: PrinterId(id),
        name: name.into(),
        model: Some("X1C".into()),
        location: location.map(Into::into),
    }
}

/// A backend call as seen by [`FakeApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(QueueQuery),
    Printers,
    Reorder(Vec<ReorderEntry>),
    BulkUpdate(serde_json::Value),
    Cancel(QueueItemId),
    Stop(QueueItemId),
    Start(QueueItemId),
    Remove(QueueItemId),
    Create(QueueItemCreate),
}

/// In-memory backend that records every call.
#[derive(Default)]
pub struct FakeApi {
    items: Mutex<Vec<QueueItem>>,
    printers: Mutex<Vec<Printer>>,
    calls: Mutex<Vec<Call>>,
    fail_list: Mutex<bool>,
    /// Calls that should fail, keyed by `(operation, id)`.
    failures: Mutex<HashSet<(&'static str, i64)>>,
    next_id: Mutex<i64>,
    /// Held list calls wait here after being recorded.
    list_gate: Mutex<Option<Arc<Semaphore>>>,
    /// Held mutating calls wait here after being recorded.
    mutation_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeApi {
    pub fn with_items(items: Vec<QueueItem>) -> Self {
        let next = items.iter().map(|i| i.id.0).max().unwrap_or(0) + 1;
        let api = Self::default();
        *api.items.lock().unwrap() = items;
        *api.next_id.lock().unwrap() = next;
        api
    }

    pub fn set_items(&self, items: Vec<QueueItem>) {
        *self.items.lock().unwrap() = items;
    }

    pub fn set_printers(&self, printers: Vec<Printer>) {
        *self.printers.lock().unwrap() = printers;
    }

    pub fn fail_listing(&self, fail: bool) {
        *self.fail_list.lock().unwrap() = fail;
    }

    pub fn fail_on(&self, operation: &'static str, id: i64) {
        self.failures.lock().unwrap().insert((operation, id));
    }

    /// Hold every later `list_queue` call until a permit is added to the
    /// returned gate.
    pub fn gate_listing(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.list_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Like [`gate_listing`](Self::gate_listing), for every mutating call.
    pub fn gate_mutations(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.mutation_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than list/printers fetches.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List(_) | Call::Printers))
            .collect()
    }

    pub fn list_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn items(&self) -> Vec<QueueItem> {
        self.items.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass(gate: &Mutex<Option<Arc<Semaphore>>>) {
        let gate = gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }

    async fn mutate(&self, call: Call) {
        self.record(call);
        Self::pass(&self.mutation_gate).await;
    }

    fn check(&self, operation: &'static str, id: i64) -> Result<()> {
        if self.failures.lock().unwrap().contains(&(operation, id)) {
            return Err(FleetError::Api {
                status: 500,
                detail: format!("{operation} failed for {id}"),
            });
        }
        Ok(())
    }

    fn set_status(&self, id: QueueItemId, status: QueueStatus) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(FleetError::Api {
                status: 404,
                detail: "Queue item not found".into(),
            })?;
        item.status = status;
        Ok(())
    }
}

#[async_trait]
impl QueueApi for FakeApi {
    async fn list_queue(&self, query: &QueueQuery) -> Result<Vec<QueueItem>> {
        self.record(Call::List(*query));
        Self::pass(&self.list_gate).await;
        if *self.fail_list.lock().unwrap() {
            return Err(FleetError::Http("connection refused".into()));
        }
        let items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|i| match query.printer_id {
                None => true,
                Some(-1) => i.is_unassigned(),
                Some(id) => i.printer_id == Some(PrinterId(id)),
            })
            .filter(|i| query.status.is_none_or(|s| i.status == s))
            .cloned()
            .collect())
    }

    async fn list_printers(&self) -> Result<Vec<Printer>> {
        self.record(Call::Printers);
        if *self.fail_list.lock().unwrap() {
            return Err(FleetError::Http("connection refused".into()));
        }
        Ok(self.printers.lock().unwrap().clone())
    }

    async fn reorder(&self, entries: &[ReorderEntry]) -> Result<()> {
        self.mutate(Call::Reorder(entries.to_vec())).await;
        self.check("reorder", 0)?;
        let mut items = self.items.lock().unwrap();
        for entry in entries {
            if let Some(item) = items.iter_mut().find(|i| i.id == entry.id) {
                item.position = entry.position;
            }
        }
        Ok(())
    }

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<BulkUpdateResponse> {
        self.mutate(Call::BulkUpdate(
            serde_json::to_value(request).expect("encode bulk request"),
        ))
        .await;
        self.check("bulk_update", 0)?;
        Ok(BulkUpdateResponse {
            message: format!("Updated {} items", request.item_ids.len()),
        })
    }

    async fn cancel(&self, id: QueueItemId) -> Result<()> {
        self.mutate(Call::Cancel(id)).await;
        self.check("cancel", id.0)?;
        self.set_status(id, QueueStatus::Cancelled)
    }

    async fn stop(&self, id: QueueItemId) -> Result<()> {
        self.mutate(Call::Stop(id)).await;
        self.check("stop", id.0)?;
        self.set_status(id, QueueStatus::Cancelled)
    }

    async fn start(&self, id: QueueItemId) -> Result<()> {
        self.mutate(Call::Start(id)).await;
        self.check("start", id.0)?;
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.options.manual_start = false;
        }
        Ok(())
    }

    async fn remove(&self, id: QueueItemId) -> Result<()> {
        self.mutate(Call::Remove(id)).await;
        self.check("remove", id.0)?;
        self.items.lock().unwrap().retain(|i| i.id != id);
        Ok(())
    }

    async fn create(&self, body: &QueueItemCreate) -> Result<QueueItem> {
        self.mutate(Call::Create(body.clone())).await;
        self.check("create", body.archive_id.unwrap_or(0))?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            let id = *next;
            *next += 1;
            id
        };
        let mut created = item(id, QueueStatus::Pending).build();
        created.archive_id = body.archive_id;
        created.library_file_id = body.library_file_id;
        created.printer_id = body.printer_id;
        created.options = body.options;
        self.items.lock().unwrap().push(created.clone());
        Ok(created)
    }
}

/// Toast sink that remembers everything shown.
#[derive(Default)]
pub struct RecordingToasts {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToasts {
    pub fn all(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.lock().unwrap().last().cloned()
    }
}

impl ToastSink for RecordingToasts {
    fn show_toast(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}
