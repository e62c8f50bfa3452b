// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP client for the fleet backend's queue endpoints.
//
// `QueueApi` is the seam the store talks through; `HttpQueueClient` is the
// reqwest implementation used by the app.

use std::time::Duration;

use async_trait::async_trait;
use printfleet_core::error::{FleetError, Result};
use printfleet_core::types::{Printer, QueueItem, QueueItemCreate, QueueItemId, ReorderEntry};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::filter::QueueQuery;
use crate::selection::{BulkUpdateRequest, BulkUpdateResponse};

/// Backend operations the queue needs.
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// `GET /queue/` narrowed by printer and status.
    async fn list_queue(&self, query: &QueueQuery) -> Result<Vec<QueueItem>>;

    /// `GET /printers/`.
    async fn list_printers(&self) -> Result<Vec<Printer>>;

    /// `POST /queue/reorder` with every pending item's new position.
    async fn reorder(&self, entries: &[ReorderEntry]) -> Result<()>;

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<BulkUpdateResponse>;

    async fn cancel(&self, id: QueueItemId) -> Result<()>;

    async fn stop(&self, id: QueueItemId) -> Result<()>;

    /// Release a staged item so the scheduler may pick it up.
    async fn start(&self, id: QueueItemId) -> Result<()>;

    async fn remove(&self, id: QueueItemId) -> Result<()>;

    /// `POST /queue/`. Used to requeue finished jobs.
    async fn create(&self, body: &QueueItemCreate) -> Result<QueueItem>;
}

/// reqwest-backed [`QueueApi`].
#[derive(Debug, Clone)]
pub struct HttpQueueClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpQueueClient {
    /// Build a client for `base_url` (e.g. `http://host:8000/api/v1`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = parse_base(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FleetError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` (no leading slash) against the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| FleetError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn post_empty(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(path)?)
            .send()
            .await
            .map_err(http_err)?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl QueueApi for HttpQueueClient {
    #[instrument(skip(self), fields(base = %self.base))]
    async fn list_queue(&self, query: &QueueQuery) -> Result<Vec<QueueItem>> {
        let response = self
            .http
            .get(self.url("queue/")?)
            .query(&query.params())
            .send()
            .await
            .map_err(http_err)?;
        let items: Vec<QueueItem> = decode(check(response).await?).await?;
        debug!(count = items.len(), "fetched queue");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn list_printers(&self) -> Result<Vec<Printer>> {
        let response = self
            .http
            .get(self.url("printers/")?)
            .send()
            .await
            .map_err(http_err)?;
        decode(check(response).await?).await
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn reorder(&self, entries: &[ReorderEntry]) -> Result<()> {
        let response = self
            .http
            .post(self.url("queue/reorder")?)
            .json(entries)
            .send()
            .await
            .map_err(http_err)?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(count = request.item_ids.len()))]
    async fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<BulkUpdateResponse> {
        let response = self
            .http
            .post(self.url("queue/bulk-update")?)
            .json(request)
            .send()
            .await
            .map_err(http_err)?;
        decode(check(response).await?).await
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: QueueItemId) -> Result<()> {
        self.post_empty(&format!("queue/{id}/cancel")).await
    }

    #[instrument(skip(self))]
    async fn stop(&self, id: QueueItemId) -> Result<()> {
        self.post_empty(&format!("queue/{id}/stop")).await
    }

    #[instrument(skip(self))]
    async fn start(&self, id: QueueItemId) -> Result<()> {
        self.post_empty(&format!("queue/{id}/start")).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: QueueItemId) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("queue/{id}"))?)
            .send()
            .await
            .map_err(http_err)?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, body))]
    async fn create(&self, body: &QueueItemCreate) -> Result<QueueItem> {
        let response = self
            .http
            .post(self.url("queue/")?)
            .json(body)
            .send()
            .await
            .map_err(http_err)?;
        decode(check(response).await?).await
    }
}

/// Validate the configured base URL and make sure it ends in `/` so that
/// relative joins append instead of replacing the last segment.
fn parse_base(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| FleetError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FleetError::InvalidUrl(format!(
            "{raw}: unsupported scheme '{other}'"
        ))),
    }
}

fn http_err(e: reqwest::Error) -> FleetError {
    if e.is_decode() {
        FleetError::Decode(e.to_string())
    } else {
        FleetError::Http(e.to_string())
    }
}

/// Pass successful responses through; turn anything else into
/// [`FleetError::Api`] with the server's `detail`.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();
    Err(FleetError::Api {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(http_err)?;
    serde_json::from_slice(&bytes).map_err(|e| FleetError::Decode(e.to_string()))
}

/// Pull a human-readable message out of an error body.
///
/// Handles `{"detail": "..."}`, validation errors shaped as
/// `{"detail": [{"msg": "..."}, ...]}`, and plain-text bodies.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    match value.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(entries)) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = HttpQueueClient::new("http://fleet:8000/api/v1", Duration::from_secs(5))
            .expect("client");
        assert_eq!(client.base_url().as_str(), "http://fleet:8000/api/v1/");
        assert_eq!(
            client.url("queue/").expect("url").as_str(),
            "http://fleet:8000/api/v1/queue/"
        );
        assert_eq!(
            client.url("queue/7/cancel").expect("url").as_str(),
            "http://fleet:8000/api/v1/queue/7/cancel"
        );
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let client =
            HttpQueueClient::new("https://fleet/api/v1/", Duration::from_secs(5)).expect("client");
        assert_eq!(
            client.url("printers/").expect("url").as_str(),
            "https://fleet/api/v1/printers/"
        );
    }

    #[test]
    fn bad_urls_are_rejected() {
        assert!(matches!(
            HttpQueueClient::new("not a url", Duration::from_secs(5)),
            Err(FleetError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpQueueClient::new("ftp://fleet/api", Duration::from_secs(5)),
            Err(FleetError::InvalidUrl(_))
        ));
    }

    #[test]
    fn detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "Queue item not found"}"#).as_deref(),
            Some("Queue item not found")
        );
    }

    #[test]
    fn detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "item_ids"], "msg": "field required"},
                                  {"loc": ["body"], "msg": "bad value"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; bad value")
        );
    }

    #[test]
    fn detail_falls_back_to_plain_text() {
        assert_eq!(
            extract_detail("Internal Server Error").as_deref(),
            Some("Internal Server Error")
        );
        assert_eq!(extract_detail("   "), None);
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);
    }
}
