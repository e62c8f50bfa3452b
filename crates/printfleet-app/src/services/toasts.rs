// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Toast sink that hands notifications to the UI over a channel.

use std::sync::Arc;

use printfleet_core::toast::{LogToastSink, Toast, ToastSink};
use tokio::sync::{Mutex, mpsc};

/// Sending half, installed as the dispatcher's sink.
pub struct UiToasts {
    tx: mpsc::UnboundedSender<Toast>,
}

/// Receiving half, drained by the toast host component.
pub type ToastReceiver = Arc<Mutex<mpsc::UnboundedReceiver<Toast>>>;

pub fn channel() -> (UiToasts, ToastReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiToasts { tx }, Arc::new(Mutex::new(rx)))
}

impl ToastSink for UiToasts {
    fn show_toast(&self, toast: Toast) {
        LogToastSink.show_toast(toast.clone());
        if self.tx.send(toast).is_err() {
            tracing::debug!("toast host gone, dropping toast");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toasts_arrive_in_order() {
        let (sink, rx) = channel();
        sink.show_toast(Toast::success("one"));
        sink.show_toast(Toast::error("two"));

        let mut rx = rx.lock().await;
        assert_eq!(rx.recv().await, Some(Toast::success("one")));
        assert_eq!(rx.recv().await, Some(Toast::error("two")));
    }
}
