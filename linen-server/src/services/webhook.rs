//! History Webhook Notifier
//!
//! Post-commit notifications from the stock mutation service are queued on a
//! channel and pushed to the configured GAS webhook by a background worker.
//! Pushes are fire-and-forget: a failed push is logged and never reaches the
//! mutation that produced it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::db::repository::{item, stock};
use crate::services::settings::{HISTORY_WEBHOOK_URL, SettingsService};

/// One queued push
#[derive(Debug, Clone)]
pub struct Notification {
    /// Free-text description of the change that triggered the push
    pub detail: String,
}

/// Cloneable enqueue handle; the receiver half is taken once by the worker.
#[derive(Debug, Clone)]
pub struct HistoryNotifier {
    tx: mpsc::UnboundedSender<Notification>,
    rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<Notification>>>>,
}

impl HistoryNotifier {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(Some(rx))),
        }
    }

    /// Enqueue a push. Never blocks; with no worker running the notification
    /// is dropped (log only).
    pub fn notify(&self, detail: impl Into<String>) {
        let notification = Notification {
            detail: detail.into(),
        };
        if self.tx.send(notification).is_err() {
            tracing::warn!("History webhook worker is not running, notification dropped");
        }
    }

    /// Take the receiver half. Only the first caller gets it.
    pub fn take_receiver(&self) -> Option<mpsc::UnboundedReceiver<Notification>> {
        self.rx.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Default for HistoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Background worker loop: drain the queue until shutdown.
pub async fn run_worker(
    pool: SqlitePool,
    settings: SettingsService,
    notifier: HistoryNotifier,
    cancel: CancellationToken,
    timeout_ms: u64,
) {
    let Some(mut rx) = notifier.take_receiver() else {
        tracing::error!("History webhook receiver already taken, worker not started");
        return;
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            msg = rx.recv() => {
                match msg {
                    Some(notification) => push(&pool, &settings, &notification, timeout_ms).await,
                    None => break,
                }
            }
        }
    }
}

/// Best-effort push of the full current snapshot (by item display name) plus
/// timestamp and detail. Every failure path logs and returns.
async fn push(
    pool: &SqlitePool,
    settings: &SettingsService,
    notification: &Notification,
    timeout_ms: u64,
) {
    let url = match settings.get(HISTORY_WEBHOOK_URL).await {
        Ok(url) if !url.is_empty() => url,
        Ok(_) => {
            tracing::debug!("HISTORY_WEBHOOK_URL not configured, skipping push");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read webhook URL setting");
            return;
        }
    };

    let items = match item::find_all(pool).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load items for webhook push");
            return;
        }
    };
    let snapshots = match stock::find_all_snapshots(pool).await {
        Ok(snapshots) => snapshots,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load snapshots for webhook push");
            return;
        }
    };

    let mut params: Vec<(String, String)> = vec![
        ("date".into(), shared::util::date_slash(shared::util::today())),
        ("time".into(), shared::util::now_hhmm()),
        ("detail".into(), notification.detail.clone()),
    ];
    for item in &items {
        let count = snapshots
            .iter()
            .find(|s| s.item_id == item.id)
            .map(|s| s.shelf_count)
            .unwrap_or(0);
        params.push((item.name.clone(), count.to_string()));
    }

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build webhook HTTP client");
            return;
        }
    };

    // GAS webhook convention: GET with query params, redirects followed
    match client.get(&url).query(&params).send().await {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!(detail = %notification.detail, "History webhook pushed");
        }
        Ok(resp) => {
            tracing::warn!(status = %resp.status(), "History webhook returned non-success status");
        }
        Err(e) => {
            tracing::warn!(error = %e, "History webhook push failed");
        }
    }
}
