//! # Notifier
//!
//! The detached queue in front of the relay. `enqueue` returns immediately;
//! a worker task drains the queue and posts each event. There is explicitly
//! NO retry policy: the relay is a courtesy channel and the customer not
//! getting an email is an accepted outcome. What is not accepted is the
//! order flow ever waiting on, or failing because of, this channel.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::NotifyEvent;

/// How many events may sit in the queue before new ones are dropped.
/// A tiny shop never gets near this; it exists so a dead relay cannot
/// grow memory without bound.
const QUEUE_CAPACITY: usize = 256;

/// Handle for enqueueing relay events. Cheap to clone.
///
/// Dropping every handle closes the queue; the worker drains what is left
/// and exits.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<NotifyEvent>,
}

impl Notifier {
    /// Spawns the worker and returns the handle pair.
    pub fn spawn(relay_base_url: impl Into<String>) -> (Notifier, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let worker = tokio::spawn(run_worker(relay_base_url.into(), rx));
        (Notifier { tx }, worker)
    }

    /// Queues an event. Never blocks, never fails the caller: a full or
    /// closed queue drops the event with a warning.
    pub fn enqueue(&self, event: NotifyEvent) {
        let kind = event.kind();
        if let Err(err) = self.tx.try_send(event) {
            warn!(kind, error = %err, "Notification dropped");
        }
    }
}

/// Drains the queue until every [`Notifier`] handle is gone.
async fn run_worker(base_url: String, mut rx: mpsc::Receiver<NotifyEvent>) {
    let client = reqwest::Client::new();
    info!(relay = %base_url, "Notification worker started");

    while let Some(event) = rx.recv().await {
        let url = format!("{}{}", base_url.trim_end_matches('/'), event.endpoint());
        let kind = event.kind();

        match client.post(&url).json(&event).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(kind, "Notification relayed");
            }
            Ok(response) => {
                warn!(kind, status = %response.status(), "Relay rejected notification");
            }
            Err(err) => {
                warn!(kind, error = %err, "Relay unreachable, notification lost");
            }
        }
    }

    info!("Notification worker stopped");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn paid_event() -> NotifyEvent {
        NotifyEvent::OrderPaid {
            email: "a@b.ca".to_string(),
            name: "A".to_string(),
            order_code: "ABC-123".to_string(),
        }
    }

    /// enqueue must not fail the caller even when nothing is listening:
    /// the relay being down is invisible to the order flow.
    #[tokio::test]
    async fn test_enqueue_never_fails_caller() {
        let (notifier, worker) = Notifier::spawn("http://127.0.0.1:9"); // nothing there
        notifier.enqueue(paid_event());
        notifier.enqueue(paid_event());

        drop(notifier);
        // Worker drains the queue (both posts fail, both are swallowed)
        // and exits once the handles are gone.
        worker.await.expect("worker exits cleanly");
    }

    #[tokio::test]
    async fn test_worker_stops_when_handles_dropped() {
        let (notifier, worker) = Notifier::spawn("http://127.0.0.1:9");
        drop(notifier);
        worker.await.expect("worker exits cleanly");
    }
}
