use std::sync::Arc;
use std::time::Duration;

use counter_logging::engine_warn;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::{BatchSource, EngineEvent};

const EVENT_BUFFER: usize = 8;

/// Runs one fetch per tick. A tick that comes due while a fetch is still
/// running is dropped, so cycles never overlap.
pub struct Poller {
    source: Arc<dyn BatchSource>,
    interval: Duration,
}

impl Poller {
    pub fn new(source: Arc<dyn BatchSource>, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// Start polling on the current runtime. Polling stops once the
    /// returned receiver is dropped.
    pub fn spawn(self) -> mpsc::Receiver<EngineEvent> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(self.run(event_tx));
        event_rx
    }

    pub async fn run(self, event_tx: mpsc::Sender<EngineEvent>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let event = self.poll_once().await;
            if event_tx.send(event).await.is_err() {
                break;
            }
        }
    }

    pub async fn poll_once(&self) -> EngineEvent {
        match self.source.fetch_batch().await {
            Ok(posts) => EngineEvent::BatchFetched(posts),
            Err(err) => {
                engine_warn!("Fetch failed: {}", err);
                EngineEvent::FetchFailed(err)
            }
        }
    }
}
