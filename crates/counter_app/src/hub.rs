use counter_core::StatusView;
use tokio::sync::{broadcast, RwLock};

const STATUS_BUFFER: usize = 16;

/// Latest published status plus the fan-out channel observers subscribe to.
pub struct StatusHub {
    current: RwLock<StatusView>,
    tx: broadcast::Sender<StatusView>,
}

impl StatusHub {
    pub fn new(initial: StatusView) -> Self {
        let (tx, _) = broadcast::channel(STATUS_BUFFER);
        Self {
            current: RwLock::new(initial),
            tx,
        }
    }

    pub async fn publish(&self, view: StatusView) {
        *self.current.write().await = view.clone();
        // No subscribers is fine; the snapshot is still updated.
        let _ = self.tx.send(view);
    }

    pub async fn current(&self) -> StatusView {
        self.current.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusView> {
        self.tx.subscribe()
    }
}
