use crate::shared::infrastructure::event_bus::{EventBus, OutboundMessage, PublishError};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryEventBus {
    pub published: Mutex<Vec<(String, OutboundMessage)>>,
    offline: AtomicBool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<(), PublishError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PublishError::Unreachable("Event bus offline".into()));
        }
        self.published.lock().await.push((topic.to_string(), message));
        Ok(())
    }
}
