use crate::shared::infrastructure::outbox::OutboxEntry;
use serde_json::json;

/// An unprocessed entry with a small placeholder payload.
pub fn make_outbox_entry(event_type: &str) -> OutboxEntry {
    OutboxEntry::new(event_type, &json!({"productId": "WIDGET"}), None).expect("outbox entry")
}
