use serde::{Deserialize, Serialize};

/// Correlation identifiers of the operation that produced an outbox entry.
///
/// Ids are kept as lowercase hex (32 chars for the trace, 16 for the span), the
/// shape used by the W3C `traceparent` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
}

impl TraceContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
        }
    }

    /// Parses `00-<trace-id>-<span-id>-<flags>`. All-zero ids are invalid.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;
        if parts.next().is_some() || version != "00" || !is_hex(flags, 2) {
            return None;
        }
        if !is_hex(trace_id, 32) || !is_hex(span_id, 16) {
            return None;
        }
        if is_all_zero(trace_id) || is_all_zero(span_id) {
            return None;
        }
        Some(Self::new(
            trace_id.to_ascii_lowercase(),
            span_id.to_ascii_lowercase(),
        ))
    }

    pub fn to_traceparent(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(format!("00-{}-{}-01", self.trace_id, self.span_id))
    }

    pub fn is_empty(&self) -> bool {
        self.trace_id.is_empty() || self.span_id.is_empty()
    }
}

fn is_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_all_zero(value: &str) -> bool {
    value.chars().all(|c| c == '0')
}
