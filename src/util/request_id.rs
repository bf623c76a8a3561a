//! Request ID generation for tracing connections through logs.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counter for short request IDs.
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifier attached to connection-scoped log events.
#[derive(Clone, Debug)]
pub struct RequestId(String);

impl RequestId {
    /// Globally unique ID, suitable for distributed tracing.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Process-local ID, cheaper than a UUID. Format: `req-<hex counter>`.
    pub fn short() -> Self {
        let count = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("req-{count:016x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
