//! Cache Entry Module
//!
//! Defines the record stored for each cached response.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A cached response, keyed by the exact request-target the client sent.
///
/// The payload is the raw byte stream relayed to the client (status line,
/// headers and body) and is never modified after insertion.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The request-target this response was fetched for
    pub key: String,
    /// Raw response bytes
    payload: Box<[u8]>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry holding its own copy of `payload`.
    pub fn new(key: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
            created_at: current_timestamp_ms(),
        }
    }

    /// Borrow the stored response bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of payload bytes charged against the cache capacity.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    // == Age ==
    /// Milliseconds since the entry was inserted.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
