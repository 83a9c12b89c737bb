//! Opaque connection handles.

use std::sync::atomic::{AtomicU64, Ordering};

/// Stable handle for one live client connection.
///
/// The core never sees transport objects, only these handles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::From,
)]
#[display("conn-{_0}")]
pub struct ConnectionId(u64);

/// Allocates connection handles in increasing order.
#[derive(Debug)]
pub struct ConnectionIds {
    next: AtomicU64,
}

impl ConnectionIds {
    /// Creates an allocator starting at 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Hands out a handle no other connection has had.
    pub fn next(&self) -> ConnectionId {
        ConnectionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionIds {
    fn default() -> Self {
        Self::new()
    }
}
