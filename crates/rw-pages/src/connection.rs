//! Client connection liveness.
//!
//! The pipeline polls a [`ConnectionMonitor`] at two fixed checkpoints
//! instead of being interrupted. [`DisconnectFlag`] is the shared flag the
//! HTTP layer flips, usually through a [`DisconnectGuard`] held by the
//! request future.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the client has gone away.
pub trait ConnectionMonitor: Send + Sync {
    /// `true` once the client connection is closed.
    fn is_dropped(&self) -> bool;
}

/// Shared "client disconnected" flag.
#[derive(Clone, Debug, Default)]
pub struct DisconnectFlag(Arc<AtomicBool>);

impl DisconnectFlag {
    /// Create a flag for a live connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the connection as dropped.
    pub fn mark_dropped(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Guard that marks the connection dropped when it goes out of scope
    /// without being disarmed.
    #[must_use]
    pub fn guard(&self) -> DisconnectGuard {
        DisconnectGuard {
            flag: Some(self.clone()),
        }
    }
}

impl ConnectionMonitor for DisconnectFlag {
    fn is_dropped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Marks a [`DisconnectFlag`] on drop.
///
/// Held by the request future: hyper drops that future when the client
/// disconnects, which flips the flag for the detached pipeline task.
#[derive(Debug)]
pub struct DisconnectGuard {
    flag: Option<DisconnectFlag>,
}

impl DisconnectGuard {
    /// Consume the guard without marking the connection.
    pub fn disarm(mut self) {
        self.flag = None;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if let Some(flag) = self.flag.take() {
            flag.mark_dropped();
        }
    }
}
