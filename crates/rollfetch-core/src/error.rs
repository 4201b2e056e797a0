//! Error types shared by the transport seam and the rolling queue.

use thiserror::Error;

/// Failure reported by a transport session.
///
/// These are never per-request outcomes: a request that fails to connect,
/// cannot be built or returns a non-200 status completes normally and is
/// routed to `on_error`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The multiplexed session itself failed (perform, wait, add or remove).
    #[error("transport session fault: {0}")]
    Session(String),
    /// The session reported a token it never issued or already released.
    #[error("unknown handle token {0}")]
    UnknownHandle(u64),
}

/// Error returned by `RollingQueue::exec`.
///
/// Every variant means the call was torn down early: pending requests were
/// discarded and `on_end` did not run.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A callback returned an error; it is passed through untouched.
    #[error("callback failed: {0:#}")]
    Callback(anyhow::Error),
}

impl QueueError {
    /// True when the failure came from the session rather than a callback.
    pub fn is_transport(&self) -> bool {
        matches!(self, QueueError::Transport(_))
    }
}
