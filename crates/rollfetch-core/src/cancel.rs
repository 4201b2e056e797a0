//! Cooperative cancellation for a running `exec()`.
//!
//! The queue asks a `CancelCheck` before seeding, before every tick and
//! before processing each completion. The first `true` tears the call down
//! without running `on_end`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A single no-argument query: should the current `exec()` stop now?
pub trait CancelCheck {
    fn is_cancelled(&self) -> bool;
}

/// Never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl CancelCheck for Never {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> CancelCheck for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Abort token shared with another thread (e.g. a signal handler).
impl CancelCheck for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl CancelCheck for Arc<AtomicBool> {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Cancels once a maximum runtime has elapsed. The clock starts when the
/// deadline is built; a zero budget cancels before any I/O.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(max_runtime: Duration) -> Self {
        Self {
            at: Instant::now() + max_runtime,
        }
    }
}

impl CancelCheck for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.at
    }
}
