//! Rolling-batch request queue.
//!
//! Requests are queued with `add()` and fetched by `exec()` with at most
//! `limit` in flight. Each completed request frees one slot, which is refilled
//! from the head of the queue right away, so concurrency stays steady until
//! the queue runs dry.

mod correlation;
mod hooks;
mod pending;
mod run;


use std::time::Duration;

use crate::cancel::CancelCheck;
use crate::error::QueueError;
use crate::transport::{RequestOptions, Transport};

pub use hooks::{Hooks, Routed};

use pending::PendingQueue;

/// Concurrency used by `exec_default`.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Floor a fractional concurrency limit (e.g. half the queue size) to a
/// usable slot count. Never below 1; NaN and negative values give 1.
pub fn floor_limit(raw: f64) -> usize {
    if raw.is_finite() && raw >= 1.0 {
        raw.floor() as usize
    } else {
        1
    }
}

/// Number of requests seeded at the start of a run: `limit` clamped to the
/// queue size, and at least 1 when anything is queued.
pub fn batch_size(limit: usize, pending: usize) -> usize {
    if pending == 0 {
        0
    } else {
        limit.max(1).min(pending)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Queue and active set drained; `on_end` ran.
    Drained,
    /// The cancel check fired; `on_end` did not run.
    Cancelled,
}

/// Counters for one `exec()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecReport {
    pub outcome: ExecOutcome,
    /// Requests handed to the transport.
    pub dispatched: usize,
    /// Completions routed to `on_response`.
    pub responses: usize,
    /// Completions routed to `on_error`.
    pub errors: usize,
    /// Requests dropped at teardown without a callback (pending or in flight).
    pub abandoned: usize,
    /// Highest number of requests in flight at once.
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

impl ExecReport {
    pub fn completed(&self) -> usize {
        self.responses + self.errors
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == ExecOutcome::Cancelled
    }
}

/// Queue of URL requests, each carrying a caller context `C`, fetched through
/// transport `T` with bounded concurrency.
///
/// Not reentrant: `exec` borrows the queue mutably, so callbacks cannot call
/// back into `add` or `exec` on the same instance.
pub struct RollingQueue<T, C> {
    transport: T,
    options: RequestOptions,
    pending: PendingQueue<C>,
}

impl<T: Transport, C> RollingQueue<T, C> {
    /// `options` apply to every request this queue dispatches.
    pub fn new(transport: T, options: RequestOptions) -> Self {
        Self {
            transport,
            options,
            pending: PendingQueue::default(),
        }
    }

    /// Queue one request. The URL is not validated here: a URL the transport
    /// cannot build a handle for completes with status 0 through `on_error`.
    /// The context is only carried.
    pub fn add(&mut self, url: impl Into<String>, context: C) {
        self.pending.push(url.into(), context);
    }

    /// Queue many `(url, context)` pairs in iteration order.
    pub fn extend<I, U>(&mut self, requests: I)
    where
        I: IntoIterator<Item = (U, C)>,
        U: Into<String>,
    {
        for (url, context) in requests {
            self.add(url, context);
        }
    }

    /// Requests waiting for the next `exec`.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Fetch every queued request with at most `limit` in flight.
    ///
    /// `on_response`/`on_error` fire in the order the transport reports
    /// completions. `on_end` fires once after a full drain. `cancel` is
    /// checked before seeding, before each tick and before each completion;
    /// when it fires the run stops without further callbacks.
    ///
    /// The queue is empty afterwards whatever the outcome.
    pub fn exec(
        &mut self,
        limit: usize,
        hooks: &mut Hooks<'_, C>,
        cancel: &dyn CancelCheck,
    ) -> Result<ExecReport, QueueError> {
        run::run(
            &self.transport,
            &self.options,
            &mut self.pending,
            limit,
            hooks,
            cancel,
        )
    }

    /// `exec` with `DEFAULT_CONCURRENCY`.
    pub fn exec_default(
        &mut self,
        hooks: &mut Hooks<'_, C>,
        cancel: &dyn CancelCheck,
    ) -> Result<ExecReport, QueueError> {
        self.exec(DEFAULT_CONCURRENCY, hooks, cancel)
    }
}

impl<T, C> std::fmt::Debug for RollingQueue<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingQueue")
            .field("pending", &self.pending.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
