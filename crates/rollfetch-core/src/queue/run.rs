//! The rolling-batch event loop for one `exec()` call.
//!
//! Seeding → Draining (tick, process completions, refill) → Done or Cancelled.
//! The open session lives inside the `Draining` phase, so leaving that phase
//! by any route (drain, cancel, error) drops the session and releases every
//! handle still registered.

use std::time::Instant;

use crate::cancel::CancelCheck;
use crate::error::{QueueError, TransportError};
use crate::transport::{RequestOptions, Session, Transport};

use super::correlation::CorrelationMap;
use super::hooks::{Hooks, Routed};
use super::pending::PendingQueue;
use super::{batch_size, ExecOutcome, ExecReport};

enum Phase<S> {
    Seeding,
    Draining(S),
    Cancelled,
    Done,
}

#[derive(Default)]
struct Counters {
    dispatched: usize,
    responses: usize,
    errors: usize,
    peak_in_flight: usize,
}

/// Per-call state, built fresh by every `run`.
struct RunState<'q, C> {
    pending: &'q mut PendingQueue<C>,
    options: &'q RequestOptions,
    in_flight: CorrelationMap<C>,
    limit: usize,
    counters: Counters,
}

pub(super) fn run<T: Transport, C>(
    transport: &T,
    options: &RequestOptions,
    pending: &mut PendingQueue<C>,
    limit: usize,
    hooks: &mut Hooks<'_, C>,
    cancel: &dyn CancelCheck,
) -> Result<ExecReport, QueueError> {
    let started = Instant::now();
    let limit = batch_size(limit, pending.len());
    tracing::debug!(queued = pending.len(), limit, "exec start");

    let mut state = RunState {
        pending,
        options,
        in_flight: CorrelationMap::default(),
        limit,
        counters: Counters::default(),
    };
    let result = state.drive(transport, hooks, cancel);
    let abandoned = state.teardown();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(abandoned, "exec aborted: {}", e);
            return Err(e);
        }
    };
    let c = state.counters;
    let report = ExecReport {
        outcome,
        dispatched: c.dispatched,
        responses: c.responses,
        errors: c.errors,
        abandoned,
        peak_in_flight: c.peak_in_flight,
        elapsed: started.elapsed(),
    };

    match outcome {
        ExecOutcome::Drained => {
            tracing::info!(
                responses = report.responses,
                errors = report.errors,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "exec drained"
            );
            hooks.end().map_err(QueueError::Callback)?;
        }
        ExecOutcome::Cancelled => {
            tracing::warn!(
                completed = report.completed(),
                abandoned,
                "exec cancelled"
            );
        }
    }
    Ok(report)
}

impl<C> RunState<'_, C> {
    fn drive<T: Transport>(
        &mut self,
        transport: &T,
        hooks: &mut Hooks<'_, C>,
        cancel: &dyn CancelCheck,
    ) -> Result<ExecOutcome, QueueError> {
        let mut phase: Phase<T::Session> = Phase::Seeding;
        loop {
            phase = match phase {
                Phase::Seeding => self.seed(transport, cancel)?,
                Phase::Draining(session) => self.step(session, hooks, cancel)?,
                Phase::Cancelled => return Ok(ExecOutcome::Cancelled),
                Phase::Done => return Ok(ExecOutcome::Drained),
            };
        }
    }

    fn seed<T: Transport>(
        &mut self,
        transport: &T,
        cancel: &dyn CancelCheck,
    ) -> Result<Phase<T::Session>, QueueError> {
        if cancel.is_cancelled() {
            return Ok(Phase::Cancelled);
        }
        if self.limit == 0 {
            return Ok(Phase::Done);
        }
        let mut session = transport.open()?;
        self.refill(&mut session)?;
        Ok(Phase::Draining(session))
    }

    /// One tick: advance the session, then process what it reported complete.
    fn step<S: Session>(
        &mut self,
        mut session: S,
        hooks: &mut Hooks<'_, C>,
        cancel: &dyn CancelCheck,
    ) -> Result<Phase<S>, QueueError> {
        if self.in_flight.is_empty() && self.pending.is_empty() {
            return Ok(Phase::Done);
        }
        if cancel.is_cancelled() {
            return Ok(Phase::Cancelled);
        }
        for token in session.tick()? {
            if cancel.is_cancelled() {
                return Ok(Phase::Cancelled);
            }
            let context = self
                .in_flight
                .take(token)
                .ok_or(TransportError::UnknownHandle(token.get()))?;
            let done = session.finish(token)?;
            tracing::debug!(
                token = %token,
                status = done.info.status,
                url = done.info.url(),
                "request completed"
            );
            match hooks.dispatch(&done, context).map_err(QueueError::Callback)? {
                Routed::Response => self.counters.responses += 1,
                Routed::Error => self.counters.errors += 1,
            }
            self.refill(&mut session)?;
        }
        Ok(Phase::Draining(session))
    }

    /// Dispatch from the head of the queue until `limit` requests are in
    /// flight or the queue is empty. After a completion this adds exactly one.
    fn refill<S: Session>(&mut self, session: &mut S) -> Result<(), QueueError> {
        while self.in_flight.len() < self.limit {
            let Some(req) = self.pending.pop() else {
                break;
            };
            let token = session.dispatch(&req.url, self.options)?;
            tracing::debug!(
                token = %token,
                url = %req.url,
                in_flight = session.in_flight(),
                "request dispatched"
            );
            if !self.in_flight.insert(token, req.context) {
                tracing::warn!(token = %token, "transport reused a live handle token");
            }
            self.counters.dispatched += 1;
            self.counters.peak_in_flight = self.counters.peak_in_flight.max(self.in_flight.len());
        }
        Ok(())
    }

    /// Clear everything this call owned. Returns how many requests were
    /// dropped without a callback.
    fn teardown(&mut self) -> usize {
        let abandoned = self.pending.len() + self.in_flight.len();
        self.pending.clear();
        self.in_flight.clear();
        abandoned
    }
}
