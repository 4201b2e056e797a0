//! Curl multi backend: single-threaded event loop, multiple Easy2 handles.
//!
//! One `curl::multi::Multi` per session. Each handle carries its
//! `HandleToken` through `set_token`, so completion messages map back to the
//! token directly instead of by URL or by scanning the active set.
//!
//! A request whose handle cannot be built (bad URL, rejected option) still
//! gets a token. It completes on the next tick with status 0 and the curl
//! error as its failure, like any other connection-level failure.

mod collector;
mod configure;

use std::collections::HashMap;
use std::mem;
use std::time::{Duration, Instant};

use curl::multi::{Easy2Handle, Multi};

use super::{Completed, HandleToken, RequestOptions, Session, Transport, TransferInfo};
use crate::error::TransportError;

use collector::Collector;

/// Upper bound for one `multi.wait` when a tick saw no completion.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(100);

/// Opens curl multi sessions.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    wait: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self { wait: DEFAULT_WAIT }
    }
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the blocking wait of a tick that made no progress. Smaller values
    /// make cancellation checks more frequent.
    pub fn with_wait_timeout(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }
}

impl Transport for CurlTransport {
    type Session = CurlSession;

    fn open(&self) -> Result<CurlSession, TransportError> {
        tracing::trace!("opening curl multi session");
        Ok(CurlSession {
            active: HashMap::new(),
            multi: Multi::new(),
            failures: HashMap::new(),
            rejected: HashMap::new(),
            unreported: Vec::new(),
            next_token: 0,
            wait: self.wait,
        })
    }
}

struct ActiveHandle {
    handle: Easy2Handle<Collector>,
    url: String,
    started: Instant,
}

/// A live curl multi session.
///
/// `active` is declared before `multi` so the handles detach before the
/// multi handle is cleaned up when the session drops.
pub struct CurlSession {
    active: HashMap<HandleToken, ActiveHandle>,
    multi: Multi,
    failures: HashMap<HandleToken, curl::Error>,
    /// Requests that never reached the multi handle, already complete.
    rejected: HashMap<HandleToken, Completed>,
    /// Tokens from `rejected` not yet returned by `tick`.
    unreported: Vec<HandleToken>,
    next_token: u64,
    wait: Duration,
}

fn session_fault(op: &'static str) -> impl Fn(curl::MultiError) -> TransportError {
    move |e| TransportError::Session(format!("curl multi {}: {}", op, e))
}

impl Session for CurlSession {
    fn dispatch(
        &mut self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HandleToken, TransportError> {
        let token = HandleToken::new(self.next_token);
        self.next_token += 1;
        let easy = match configure::build_easy(url, options) {
            Ok(easy) => easy,
            Err(e) => {
                tracing::warn!(token = %token, url, "cannot build request: {}", e);
                self.reject(token, url, e.to_string());
                return Ok(token);
            }
        };
        let mut handle = self.multi.add2(easy).map_err(session_fault("add"))?;
        handle
            .set_token(token.get() as usize)
            .map_err(|e| TransportError::Session(format!("curl set token: {}", e)))?;
        self.active.insert(
            token,
            ActiveHandle {
                handle,
                url: url.to_string(),
                started: Instant::now(),
            },
        );
        Ok(token)
    }

    fn tick(&mut self) -> Result<Vec<HandleToken>, TransportError> {
        let running = self.multi.perform().map_err(session_fault("perform"))?;
        let mut done = mem::take(&mut self.unreported);
        let failures = &mut self.failures;
        self.multi.messages(|msg| {
            let Some(result) = msg.result() else {
                return;
            };
            match msg.token() {
                Ok(raw) => {
                    let token = HandleToken::new(raw as u64);
                    if let Err(e) = result {
                        failures.insert(token, e);
                    }
                    done.push(token);
                }
                Err(e) => tracing::warn!("completion message without token: {}", e),
            }
        });
        if done.is_empty() && running > 0 {
            self.multi
                .wait(&mut [], self.wait)
                .map_err(session_fault("wait"))?;
        }
        Ok(done)
    }

    fn finish(&mut self, token: HandleToken) -> Result<Completed, TransportError> {
        if let Some(done) = self.rejected.remove(&token) {
            return Ok(done);
        }
        let active = self
            .active
            .remove(&token)
            .ok_or(TransportError::UnknownHandle(token.get()))?;
        let mut easy = self.multi.remove2(active.handle).map_err(session_fault("remove"))?;

        let status = easy.response_code().unwrap_or(0);
        let effective_url = easy.effective_url().ok().flatten().map(str::to_string);
        let download_size = easy.download_size().map(|n| n as u64).unwrap_or(0);
        let elapsed = easy.total_time().unwrap_or_else(|_| active.started.elapsed());
        let failure = self.failures.remove(&token).map(|e| e.to_string());
        let collector = easy.get_mut();
        let body = mem::take(&mut collector.body);
        let headers = mem::take(&mut collector.headers);

        Ok(Completed {
            info: TransferInfo {
                requested_url: active.url,
                effective_url,
                status,
                download_size,
                elapsed,
                headers,
                failure,
            },
            body,
        })
    }

    fn in_flight(&self) -> usize {
        self.active.len() + self.rejected.len()
    }
}

impl CurlSession {
    fn reject(&mut self, token: HandleToken, url: &str, message: String) {
        let info = TransferInfo {
            requested_url: url.to_string(),
            failure: Some(message),
            ..TransferInfo::default()
        };
        self.rejected.insert(token, Completed { info, body: Vec::new() });
        self.unreported.push(token);
    }
}

impl Drop for CurlSession {
    fn drop(&mut self) {
        if !self.active.is_empty() {
            tracing::debug!(
                released = self.active.len(),
                "closing curl multi session with handles still registered"
            );
        }
        self.active.clear();
        self.rejected.clear();
    }
}
