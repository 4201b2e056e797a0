//! Caller callbacks for one `exec()` call.
//!
//! Built before the call and borrowed mutably for its whole duration, so a
//! callback cannot reach back into the queue that is running it.

use anyhow::Result;

use crate::transport::{Completed, TransferInfo};

type ResponseFn<'a, C> = Box<dyn FnMut(&TransferInfo, &[u8], C) -> Result<()> + 'a>;
type ErrorFn<'a, C> = Box<dyn FnMut(&TransferInfo, C) -> Result<()> + 'a>;
type EndFn<'a> = Box<dyn FnMut() -> Result<()> + 'a>;

/// Which terminal callback a completion was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Response,
    Error,
}

/// Optional `on_response`, `on_error` and `on_end` callbacks.
///
/// ```
/// use rollfetch_core::queue::Hooks;
///
/// let mut ok = 0;
/// let mut hooks: Hooks<'_, u32> = Hooks::new()
///     .on_response(|_info, _body, _ctx| {
///         ok += 1;
///         Ok(())
///     })
///     .on_end(|| Ok(()));
/// # let _ = &mut hooks;
/// ```
pub struct Hooks<'a, C> {
    on_response: Option<ResponseFn<'a, C>>,
    on_error: Option<ErrorFn<'a, C>>,
    on_end: Option<EndFn<'a>>,
}

impl<C> Default for Hooks<'_, C> {
    fn default() -> Self {
        Self {
            on_response: None,
            on_error: None,
            on_end: None,
        }
    }
}

impl<'a, C> Hooks<'a, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per request that completed with status 200, with the body.
    pub fn on_response<F>(mut self, f: F) -> Self
    where
        F: FnMut(&TransferInfo, &[u8], C) -> Result<()> + 'a,
    {
        self.on_response = Some(Box::new(f));
        self
    }

    /// Called once per request that completed with any other status,
    /// including 0 when no response was received at all.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnMut(&TransferInfo, C) -> Result<()> + 'a,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Called once after a full drain. Never called when the run is cancelled.
    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<()> + 'a,
    {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Route one completion to `on_response` or `on_error`. A missing hook
    /// drops the context silently.
    pub(crate) fn dispatch(&mut self, done: &Completed, context: C) -> Result<Routed> {
        if done.info.is_success() {
            if let Some(f) = self.on_response.as_mut() {
                f(&done.info, &done.body, context)?;
            }
            Ok(Routed::Response)
        } else {
            if let Some(f) = self.on_error.as_mut() {
                f(&done.info, context)?;
            }
            Ok(Routed::Error)
        }
    }

    pub(crate) fn end(&mut self) -> Result<()> {
        match self.on_end.as_mut() {
            Some(f) => f(),
            None => Ok(()),
        }
    }
}

impl<C> std::fmt::Debug for Hooks<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_response", &self.on_response.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}
