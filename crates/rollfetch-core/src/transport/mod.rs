//! Transport seam: the network engine the rolling queue drives.
//!
//! A `Transport` opens one multiplexed `Session` per `exec()` call. The session
//! issues a `HandleToken` for every dispatched request and reports completed
//! tokens tick by tick. Everything HTTP-specific (TLS, redirects, timeouts)
//! lives behind this seam; `CurlTransport` is the libcurl implementation.

mod curl_multi;
mod options;

use std::fmt;
use std::time::Duration;

use crate::error::TransportError;

pub use curl_multi::{CurlSession, CurlTransport};
pub use options::RequestOptions;

/// Opaque identity of one in-flight request, minted by the session when the
/// handle is created. Unique within a session; never derived from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleToken(u64);

impl HandleToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result metadata for one finished request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferInfo {
    /// URL as passed to `add()`.
    pub requested_url: String,
    /// URL of the final response after redirects, if the transport knows it.
    pub effective_url: Option<String>,
    /// HTTP status of the final response; 0 when no response was received.
    pub status: u32,
    /// Body bytes received.
    pub download_size: u64,
    /// Wall time spent on the transfer.
    pub elapsed: Duration,
    /// Header lines of the final response (status line first).
    pub headers: Vec<String>,
    /// Transport failure message (connect refused, DNS, timeout...).
    pub failure: Option<String>,
}

impl TransferInfo {
    /// Only a plain 200 counts as success; every other outcome goes to `on_error`.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// No HTTP response at all (connection-level failure).
    pub fn is_connection_failure(&self) -> bool {
        self.status == 0
    }

    /// URL to report for this request: effective if known, requested otherwise.
    pub fn url(&self) -> &str {
        self.effective_url.as_deref().unwrap_or(&self.requested_url)
    }
}

/// A deregistered request: its metadata and body.
#[derive(Debug, Clone, Default)]
pub struct Completed {
    pub info: TransferInfo,
    pub body: Vec<u8>,
}

/// Factory for sessions. Held by the queue for its whole lifetime.
pub trait Transport {
    type Session: Session;

    /// Opens a fresh multiplexed session. Dropping the session closes it and
    /// releases any handle still registered.
    fn open(&self) -> Result<Self::Session, TransportError>;
}

/// One multiplexed session of in-flight requests.
pub trait Session {
    /// Creates a handle for `url` with `options` and registers it.
    fn dispatch(&mut self, url: &str, options: &RequestOptions)
        -> Result<HandleToken, TransportError>;

    /// Advances every registered handle until no further immediate progress
    /// is possible and returns the handles that completed, in report order.
    /// May block for a bounded time when nothing is ready yet.
    fn tick(&mut self) -> Result<Vec<HandleToken>, TransportError>;

    /// Deregisters a completed handle and hands back its result.
    fn finish(&mut self, token: HandleToken) -> Result<Completed, TransportError>;

    /// Number of registered handles.
    fn in_flight(&self) -> usize;
}
