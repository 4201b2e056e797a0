//! Rolling-batch HTTP fetcher.
//!
//! Queue URLs with a caller context, then `exec` them with at most K in
//! flight over one multiplexed transport session. Each completion is routed
//! to `on_response` (status 200) or `on_error` (anything else) and its slot is
//! refilled from the queue right away.

pub mod config;
pub mod logging;

pub mod cancel;
pub mod error;
pub mod queue;
pub mod transport;

pub use cancel::{CancelCheck, Deadline, Never};
pub use error::{QueueError, TransportError};
pub use queue::{ExecOutcome, ExecReport, Hooks, RollingQueue, DEFAULT_CONCURRENCY};
pub use transport::{CurlTransport, RequestOptions, TransferInfo};
