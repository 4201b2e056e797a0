//! Per-request transport options, applied uniformly to every request of a queue.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Options merged with each request's URL at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Connect timeout in seconds (0 = transport default).
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout in seconds (0 = no limit).
    pub timeout_secs: u64,
    /// Follow `Location` redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects followed when `follow_redirects` is set.
    pub max_redirects: u32,
    /// Proxy URL, e.g. `http://proxy:3128`.
    pub proxy: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Verify TLS peer certificate and host name.
    pub verify_tls: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 2,
            timeout_secs: 0,
            follow_redirects: true,
            max_redirects: 5,
            proxy: None,
            user_agent: Some(concat!("rollfetch/", env!("CARGO_PKG_VERSION")).to_string()),
            headers: BTreeMap::new(),
            verify_tls: true,
        }
    }
}

impl RequestOptions {
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Header lines in `Name: value` form.
    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(k, v)| format!("{}: {}", k.trim(), v.trim()))
            .collect()
    }
}
