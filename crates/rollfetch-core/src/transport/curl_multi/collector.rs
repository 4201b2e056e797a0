//! Easy2 Handler that buffers one response: header lines and body bytes.

use std::str;

/// Handler state for one request. Implements curl's Handler for Easy2.
#[derive(Debug, Default)]
pub struct Collector {
    pub(super) headers: Vec<String>,
    pub(super) body: Vec<u8>,
}

impl curl::easy::Handler for Collector {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                // New response (redirect hop or 100-continue): keep only the last one.
                self.headers.clear();
            }
            if !line.is_empty() {
                self.headers.push(line.to_string());
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
