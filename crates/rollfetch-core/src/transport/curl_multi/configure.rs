//! Apply `RequestOptions` to a fresh Easy2 handle.

use curl::easy::{Easy2, List};

use super::collector::Collector;
use crate::transport::RequestOptions;

/// Build the Easy2 handle for one request: URL plus the queue-wide options.
pub(super) fn build_easy(url: &str, opts: &RequestOptions) -> Result<Easy2<Collector>, curl::Error> {
    let mut easy = Easy2::new(Collector::default());
    easy.url(url)?;
    easy.follow_location(opts.follow_redirects)?;
    if opts.follow_redirects {
        easy.max_redirections(opts.max_redirects)?;
    }
    if let Some(t) = opts.connect_timeout() {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = opts.timeout() {
        easy.timeout(t)?;
    }
    if let Some(ref proxy) = opts.proxy {
        easy.proxy(proxy)?;
    }
    if let Some(ref ua) = opts.user_agent {
        easy.useragent(ua)?;
    }
    easy.ssl_verify_peer(opts.verify_tls)?;
    easy.ssl_verify_host(opts.verify_tls)?;

    let lines = opts.header_lines();
    if !lines.is_empty() {
        let mut list = List::new();
        for line in &lines {
            list.append(line)?;
        }
        easy.http_headers(list)?;
    }
    Ok(easy)
}
