//! `rollfetch fetch <url>...` – fetch URLs with a bounded rolling window.

use anyhow::{Context, Result};
use rollfetch_core::config::RollfetchConfig;
use rollfetch_core::queue::Hooks;
use rollfetch_core::{CancelCheck, Deadline, ExecReport, Never, RollingQueue, TransferInfo};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub urls: Vec<String>,
    pub input: Option<PathBuf>,
    pub limit: Option<usize>,
    pub max_runtime: Option<f64>,
    pub json: bool,
}

/// One output record per completed request.
#[derive(Debug, Serialize)]
pub(crate) struct FetchLine<'a> {
    pub index: usize,
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_url: Option<&'a str>,
    pub status: u32,
    pub size: u64,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> FetchLine<'a> {
    pub(crate) fn new(index: usize, info: &'a TransferInfo) -> Self {
        Self {
            index,
            url: &info.requested_url,
            effective_url: info
                .effective_url
                .as_deref()
                .filter(|u| *u != info.requested_url),
            status: info.status,
            size: info.download_size,
            elapsed_ms: info.elapsed.as_millis() as u64,
            error: info.failure.as_deref(),
        }
    }

    pub(crate) fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string(self)?);
        }
        let status = if self.status == 0 {
            "---".to_string()
        } else {
            self.status.to_string()
        };
        let mut line = format!("{:>3} {:>10} {}", status, self.size, self.url);
        if let Some(to) = self.effective_url {
            line.push_str(&format!(" -> {}", to));
        }
        if let Some(err) = self.error {
            line.push_str(&format!(" ({})", err));
        }
        Ok(line)
    }
}

/// Merge positional URLs and the lines of an input file, dropping blanks and
/// `#` comments. Returns (accepted, rejected) in input order.
pub(crate) fn collect_urls(urls: &[String], input: Option<&str>) -> (Vec<String>, Vec<String>) {
    let from_file = input
        .into_iter()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for raw in urls.iter().map(|s| s.trim()).chain(from_file) {
        match Url::parse(raw) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => accepted.push(u.to_string()),
            _ => rejected.push(raw.to_string()),
        }
    }
    (accepted, rejected)
}

pub fn run_fetch(cfg: &RollfetchConfig, args: &FetchArgs) -> Result<ExecReport> {
    let input = match args.input.as_deref() {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("read URL list: {}", path.display()))?,
        ),
        None => None,
    };
    let (urls, rejected) = collect_urls(&args.urls, input.as_deref());
    for bad in &rejected {
        eprintln!("skipping invalid URL: {}", bad);
    }
    if urls.is_empty() && rejected.is_empty() {
        anyhow::bail!("no URLs given (pass URLs or --input FILE)");
    }

    let mut queue = RollingQueue::new(cfg.transport(), cfg.request.clone());
    queue.extend(urls.into_iter().enumerate().map(|(i, u)| (u, i)));

    let limit = args.limit.unwrap_or(cfg.default_concurrency);
    let deadline;
    let cancel: &dyn CancelCheck = match args.max_runtime {
        Some(secs) => {
            let budget = Duration::try_from_secs_f64(secs.max(0.0))
                .with_context(|| format!("invalid --max-runtime {}", secs))?;
            deadline = Deadline::after(budget);
            &deadline
        }
        None => &Never,
    };
    tracing::info!(queued = queue.len(), limit, "fetch start");

    let json = args.json;
    let print = |index: usize, info: &TransferInfo| -> Result<()> {
        println!("{}", FetchLine::new(index, info).render(json)?);
        Ok(())
    };
    let mut hooks = Hooks::<usize>::new()
        .on_response(|info, _body, index| print(index, info))
        .on_error(|info, index| print(index, info));
    let report = queue.exec(limit, &mut hooks, cancel)?;

    eprintln!(
        "{} ok, {} failed{} in {:.2}s (peak {} in flight)",
        report.responses,
        report.errors,
        if report.is_cancelled() {
            format!(", cancelled with {} unfinished", report.abandoned)
        } else {
            String::new()
        },
        report.elapsed.as_secs_f64(),
        report.peak_in_flight,
    );
    Ok(report)
}
