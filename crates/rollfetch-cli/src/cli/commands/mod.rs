//! CLI command handlers. Each command is in its own file.

mod completions;
mod config;
mod fetch;

pub use completions::run_completions;
pub use config::run_config;
pub use fetch::{run_fetch, FetchArgs};

#[cfg(test)]
pub(crate) use fetch::{collect_urls, FetchLine};
