//! `rollfetch config` – show where the config lives and what is in effect.

use anyhow::Result;
use rollfetch_core::config::{self, RollfetchConfig};
use std::path::Path;

pub fn run_config(cfg: &RollfetchConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", cfg.to_toml()?);
    Ok(())
}
