//! `rdl purge` – drop a cached resource so the next load hits the origin.

use anyhow::Result;
use rdl_core::config::RdlConfig;
use rdl_core::request::join_url_parts;
use rdl_core::DefaultLoader;

pub fn run_purge(cfg: &RdlConfig, parts: &[String]) -> Result<()> {
    let loader = DefaultLoader::from_config(cfg)?;
    loader.purge(parts)?;
    println!("purged {}", join_url_parts(parts));
    Ok(())
}
