//! `rdl json` – load a JSON document.

use anyhow::Result;
use rdl_core::config::RdlConfig;
use rdl_core::DefaultLoader;

pub fn run_json(cfg: &RdlConfig, parts: &[String]) -> Result<()> {
    let loader = DefaultLoader::from_config(cfg)?;
    super::print_outcome(loader.get_json(parts)?)
}
