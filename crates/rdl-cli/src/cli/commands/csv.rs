//! `rdl csv` – load a delimited table.

use anyhow::Result;
use rdl_core::config::RdlConfig;
use rdl_core::DefaultLoader;

pub fn run_csv(cfg: &RdlConfig, sep: &str, parts: &[String]) -> Result<()> {
    let loader = DefaultLoader::from_config(cfg)?;
    let rows = loader.get_csv(sep, parts)?;
    super::print_outcome(rows.map(serde_json::Value::from))
}
