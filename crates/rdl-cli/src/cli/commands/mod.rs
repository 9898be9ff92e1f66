//! CLI command handlers.

mod config_path;
mod csv;
mod json;
mod purge;

pub use config_path::run_config_path;
pub use csv::run_csv;
pub use json::run_json;
pub use purge::run_purge;

use anyhow::Result;
use rdl_core::Outcome;
use serde_json::Value;

/// Prints a successful load as pretty JSON; an empty outcome prints nothing.
fn print_outcome(outcome: Outcome<Value>) -> Result<()> {
    match outcome {
        Outcome::Success(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Outcome::Empty => tracing::info!("no data loaded"),
    }
    Ok(())
}
