//! CLI for the RDL remote data loader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rdl_core::config;

use commands::{run_config_path, run_csv, run_json, run_purge};

/// Top-level CLI for RDL.
#[derive(Debug, Parser)]
#[command(name = "rdl")]
#[command(about = "RDL: cached remote CSV/JSON loader with self-healing retries", long_about = None)]
pub struct Cli {
    /// Bypass the resource cache for this invocation.
    #[arg(long, global = true)]
    pub ignore_cache: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Load a delimited table and print its rows as JSON.
    Csv {
        /// Field separator (exactly one character).
        #[arg(long, short, default_value = ",")]
        sep: String,
        /// URL fragments, joined in order with nothing in between.
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Load a JSON document and print it.
    Json {
        /// URL fragments, joined in order with nothing in between.
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Delete the cached copy of a resource.
    Purge {
        /// URL fragments, joined in order with nothing in between.
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Print the path of the configuration file.
    ConfigPath,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if cli.ignore_cache {
            cfg.cache.ignore = true;
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Csv { sep, parts } => run_csv(&cfg, &sep, &parts)?,
            CliCommand::Json { parts } => run_json(&cfg, &parts)?,
            CliCommand::Purge { parts } => run_purge(&cfg, &parts)?,
            CliCommand::ConfigPath => run_config_path()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
