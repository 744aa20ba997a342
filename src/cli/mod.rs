use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "cis-hardener")]
#[command(about = "CIS hardening lifecycle for a single host")]
#[command(long_about = "Installs the usg hardening engine, applies a CIS tailoring file, audits \
                       compliance against it and keeps the outcome across restarts. Hooks are \
                       run by the host runtime; actions are run by the operator.")]
pub struct Cli {
    /// Configuration file
    #[arg(long, short = 'c', global = true, help = "Path to the configuration file (default: ./cis-hardener.toml if present)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hook: install the hardening engine, then harden if auto-harden is set
    Install,
    /// Hook: reload sysctl settings and report the unit status
    Start,
    /// Hook: re-evaluate the unit status after a configuration change
    ConfigChanged,
    /// Action: run the pre-hardening script, then apply the tailoring file
    Harden,
    /// Action: audit the host against the tailoring file
    Audit,
    /// Action: show the persisted lifecycle state as JSON
    GetStatus,
    /// Action: print an audit report, base64 encoded
    GetResults {
        /// Report format
        #[arg(long, help = "Report format: xml or html")]
        format: String,
    },
}
