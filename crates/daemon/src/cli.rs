// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface of `stratusd`.

use clap::Parser;
use std::path::PathBuf;

/// Cloud bursting controller: reconciles requested appliances against
/// their provider.
#[derive(Debug, Parser)]
#[command(name = "stratusd", version)]
pub struct Args {
    /// Path to the audit store; omitted means in-memory.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Scheduling tick cap, in seconds.
    #[arg(long, default_value_t = 1)]
    pub interval: u64,

    /// Append log output to this file instead of stderr.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Increase the verbosity of output.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
