// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stratusd` entry point.

use anyhow::Context;
use clap::Parser;
use stratus_daemon::{cli::Args, lifecycle, logging};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = logging::init(&args).context("installing logging")?;

    // One cooperative event loop; no parallel threads of execution.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    runtime.block_on(lifecycle::run(args)).context("stratusd failed")?;
    Ok(())
}
