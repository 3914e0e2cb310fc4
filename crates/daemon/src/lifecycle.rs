// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup, the operate loop, shutdown.

use crate::cli::Args;
use crate::env;
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stratus_agents::{
    Agent, AgentError, MembershipAgent, PreCheckAgent, PreDeleteAgent, PreOperationalAgent,
    PreProvisionAgent, PreStartAgent, PreStopAgent, ProviderDirectory, ProvisioningAgent,
    SessionAgent, ValidAgent,
};
use stratus_core::{ProviderRecord, SystemClock};
use stratus_engine::{operate, SchedulerOptions};
use stratus_provider::{ConfigError, GatewayError, ProviderConfig, VcloudGateway};
use stratus_store::{Store, StoreError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no usable state directory")]
    NoStateDir,

    #[error("another stratusd holds the lock at {0}")]
    Locked(std::path::PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("agent setup: {0}")]
    Agent(#[from] AgentError),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

// NOTE(lifetime): held to maintain the exclusive file lock; released on drop
struct LockFile {
    #[allow(dead_code)]
    file: File,
}

fn acquire_lock(state_dir: &Path) -> Result<LockFile, LifecycleError> {
    std::fs::create_dir_all(state_dir)?;
    let path = state_dir.join("stratusd.pid");
    // No truncation until the lock is ours: a losing candidate must not
    // clobber the holder's pid.
    let mut file = std::fs::OpenOptions::new().read(true).write(true).create(true).open(&path)?;
    if file.try_lock_exclusive().is_err() {
        return Err(LifecycleError::Locked(path));
    }
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(LockFile { file })
}

/// Assemble the full agent set over the configured providers.
pub fn build_agents(
    providers: &Arc<ProviderDirectory>,
    configs: &[ProviderConfig],
) -> Result<Vec<Arc<dyn Agent>>, AgentError> {
    let clock = SystemClock;
    let mut agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(PreProvisionAgent::new(Arc::clone(providers), clock.clone())?),
        Arc::new(ProvisioningAgent::new(clock.clone())),
        Arc::new(PreCheckAgent::new(Arc::clone(providers), clock.clone())),
        Arc::new(PreOperationalAgent::new(Arc::clone(providers), clock.clone())?),
        Arc::new(PreStartAgent::new(Arc::clone(providers), clock.clone())),
        Arc::new(PreStopAgent::new(Arc::clone(providers), clock.clone())),
        Arc::new(PreDeleteAgent::new(Arc::clone(providers), clock.clone())),
        Arc::new(ValidAgent::new(clock.clone())),
        Arc::new(MembershipAgent),
    ];
    for config in configs {
        match &config.pipe.tokens {
            Some(path) => {
                agents.push(Arc::new(SessionAgent::new(
                    Arc::clone(providers),
                    path.clone(),
                    clock.clone(),
                )));
            }
            None => {
                warn!(provider = config.name(), "no token pipe configured");
            }
        }
    }
    Ok(agents)
}

/// Open the store and make sure every configured provider is on record.
fn open_store(args: &Args, configs: &[ProviderConfig]) -> Result<Store, LifecycleError> {
    let mut store = match &args.db {
        Some(path) => Store::open(path)?,
        None => Store::in_memory(),
    };
    for config in configs {
        if store.provider(config.name()).is_none() {
            store.register_provider(ProviderRecord { name: config.name().to_string() })?;
        }
    }
    Ok(store)
}

/// Start everything and reconcile until interrupted. Returns on clean
/// shutdown.
pub async fn run(args: Args) -> Result<(), LifecycleError> {
    let state_dir = env::state_dir()?;
    let _lock = acquire_lock(&state_dir)?;

    let config_dir = env::config_dir()?;
    let configs = ProviderConfig::load_dir(&config_dir)?;
    info!(providers = configs.len(), config_dir = %config_dir.display(), "configured");

    let mut directory = ProviderDirectory::new();
    for config in &configs {
        let gateway = VcloudGateway::new(config)?;
        directory.insert(config.clone(), Arc::new(gateway));
    }
    let providers = Arc::new(directory);

    let mut store = open_store(&args, &configs)?;
    let agents = build_agents(&providers, &configs)?;

    let shutdown = CancellationToken::new();
    let interrupter = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; shutting down");
            interrupter.cancel();
        }
    });

    let options = SchedulerOptions::with_interval(Duration::from_secs(args.interval.max(1)));
    operate(&mut store, agents, shutdown, options).await;

    info!("shutdown complete");
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
