// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level loop: poll agents for jobs, dedup against the pending
//! set, drain the inbound message channel, apply transitions.
//!
//! There are no parallel threads of execution. The loop task is the only
//! context that mutates the store or the pending set; agents see only the
//! snapshots carried by their Jobs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stratus_agents::{Agent, Dispatcher};
use stratus_core::{Job, Message};
use stratus_store::Store;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-agent work channel depth.
const WORK_CHANNEL_CAP: usize = 64;

/// Shared inbound message channel depth.
const MESSAGE_CHANNEL_CAP: usize = 256;

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Pause when the pending set is non-empty. Cheap polling while busy.
    pub busy_pause: Duration,
    /// Pause when nothing is in flight.
    pub idle_pause: Duration,
    /// How long a pending entry may wait for its message before it is
    /// evicted and the job re-offered. Guards against a job whose
    /// message never arrives wedging the artifact forever.
    pub dispatch_deadline: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            busy_pause: Duration::from_millis(100),
            idle_pause: Duration::from_secs(1),
            dispatch_deadline: Duration::from_secs(120),
        }
    }
}

impl SchedulerOptions {
    /// Cap the pauses at the configured scheduling interval and scale the
    /// deadline so it never undercuts a slow tick.
    pub fn with_interval(interval: Duration) -> Self {
        let defaults = Self::default();
        Self {
            busy_pause: defaults.busy_pause.min(interval),
            idle_pause: interval,
            dispatch_deadline: defaults.dispatch_deadline.max(interval * 4),
        }
    }
}

/// Drive all agents until every agent task has terminated or `shutdown`
/// fires.
///
/// At most one outstanding Job per artifact: a uuid enters the pending
/// set when its Job is enqueued and leaves it when a handler commits the
/// resulting Touch, or when its dispatch deadline lapses.
pub async fn operate(
    store: &mut Store,
    agents: Vec<Arc<dyn Agent>>,
    shutdown: CancellationToken,
    options: SchedulerOptions,
) {
    let mut dispatcher = Dispatcher::new();
    for agent in &agents {
        agent.callbacks(&mut dispatcher);
    }

    let (msg_tx, mut inbound) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAP);
    let mut work: Vec<mpsc::Sender<Job>> = Vec::with_capacity(agents.len());
    let mut tasks = Vec::with_capacity(agents.len());
    for agent in &agents {
        let (work_tx, work_rx) = mpsc::channel::<Job>(WORK_CHANNEL_CAP);
        work.push(work_tx);
        let agent = Arc::clone(agent);
        let out = msg_tx.clone();
        tasks.push(tokio::spawn(async move { agent.run(work_rx, out).await }));
    }
    // The loop holds no sender: once the work channels close, agents
    // finish and the message channel drains to a close.
    drop(msg_tx);

    let mut pending: HashMap<Uuid, Instant> = HashMap::new();
    tracing::info!(agents = agents.len(), "scheduler operating");

    while !tasks.iter().all(|t| t.is_finished()) {
        if shutdown.is_cancelled() {
            break;
        }
        tokio::task::yield_now().await;

        // Entries past the dispatch deadline are released for retry.
        let deadline = options.dispatch_deadline;
        pending.retain(|uuid, since| {
            if since.elapsed() > deadline {
                tracing::warn!(%uuid, "dispatch deadline lapsed; releasing");
                false
            } else {
                true
            }
        });

        // Round-robin over agents; FIFO within an agent's channel.
        for (agent, work_tx) in agents.iter().zip(&work) {
            for job in agent.jobs(store) {
                let uuid = job.uuid;
                if pending.contains_key(&uuid) {
                    continue;
                }
                pending.insert(uuid, Instant::now());
                if work_tx.send(job).await.is_err() {
                    tracing::error!(agent = agent.name(), %uuid, "work channel closed");
                    pending.remove(&uuid);
                }
            }
        }

        let pause = if pending.is_empty() { options.idle_pause } else { options.busy_pause };
        tokio::select! {
            () = tokio::time::sleep(pause) => {}
            () = shutdown.cancelled() => {}
        }

        drain(&mut inbound, &dispatcher, store, &mut pending);
    }

    // Stop feeding work; closed channels are the agents' shutdown signal.
    drop(work);
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "agent task panicked");
        }
    }
    // Commit whatever the final iterations produced.
    drain(&mut inbound, &dispatcher, store, &mut pending);
    tracing::info!("scheduler stopped");
}

/// Non-blocking drain of the inbound channel. A committed Touch clears
/// its artifact's pending entry; a failed handler leaves the entry in
/// place (the store rolled back, so the next `jobs()` re-offers it).
fn drain(
    inbound: &mut mpsc::Receiver<Message>,
    dispatcher: &Dispatcher,
    store: &mut Store,
    pending: &mut HashMap<Uuid, Instant>,
) {
    while let Ok(msg) = inbound.try_recv() {
        match dispatcher.dispatch(&msg, store) {
            Some(Ok(touch)) => {
                tracing::debug!(
                    message = msg.name(),
                    uuid = %touch.artifact,
                    state = %touch.state,
                    "applied"
                );
                pending.remove(&touch.artifact);
            }
            Some(Err(e)) => {
                tracing::error!(message = msg.name(), uuid = %msg.uuid(), error = %e, "handler failed");
            }
            None => {}
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
