// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stratus-agents: one worker per trigger state.
//!
//! An agent is four things: a `jobs` query over the store, a work
//! channel the scheduler feeds, a set of message handlers registered
//! with the dispatcher at boot, and a long-lived task that consumes
//! jobs, drives the provider, and emits messages.

pub mod appliance;
pub mod dispatch;
pub mod framework;
pub mod membership;
pub mod registration;
pub mod session;
pub mod subscription;

#[cfg(test)]
pub(crate) mod test_util;

pub use appliance::{
    PreCheckAgent, PreDeleteAgent, PreOperationalAgent, PreProvisionAgent, PreStartAgent,
    PreStopAgent, ProvisioningAgent,
};
pub use dispatch::{DispatchError, Dispatcher, Handler};
pub use framework::{Agent, AgentError, ProviderDirectory, ProviderEntry};
pub use membership::MembershipAgent;
pub use registration::ValidAgent;
pub use session::{SessionAgent, TokenRecord};
