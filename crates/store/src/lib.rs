// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! stratus-store: the audit store the controller reconciles against.
//!
//! State is materialized from an append-only log of records. Every write
//! goes through [`Store::append`], which validates the full transaction
//! before mutating anything, so a failed append leaves the store exactly
//! as it was.

mod log;
mod store;

pub use log::{LogRecord, TouchLog};
pub use store::Store;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown artifact {0}")]
    UnknownArtifact(uuid::Uuid),

    #[error("unknown organisation {0:?}")]
    UnknownOrganisation(String),

    #[error("artifact {artifact} already exists")]
    DuplicateArtifact { artifact: uuid::Uuid },

    #[error("state {state} does not belong to the {fsm} machine")]
    FsmMismatch { state: String, fsm: &'static str },

    #[error("illegal transition {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    #[error("first touch must enter at {expected}, got {got}")]
    BadEntryState { expected: String, got: String },

    #[error("external IP {ip_ext} already routed under provider {provider}")]
    NatConflict { ip_ext: String, provider: String },

    #[error("log I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("log record: {0}")]
    Codec(#[from] serde_json::Error),
}
