// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message dispatcher: a type-keyed, single-threaded registry.

use std::collections::HashMap;
use stratus_core::{Message, MessageKind, Touch};
use stratus_store::{Store, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("handler received unexpected variant {0}")]
    WrongVariant(&'static str),

    #[error("message {name} targets unknown artifact {uuid}")]
    UnknownTarget { name: &'static str, uuid: uuid::Uuid },
}

/// A message handler: applies the transition, commits, returns the Touch.
pub type Handler = Box<dyn Fn(&Message, &mut Store) -> Result<Touch, DispatchError> + Send>;

/// Routes each inbound message to the handler registered for its kind.
///
/// Handlers are expected to be short, synchronous with respect to store
/// I/O, and idempotent in effect.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<MessageKind, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `handler` for `kind`. Last registration wins; agents own
    /// disjoint message sets so a collision is a wiring bug worth a log.
    pub fn register(&mut self, kind: MessageKind, handler: Handler) {
        if self.handlers.insert(kind, handler).is_some() {
            tracing::warn!(%kind, "handler re-registered");
        }
    }

    pub fn is_registered(&self, kind: MessageKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Invoke the handler for the message's kind. No handler is a warn
    /// and a no-op, not an error.
    pub fn dispatch(
        &self,
        msg: &Message,
        store: &mut Store,
    ) -> Option<Result<Touch, DispatchError>> {
        match self.handlers.get(&msg.kind()) {
            Some(handler) => Some(handler(msg, store)),
            None => {
                tracing::warn!(message = msg.name(), "no handler registered");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
