// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Membership invitations and the endorse audit marker.

use crate::appliance::append_as_controller;
use crate::dispatch::{DispatchError, Dispatcher, Handler};
use crate::framework::{Agent, AgentError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stratus_core::fsm::MembershipState;
use stratus_core::{
    Artifact, ArtifactKind, Job, MembershipRole, Message, MessageKind, Touch,
};
use stratus_store::{Store, StoreError};

/// Create an invited membership in `org` on behalf of `admin`.
///
/// Only a user holding an *active* admin membership of the organisation
/// may invite; anyone else gets `Ok(None)` and no store mutation.
pub fn invitation(
    store: &mut Store,
    admin: &str,
    org: &str,
    role: MembershipRole,
    at: DateTime<Utc>,
) -> Result<Option<Touch>, StoreError> {
    let reader: &Store = store;
    let privileged = reader.artifacts().any(|a| {
        matches!(a.kind, ArtifactKind::Membership { role: MembershipRole::Admin })
            && a.organisation == org
            && reader.latest_state(a.uuid) == Some(MembershipState::Active.into())
            && reader.touches(a.uuid).iter().any(|t| t.actor == admin)
    });
    if !privileged {
        return Ok(None);
    }

    let mship = Artifact::new(org, ArtifactKind::Membership { role });
    store.create_artifact(mship, admin, at).map(Some)
}

/// Registers the `touch_to_previous` handler: an endorse message appends
/// a Touch that re-uses the membership's current state. A marker in the
/// audit trail, nothing more.
pub struct MembershipAgent;

#[async_trait]
impl Agent for MembershipAgent {
    fn name(&self) -> &'static str {
        "membership"
    }

    /// Invitations are driven by the front-end, not by a trigger state.
    fn jobs(&self, _store: &Store) -> Vec<Job> {
        Vec::new()
    }

    fn callbacks(&self, dispatcher: &mut Dispatcher) {
        dispatcher.register(MessageKind::MembershipEndorsed, touch_to_previous());
    }

    async fn process(&self, _job: Job) -> Result<Option<Message>, AgentError> {
        Ok(None)
    }
}

fn touch_to_previous() -> Handler {
    Box::new(|msg, store| {
        let Message::MembershipEndorsed { uuid, ts } = msg else {
            return Err(DispatchError::WrongVariant(msg.name()));
        };
        let state = store
            .latest_state(*uuid)
            .ok_or(DispatchError::UnknownTarget { name: msg.name(), uuid: *uuid })?;
        append_as_controller(store, *uuid, state, *ts, vec![])
    })
}

#[cfg(test)]
#[path = "membership_tests.rs"]
mod tests;
