// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifacts and the reference records they hang off.

use crate::fsm::{
    ApplianceState, Fsm, MembershipState, RegistrationState, State, SubscriptionState,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role a user holds inside an organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Admin,
    User,
}

crate::simple_display! {
    MembershipRole {
        Admin => "admin",
        User => "user",
    }
}

/// What kind of lifecycle an artifact follows, plus the kind-specific
/// attributes the schema attaches directly to the artifact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactKind {
    Appliance,
    Registration,
    Membership { role: MembershipRole },
    /// Links the owning organisation to a provider.
    Subscription { provider: String },
}

impl ArtifactKind {
    pub fn fsm_name(&self) -> &'static str {
        match self {
            ArtifactKind::Appliance => ApplianceState::NAME,
            ArtifactKind::Registration => RegistrationState::NAME,
            ArtifactKind::Membership { .. } => MembershipState::NAME,
            ArtifactKind::Subscription { .. } => SubscriptionState::NAME,
        }
    }

    /// The entry state of the kind's machine.
    pub fn entry_state(&self) -> State {
        match self {
            ArtifactKind::Appliance => ApplianceState::entry().into(),
            ArtifactKind::Registration => RegistrationState::entry().into(),
            ArtifactKind::Membership { .. } => MembershipState::entry().into(),
            ArtifactKind::Subscription { .. } => SubscriptionState::entry().into(),
        }
    }

    /// A state belongs to this kind's machine.
    pub fn owns_state(&self, state: &State) -> bool {
        state.fsm_name() == self.fsm_name()
    }
}

crate::simple_display! {
    ArtifactKind {
        Appliance => "appliance",
        Registration => "registration",
        Membership {..} => "membership",
        Subscription {..} => "subscription",
    }
}

/// Anything whose lifecycle is tracked in the audit log.
///
/// The artifact row itself is nearly inert: everything that changes lives
/// in its ordered Touch sequence. The last Touch determines the current
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub uuid: Uuid,
    /// Model version the artifact was created under.
    pub model: String,
    /// Name of the owning organisation.
    pub organisation: String,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn new(organisation: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            model: env!("CARGO_PKG_VERSION").to_string(),
            organisation: organisation.into(),
            kind,
        }
    }
}

/// An organisation that owns artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    pub name: String,
}

/// A human (or component) that appears as a Touch actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub handle: String,
    pub uuid: Uuid,
}

/// An IaaS provider the controller can drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub name: String,
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
