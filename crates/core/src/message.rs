// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages agents emit after acting on a job.
//!
//! A message's variant selects the state transition its registered
//! handler applies. Serializes with `{"type": "appliance:provisioning",
//! ...fields}` format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of one agent action, addressed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Compose succeeded; the vApp exists at `uri`.
    #[serde(rename = "appliance:provisioning")]
    Provisioning { uuid: Uuid, ts: DateTime<Utc>, provider: String, uri: String },

    /// Enough time has passed in `provisioning`; schedule a check.
    #[serde(rename = "appliance:check_required")]
    CheckRequired { uuid: Uuid, ts: DateTime<Utc> },

    /// Check found the appliance fully customised and previously
    /// operational.
    #[serde(rename = "appliance:checked_operational")]
    CheckedAsOperational {
        uuid: Uuid,
        ts: DateTime<Utc>,
        provider: String,
        ip: Option<String>,
        creation: Option<String>,
        power: Option<String>,
        health: Option<String>,
    },

    /// Check found the appliance customised but never yet operational.
    #[serde(rename = "appliance:checked_preoperational")]
    CheckedAsPreOperational {
        uuid: Uuid,
        ts: DateTime<Utc>,
        provider: String,
        ip: Option<String>,
        creation: Option<String>,
        power: Option<String>,
        health: Option<String>,
    },

    /// Check found customisation still in progress.
    #[serde(rename = "appliance:checked_provisioning")]
    CheckedAsProvisioning {
        uuid: Uuid,
        ts: DateTime<Utc>,
        provider: String,
        ip: Option<String>,
        creation: Option<String>,
        power: Option<String>,
        health: Option<String>,
    },

    /// NAT and firewall wiring done (or not needed); the appliance is
    /// reachable.
    #[serde(rename = "appliance:operational")]
    Operational {
        uuid: Uuid,
        ts: DateTime<Utc>,
        provider: String,
        ip_int: Option<String>,
        ip_ext: Option<String>,
    },

    /// No free public IP in the subscription pool.
    #[serde(rename = "appliance:resource_constrained")]
    ResourceConstrained { uuid: Uuid, ts: DateTime<Utc>, provider: String },

    /// Deploy with power-on accepted.
    #[serde(rename = "appliance:running")]
    Running { uuid: Uuid, ts: DateTime<Utc>, provider: String },

    /// Undeploy with power-off accepted.
    #[serde(rename = "appliance:stopped")]
    Stopped { uuid: Uuid, ts: DateTime<Utc>, provider: String },

    /// vApp deleted on the provider.
    #[serde(rename = "appliance:deleted")]
    Deleted { uuid: Uuid, ts: DateTime<Utc>, provider: String },

    /// A valid registration answered a session probe.
    #[serde(rename = "registration:activated")]
    RegistrationActivated { uuid: Uuid, ts: DateTime<Utc>, provider: String },

    /// The token ingress obtained a bearer header for a registration.
    #[serde(rename = "registration:token")]
    TokenReceived {
        uuid: Uuid,
        ts: DateTime<Utc>,
        provider: String,
        key: String,
        value: String,
    },

    /// Audit marker: re-assert a membership's current state.
    #[serde(rename = "membership:endorsed")]
    MembershipEndorsed { uuid: Uuid, ts: DateTime<Utc> },
}

/// Tag-only variant of [`Message`], the dispatcher's registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Provisioning,
    CheckRequired,
    CheckedAsOperational,
    CheckedAsPreOperational,
    CheckedAsProvisioning,
    Operational,
    ResourceConstrained,
    Running,
    Stopped,
    Deleted,
    RegistrationActivated,
    TokenReceived,
    MembershipEndorsed,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Provisioning { .. } => MessageKind::Provisioning,
            Message::CheckRequired { .. } => MessageKind::CheckRequired,
            Message::CheckedAsOperational { .. } => MessageKind::CheckedAsOperational,
            Message::CheckedAsPreOperational { .. } => MessageKind::CheckedAsPreOperational,
            Message::CheckedAsProvisioning { .. } => MessageKind::CheckedAsProvisioning,
            Message::Operational { .. } => MessageKind::Operational,
            Message::ResourceConstrained { .. } => MessageKind::ResourceConstrained,
            Message::Running { .. } => MessageKind::Running,
            Message::Stopped { .. } => MessageKind::Stopped,
            Message::Deleted { .. } => MessageKind::Deleted,
            Message::RegistrationActivated { .. } => MessageKind::RegistrationActivated,
            Message::TokenReceived { .. } => MessageKind::TokenReceived,
            Message::MembershipEndorsed { .. } => MessageKind::MembershipEndorsed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Message::Provisioning { .. } => "appliance:provisioning",
            Message::CheckRequired { .. } => "appliance:check_required",
            Message::CheckedAsOperational { .. } => "appliance:checked_operational",
            Message::CheckedAsPreOperational { .. } => "appliance:checked_preoperational",
            Message::CheckedAsProvisioning { .. } => "appliance:checked_provisioning",
            Message::Operational { .. } => "appliance:operational",
            Message::ResourceConstrained { .. } => "appliance:resource_constrained",
            Message::Running { .. } => "appliance:running",
            Message::Stopped { .. } => "appliance:stopped",
            Message::Deleted { .. } => "appliance:deleted",
            Message::RegistrationActivated { .. } => "registration:activated",
            Message::TokenReceived { .. } => "registration:token",
            Message::MembershipEndorsed { .. } => "membership:endorsed",
        }
    }

    /// The artifact this message is about.
    pub fn uuid(&self) -> Uuid {
        match self {
            Message::Provisioning { uuid, .. }
            | Message::CheckRequired { uuid, .. }
            | Message::CheckedAsOperational { uuid, .. }
            | Message::CheckedAsPreOperational { uuid, .. }
            | Message::CheckedAsProvisioning { uuid, .. }
            | Message::Operational { uuid, .. }
            | Message::ResourceConstrained { uuid, .. }
            | Message::Running { uuid, .. }
            | Message::Stopped { uuid, .. }
            | Message::Deleted { uuid, .. }
            | Message::RegistrationActivated { uuid, .. }
            | Message::TokenReceived { uuid, .. }
            | Message::MembershipEndorsed { uuid, .. } => *uuid,
        }
    }

    pub fn ts(&self) -> DateTime<Utc> {
        match self {
            Message::Provisioning { ts, .. }
            | Message::CheckRequired { ts, .. }
            | Message::CheckedAsOperational { ts, .. }
            | Message::CheckedAsPreOperational { ts, .. }
            | Message::CheckedAsProvisioning { ts, .. }
            | Message::Operational { ts, .. }
            | Message::ResourceConstrained { ts, .. }
            | Message::Running { ts, .. }
            | Message::Stopped { ts, .. }
            | Message::Deleted { ts, .. }
            | Message::RegistrationActivated { ts, .. }
            | Message::TokenReceived { ts, .. }
            | Message::MembershipEndorsed { ts, .. } => *ts,
        }
    }
}

crate::simple_display! {
    MessageKind {
        Provisioning => "provisioning",
        CheckRequired => "check_required",
        CheckedAsOperational => "checked_as_operational",
        CheckedAsPreOperational => "checked_as_pre_operational",
        CheckedAsProvisioning => "checked_as_provisioning",
        Operational => "operational",
        ResourceConstrained => "resource_constrained",
        Running => "running",
        Stopped => "stopped",
        Deleted => "deleted",
        RegistrationActivated => "registration_activated",
        TokenReceived => "token_received",
        MembershipEndorsed => "membership_endorsed",
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
