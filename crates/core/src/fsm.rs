// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One state-machine definition per artifact kind.
//!
//! Every lifecycle state the controller knows belongs to exactly one of
//! the machines below. A `pre_*` state is a work trigger: the agent bound
//! to it performs the external action and emits the message that advances
//! the artifact.

use serde::{Deserialize, Serialize};

/// Common surface of a lifecycle state machine.
pub trait Fsm: Copy + Eq + Sized + 'static {
    /// Machine name as recorded in the audit log.
    const NAME: &'static str;

    /// The state a newly created artifact starts in.
    fn entry() -> Self;

    /// States reachable from `self` by a single transition.
    fn successors(self) -> &'static [Self];

    /// State name as recorded in the audit log.
    fn name(self) -> &'static str;

    /// No further transitions are possible.
    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// A transition to `next` is legal. Re-asserting the current state is
    /// always permitted; it appends an audit entry without advancing.
    fn may_advance_to(self, next: Self) -> bool {
        next == self || self.successors().contains(&next)
    }
}

/// Appliance lifecycle.
///
/// ```text
/// requested → configuring → pre_provision → provisioning → pre_check →
///   { operational, pre_operational, provisioning }
/// pre_operational → { operational, pre_stop }
/// operational → { pre_check, pre_stop }
/// pre_stop → stopped
/// stopped → { pre_start, pre_delete }
/// pre_start → running → pre_stop
/// pre_delete → deleted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplianceState {
    Requested,
    Configuring,
    PreProvision,
    Provisioning,
    PreCheck,
    PreOperational,
    Operational,
    PreStop,
    Stopped,
    PreStart,
    Running,
    PreDelete,
    Deleted,
}

impl ApplianceState {
    /// States that advance only through user or controller action.
    pub fn is_static(self) -> bool {
        use ApplianceState::*;
        matches!(
            self,
            Configuring
                | PreCheck
                | PreOperational
                | PreProvision
                | PreDelete
                | PreStop
                | PreStart
                | Deleted
                | Stopped
        )
    }

    /// States in which the appliance is doing something on the provider.
    pub fn is_active(self) -> bool {
        use ApplianceState::*;
        matches!(self, Provisioning | Operational | Running)
    }
}

impl Fsm for ApplianceState {
    const NAME: &'static str = "appliance";

    fn entry() -> Self {
        ApplianceState::Requested
    }

    fn successors(self) -> &'static [Self] {
        use ApplianceState::*;
        match self {
            Requested => &[Configuring],
            Configuring => &[PreProvision],
            PreProvision => &[Provisioning],
            Provisioning => &[PreCheck],
            PreCheck => &[Operational, PreOperational, Provisioning],
            PreOperational => &[Operational, PreStop],
            Operational => &[PreCheck, PreStop],
            PreStop => &[Stopped],
            Stopped => &[PreStart, PreDelete],
            PreStart => &[Running],
            Running => &[PreStop],
            PreDelete => &[Deleted],
            Deleted => &[],
        }
    }

    fn name(self) -> &'static str {
        use ApplianceState::*;
        match self {
            Requested => "requested",
            Configuring => "configuring",
            PreProvision => "pre_provision",
            Provisioning => "provisioning",
            PreCheck => "pre_check",
            PreOperational => "pre_operational",
            Operational => "operational",
            PreStop => "pre_stop",
            Stopped => "stopped",
            PreStart => "pre_start",
            Running => "running",
            PreDelete => "pre_delete",
            Deleted => "deleted",
        }
    }
}

crate::simple_display! {
    ApplianceState {
        Requested => "requested",
        Configuring => "configuring",
        PreProvision => "pre_provision",
        Provisioning => "provisioning",
        PreCheck => "pre_check",
        PreOperational => "pre_operational",
        Operational => "operational",
        PreStop => "pre_stop",
        Stopped => "stopped",
        PreStart => "pre_start",
        Running => "running",
        PreDelete => "pre_delete",
        Deleted => "deleted",
    }
}

/// Registration lifecycle. A user's identity with a provider; `expired`
/// freezes the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    PreRegistration,
    Valid,
    Active,
    Expired,
}

impl Fsm for RegistrationState {
    const NAME: &'static str = "registration";

    fn entry() -> Self {
        RegistrationState::PreRegistration
    }

    fn successors(self) -> &'static [Self] {
        use RegistrationState::*;
        match self {
            PreRegistration => &[Valid],
            Valid => &[Active],
            Active => &[Valid, Expired],
            Expired => &[],
        }
    }

    fn name(self) -> &'static str {
        use RegistrationState::*;
        match self {
            PreRegistration => "pre_registration",
            Valid => "valid",
            Active => "active",
            Expired => "expired",
        }
    }
}

crate::simple_display! {
    RegistrationState {
        PreRegistration => "pre_registration",
        Valid => "valid",
        Active => "active",
        Expired => "expired",
    }
}

/// Membership lifecycle. Entry is `invite`: memberships are created by an
/// organisation admin inviting a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    Invite,
    Active,
    Expired,
}

impl Fsm for MembershipState {
    const NAME: &'static str = "membership";

    fn entry() -> Self {
        MembershipState::Invite
    }

    fn successors(self) -> &'static [Self] {
        use MembershipState::*;
        match self {
            Invite => &[Active],
            Active => &[Expired],
            Expired => &[],
        }
    }

    fn name(self) -> &'static str {
        use MembershipState::*;
        match self {
            Invite => "invite",
            Active => "active",
            Expired => "expired",
        }
    }
}

crate::simple_display! {
    MembershipState {
        Invite => "invite",
        Active => "active",
        Expired => "expired",
    }
}

/// Subscription lifecycle. Cyclic: a subscription drops back to
/// `maintenance` and is re-checked; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Unchecked,
    Active,
    Maintenance,
}

impl Fsm for SubscriptionState {
    const NAME: &'static str = "subscription";

    fn entry() -> Self {
        SubscriptionState::Unchecked
    }

    fn successors(self) -> &'static [Self] {
        use SubscriptionState::*;
        match self {
            Unchecked => &[Active],
            Active => &[Maintenance],
            Maintenance => &[Unchecked],
        }
    }

    fn name(self) -> &'static str {
        use SubscriptionState::*;
        match self {
            Unchecked => "unchecked",
            Active => "active",
            Maintenance => "maintenance",
        }
    }
}

crate::simple_display! {
    SubscriptionState {
        Unchecked => "unchecked",
        Active => "active",
        Maintenance => "maintenance",
    }
}

/// A state of one of the controller's machines, as carried by a Touch.
///
/// Serializes as `{"fsm": "appliance", "name": "pre_check"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fsm", content = "name", rename_all = "snake_case")]
pub enum State {
    Appliance(ApplianceState),
    Registration(RegistrationState),
    Membership(MembershipState),
    Subscription(SubscriptionState),
}

impl State {
    pub fn fsm_name(&self) -> &'static str {
        match self {
            State::Appliance(_) => ApplianceState::NAME,
            State::Registration(_) => RegistrationState::NAME,
            State::Membership(_) => MembershipState::NAME,
            State::Subscription(_) => SubscriptionState::NAME,
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            State::Appliance(s) => s.name(),
            State::Registration(s) => s.name(),
            State::Membership(s) => s.name(),
            State::Subscription(s) => s.name(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            State::Appliance(s) => s.is_terminal(),
            State::Registration(s) => s.is_terminal(),
            State::Membership(s) => s.is_terminal(),
            State::Subscription(s) => s.is_terminal(),
        }
    }

    /// Legal single transition, including re-asserting the current state.
    /// States of different machines never advance to one another.
    pub fn may_advance_to(&self, next: &State) -> bool {
        match (self, next) {
            (State::Appliance(a), State::Appliance(b)) => a.may_advance_to(*b),
            (State::Registration(a), State::Registration(b)) => a.may_advance_to(*b),
            (State::Membership(a), State::Membership(b)) => a.may_advance_to(*b),
            (State::Subscription(a), State::Subscription(b)) => a.may_advance_to(*b),
            _ => false,
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.fsm_name(), self.state_name())
    }
}

impl From<ApplianceState> for State {
    fn from(s: ApplianceState) -> Self {
        State::Appliance(s)
    }
}

impl From<RegistrationState> for State {
    fn from(s: RegistrationState) -> Self {
        State::Registration(s)
    }
}

impl From<MembershipState> for State {
    fn from(s: MembershipState) -> Self {
        State::Membership(s)
    }
}

impl From<SubscriptionState> for State {
    fn from(s: SubscriptionState) -> Self {
        State::Subscription(s)
    }
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod tests;
