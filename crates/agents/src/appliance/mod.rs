// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seven appliance agents, one per trigger state.

mod pre_check;
mod pre_delete;
mod pre_operational;
mod pre_provision;
mod pre_start;
mod pre_stop;
mod provisioning;

pub use pre_check::PreCheckAgent;
pub use pre_delete::PreDeleteAgent;
pub use pre_operational::PreOperationalAgent;
pub use pre_provision::PreProvisionAgent;
pub use pre_start::PreStartAgent;
pub use pre_stop::PreStopAgent;
pub use provisioning::ProvisioningAgent;

use crate::dispatch::DispatchError;
use chrono::{DateTime, Utc};
use stratus_core::{Resource, State, Touch, CONTROLLER_HANDLE};
use stratus_store::Store;
use uuid::Uuid;

/// Handler tail shared by every appliance handler: append the Touch (and
/// its resources) as the controller, in one store transaction.
pub(crate) fn append_as_controller(
    store: &mut Store,
    uuid: Uuid,
    state: impl Into<State>,
    ts: DateTime<Utc>,
    resources: Vec<Resource>,
) -> Result<Touch, DispatchError> {
    let mut touch = Touch::new(uuid, CONTROLLER_HANDLE, state, ts);
    touch.resources = resources;
    Ok(store.append(touch)?)
}
