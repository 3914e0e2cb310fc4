// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription maintenance operations.

use chrono::{DateTime, Utc};
use stratus_core::fsm::SubscriptionState;
use stratus_core::{Resource, Touch};
use stratus_store::{Store, StoreError};
use uuid::Uuid;

/// Bring a subscription out of maintenance so it gets re-checked.
/// A no-op unless the subscription is currently in `maintenance`.
pub fn online(
    store: &mut Store,
    actor: &str,
    subscription: Uuid,
    at: DateTime<Utc>,
) -> Result<Option<Touch>, StoreError> {
    if store.latest_state(subscription) != Some(SubscriptionState::Maintenance.into()) {
        return Ok(None);
    }
    store
        .append(Touch::new(subscription, actor, SubscriptionState::Unchecked, at))
        .map(Some)
}

/// Record the catalogue of a provider as most recently discovered,
/// activating the subscription. A no-op unless it is `unchecked`.
pub fn catalogue(
    store: &mut Store,
    actor: &str,
    subscription: Uuid,
    items: Vec<Resource>,
    at: DateTime<Utc>,
) -> Result<Option<Touch>, StoreError> {
    if store.latest_state(subscription) != Some(SubscriptionState::Unchecked.into()) {
        return Ok(None);
    }
    let mut touch = Touch::new(subscription, actor, SubscriptionState::Active, at);
    touch.resources = items;
    store.append(touch).map(Some)
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
