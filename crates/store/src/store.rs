// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state and the indexed queries over it.

use crate::log::{LogRecord, TouchLog};
use crate::StoreError;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use stratus_core::{
    AccessToken, Artifact, ArtifactKind, ArtifactSnapshot, Organisation, ProviderRecord,
    Resource, State, SubscriptionView, Touch, User,
};
use uuid::Uuid;

/// A committed provider credential, indexed for the token-currency rule.
#[derive(Debug, Clone)]
struct TokenEntry {
    at: DateTime<Utc>,
    actor: String,
    provider: String,
    key: String,
    value: String,
}

/// The controller's view of the shared persistent store.
///
/// Artifact iteration order is insertion order, which keeps job polling
/// deterministic across ticks.
pub struct Store {
    log: Option<TouchLog>,
    organisations: IndexMap<String, Organisation>,
    users: IndexMap<String, User>,
    providers: IndexMap<String, ProviderRecord>,
    artifacts: IndexMap<Uuid, Artifact>,
    touches: HashMap<Uuid, Vec<Touch>>,
    /// (provider, external IP) → owning artifact.
    nat_index: HashMap<(String, String), Uuid>,
    tokens: Vec<TokenEntry>,
}

impl Store {
    /// A store with no backing log. State is lost on shutdown.
    pub fn in_memory() -> Self {
        Self {
            log: None,
            organisations: IndexMap::new(),
            users: IndexMap::new(),
            providers: IndexMap::new(),
            artifacts: IndexMap::new(),
            touches: HashMap::new(),
            nat_index: HashMap::new(),
            tokens: Vec::new(),
        }
    }

    /// Open a disk-backed store, replaying any existing records.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (log, records) = TouchLog::open(path)?;
        let mut store = Self::in_memory();
        store.log = Some(log);
        for record in records {
            store.apply_replayed(record)?;
        }
        Ok(store)
    }

    fn apply_replayed(&mut self, record: LogRecord) -> Result<(), StoreError> {
        match record {
            LogRecord::Organisation(org) => {
                self.organisations.insert(org.name.clone(), org);
            }
            LogRecord::User(user) => {
                self.users.insert(user.handle.clone(), user);
            }
            LogRecord::Provider(provider) => {
                self.providers.insert(provider.name.clone(), provider);
            }
            LogRecord::Artifact(artifact) => {
                self.artifacts.insert(artifact.uuid, artifact);
            }
            LogRecord::Touch(touch) => {
                // Replayed touches were validated when first written.
                self.append_inner(touch, false)?;
            }
        }
        Ok(())
    }

    // ── Reference data ──────────────────────────────────────────────────

    pub fn register_organisation(&mut self, org: Organisation) -> Result<(), StoreError> {
        self.persist(&LogRecord::Organisation(org.clone()))?;
        self.organisations.insert(org.name.clone(), org);
        Ok(())
    }

    pub fn register_user(&mut self, user: User) -> Result<(), StoreError> {
        self.persist(&LogRecord::User(user.clone()))?;
        self.users.insert(user.handle.clone(), user);
        Ok(())
    }

    pub fn register_provider(&mut self, provider: ProviderRecord) -> Result<(), StoreError> {
        self.persist(&LogRecord::Provider(provider.clone()))?;
        self.providers.insert(provider.name.clone(), provider);
        Ok(())
    }

    fn persist(&mut self, record: &LogRecord) -> Result<(), StoreError> {
        match &mut self.log {
            Some(log) => log.append(record),
            None => Ok(()),
        }
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Create an artifact with its first Touch at the entry state of its
    /// machine. This is what the web front-end does; tests and the demo
    /// seeding path use it too.
    pub fn create_artifact(
        &mut self,
        artifact: Artifact,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<Touch, StoreError> {
        if !self.organisations.contains_key(&artifact.organisation) {
            return Err(StoreError::UnknownOrganisation(artifact.organisation));
        }
        if self.artifacts.contains_key(&artifact.uuid) {
            return Err(StoreError::DuplicateArtifact { artifact: artifact.uuid });
        }
        self.persist(&LogRecord::Artifact(artifact.clone()))?;
        let entry = artifact.kind.entry_state();
        let uuid = artifact.uuid;
        self.artifacts.insert(uuid, artifact);
        self.append(Touch::new(uuid, actor, entry, at))
    }

    /// Append one Touch with its resource side effects: the single
    /// transactional write. All validation happens before any mutation,
    /// so an `Err` here is a rollback.
    ///
    /// Two adjustments are applied rather than rejected, because message
    /// handlers must stay idempotent:
    /// - a timestamp at or before the latest Touch is nudged forward 1 ms
    ///   (preserves the `(artifact, ts)` uniqueness invariant);
    /// - a NAT routing already held by the *same* artifact is dropped
    ///   from the resource list (the Touch still lands as a plain audit
    ///   entry).
    pub fn append(&mut self, touch: Touch) -> Result<Touch, StoreError> {
        self.append_inner(touch, true)
    }

    fn append_inner(&mut self, mut touch: Touch, persist: bool) -> Result<Touch, StoreError> {
        let artifact = self
            .artifacts
            .get(&touch.artifact)
            .ok_or(StoreError::UnknownArtifact(touch.artifact))?;

        if !artifact.kind.owns_state(&touch.state) {
            return Err(StoreError::FsmMismatch {
                state: touch.state.to_string(),
                fsm: artifact.kind.fsm_name(),
            });
        }

        match self.touches.get(&touch.artifact).and_then(|ts| ts.last()) {
            None => {
                let expected = artifact.kind.entry_state();
                if touch.state != expected {
                    return Err(StoreError::BadEntryState {
                        expected: expected.to_string(),
                        got: touch.state.to_string(),
                    });
                }
            }
            Some(last) => {
                if !last.state.may_advance_to(&touch.state) {
                    return Err(StoreError::IllegalTransition {
                        from: last.state.to_string(),
                        to: touch.state.to_string(),
                    });
                }
                if touch.at <= last.at {
                    touch.at = last.at + Duration::milliseconds(1);
                }
            }
        }

        let mut kept = Vec::with_capacity(touch.resources.len());
        for resource in touch.resources.drain(..) {
            if let Resource::NatRouting { ip_ext, provider, .. } = &resource {
                match self.nat_index.get(&(provider.clone(), ip_ext.clone())) {
                    Some(owner) if *owner == touch.artifact => {
                        tracing::debug!(%ip_ext, %provider, "routing already recorded");
                        continue;
                    }
                    Some(_) => {
                        return Err(StoreError::NatConflict {
                            ip_ext: ip_ext.clone(),
                            provider: provider.clone(),
                        });
                    }
                    None => {}
                }
            }
            kept.push(resource);
        }
        touch.resources = kept;

        if persist {
            self.persist(&LogRecord::Touch(touch.clone()))?;
        }

        for resource in &touch.resources {
            match resource {
                Resource::NatRouting { ip_ext, provider, .. } => {
                    self.nat_index
                        .insert((provider.clone(), ip_ext.clone()), touch.artifact);
                }
                Resource::ProviderToken { key, value, provider } => {
                    self.tokens.push(TokenEntry {
                        at: touch.at,
                        actor: touch.actor.clone(),
                        provider: provider.clone(),
                        key: key.clone(),
                        value: value.clone(),
                    });
                }
                _ => {}
            }
        }
        self.touches.entry(touch.artifact).or_default().push(touch.clone());
        Ok(touch)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn organisation(&self, name: &str) -> Option<&Organisation> {
        self.organisations.get(name)
    }

    pub fn user(&self, handle: &str) -> Option<&User> {
        self.users.get(handle)
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderRecord> {
        self.providers.get(name)
    }

    pub fn artifact(&self, uuid: Uuid) -> Option<&Artifact> {
        self.artifacts.get(&uuid)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// Touches of an artifact in time order; empty for unknown artifacts.
    pub fn touches(&self, uuid: Uuid) -> &[Touch] {
        self.touches.get(&uuid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The state the artifact's last Touch recorded.
    pub fn latest_state(&self, uuid: Uuid) -> Option<State> {
        self.touches(uuid).last().map(|t| t.state)
    }

    /// Artifacts whose latest Touch is in `state`, in insertion order.
    pub fn artifacts_in_state(&self, state: State) -> Vec<&Artifact> {
        self.artifacts
            .values()
            .filter(|a| self.latest_state(a.uuid) == Some(state))
            .collect()
    }

    /// Resources of an artifact in time order, each with its Touch.
    pub fn resources(&self, uuid: Uuid) -> impl Iterator<Item = (&Touch, &Resource)> {
        self.touches(uuid)
            .iter()
            .flat_map(|t| t.resources.iter().map(move |r| (t, r)))
    }

    /// Every (internal, external) pair routed under the provider.
    pub fn nat_routings(&self, provider: &str) -> Vec<(&str, &str)> {
        let mut routings = Vec::new();
        for touches in self.touches.values() {
            for touch in touches {
                for resource in &touch.resources {
                    if let Resource::NatRouting { ip_int, ip_ext, provider: p } = resource {
                        if p == provider {
                            routings.push((ip_int.as_str(), ip_ext.as_str()));
                        }
                    }
                }
            }
        }
        routings
    }

    /// The most recent credential for (provider, actor), if any.
    pub fn latest_token(&self, provider: &str, actor: &str) -> Option<AccessToken> {
        self.tokens
            .iter()
            .filter(|t| t.provider == provider && t.actor == actor)
            .max_by_key(|t| t.at)
            .map(|t| AccessToken {
                provider: t.provider.clone(),
                key: t.key.clone(),
                value: t.value.clone(),
            })
    }

    /// Actor of the artifact's first Touch: the original requester.
    pub fn first_actor(&self, uuid: Uuid) -> Option<&str> {
        self.touches(uuid).first().map(|t| t.actor.as_str())
    }

    /// The organisation's subscription artifact, if one exists.
    pub fn subscription_of(&self, organisation: &str) -> Option<&Artifact> {
        self.artifacts.values().find(|a| {
            a.organisation == organisation
                && matches!(a.kind, ArtifactKind::Subscription { .. })
        })
    }

    /// Provider name the organisation is subscribed to.
    pub fn org_provider(&self, organisation: &str) -> Option<&str> {
        self.subscription_of(organisation).and_then(|a| match &a.kind {
            ArtifactKind::Subscription { provider } => Some(provider.as_str()),
            _ => None,
        })
    }

    /// Public addresses granted by the organisation's subscription.
    pub fn subscription_ips(&self, organisation: &str) -> Vec<String> {
        let Some(sub) = self.subscription_of(organisation) else {
            return Vec::new();
        };
        self.resources(sub.uuid)
            .filter_map(|(_, r)| match r {
                Resource::IpAddress { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Token for a job on this artifact, per the currency rule: the most
    /// recent token whose actor is the artifact's original requester and
    /// whose provider is the organisation's subscribed provider.
    pub fn token_for(&self, uuid: Uuid) -> Option<AccessToken> {
        let artifact = self.artifacts.get(&uuid)?;
        let actor = self.first_actor(uuid)?;
        let provider = self.org_provider(&artifact.organisation)?;
        self.latest_token(provider, actor)
    }

    /// Eager copy of the artifact and its audit trail for a Job.
    pub fn snapshot(&self, uuid: Uuid) -> Option<ArtifactSnapshot> {
        let artifact = self.artifacts.get(&uuid)?;
        Some(ArtifactSnapshot {
            uuid,
            organisation: artifact.organisation.clone(),
            kind: artifact.kind.clone(),
            touches: self.touches.get(&uuid).cloned().unwrap_or_default(),
            subscription: None,
        })
    }

    /// Snapshot plus the public-IP accounting view, for agents that
    /// allocate from the pool.
    pub fn snapshot_with_pool(&self, uuid: Uuid) -> Option<ArtifactSnapshot> {
        let mut snapshot = self.snapshot(uuid)?;
        if let Some(provider) = self.org_provider(&snapshot.organisation) {
            let taken = self
                .nat_routings(provider)
                .into_iter()
                .map(|(_, ext)| ext.to_string())
                .collect();
            snapshot.subscription = Some(SubscriptionView {
                provider: provider.to_string(),
                pool: self.subscription_ips(&snapshot.organisation),
                taken,
            });
        }
        Some(snapshot)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
