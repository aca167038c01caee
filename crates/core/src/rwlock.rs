// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-write lock state machine
//!
//! Any number of live readers may share the key; the writer is exclusive
//! against both readers and other writers. Holders carry the same
//! lease-expiry discipline as the exclusive lock: lapsed holders are
//! purged on every transition.

use crate::clock::Clock;
use crate::event::LockEvent;
use crate::token::OwnerToken;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A read-write lock keyed by one resolved name
#[derive(Clone, Debug)]
pub struct RwLock {
    pub key: String,
    /// Live readers and their lease expiries
    readers: HashMap<OwnerToken, Instant>,
    /// The exclusive writer, if any
    writer: Option<(OwnerToken, Instant)>,
}

/// Events that can trigger read-write transitions
#[derive(Clone, Debug)]
pub enum RwLockInput {
    AcquireRead { owner: OwnerToken, lease: Duration },
    AcquireWrite { owner: OwnerToken, lease: Duration },
    ReleaseRead { owner: OwnerToken },
    ReleaseWrite { owner: OwnerToken },
    /// Extend the lease of a live reader or writer
    Renew { owner: OwnerToken, lease: Duration },
    /// Unconditionally clear all holders
    ForceClear,
}

impl RwLock {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            readers: HashMap::new(),
            writer: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.readers.is_empty() && self.writer.is_none()
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }

    pub fn writer(&self) -> Option<&OwnerToken> {
        self.writer.as_ref().map(|(owner, _)| owner)
    }

    pub fn is_read_held_by(&self, owner: &OwnerToken) -> bool {
        self.readers.contains_key(owner)
    }

    pub fn is_write_held_by(&self, owner: &OwnerToken) -> bool {
        matches!(&self.writer, Some((o, _)) if o == owner)
    }

    /// Earliest moment any current holder's lease lapses
    pub fn next_expiry(&self) -> Option<Instant> {
        self.readers
            .values()
            .copied()
            .chain(self.writer.as_ref().map(|(_, expiry)| *expiry))
            .min()
    }

    /// Copy of this lock with lapsed holders dropped
    pub fn purged(&self, clock: &impl Clock) -> RwLock {
        let now = clock.now();
        let mut next = self.clone();
        next.readers.retain(|_, expiry| *expiry > now);
        if matches!(&next.writer, Some((_, expiry)) if *expiry <= now) {
            next.writer = None;
        }
        next
    }

    /// Pure state transition function
    pub fn transition(&self, input: RwLockInput, clock: &impl Clock) -> (RwLock, Vec<LockEvent>) {
        let mut next = self.purged(clock);
        let mut events = Vec::new();

        match input {
            RwLockInput::AcquireRead { owner, lease } => {
                if next.writer.is_none() {
                    next.readers
                        .insert(owner.clone(), clock.lease_deadline(lease));
                    events.push(LockEvent::ReadAcquired {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                } else {
                    events.push(LockEvent::ReadDenied {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                }
            }

            RwLockInput::AcquireWrite { owner, lease } => {
                if next.is_free() {
                    next.writer = Some((owner.clone(), clock.lease_deadline(lease)));
                    events.push(LockEvent::WriteAcquired {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                } else {
                    events.push(LockEvent::WriteDenied {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                }
            }

            RwLockInput::ReleaseRead { owner } => {
                if next.readers.remove(&owner).is_some() {
                    events.push(LockEvent::ReadReleased {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                }
            }

            RwLockInput::ReleaseWrite { owner } => {
                if next.is_write_held_by(&owner) {
                    next.writer = None;
                    events.push(LockEvent::WriteReleased {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                }
            }

            RwLockInput::Renew { owner, lease } => {
                let deadline = clock.lease_deadline(lease);
                if let Some(expiry) = next.readers.get_mut(&owner) {
                    *expiry = deadline;
                    events.push(LockEvent::Renewed {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                } else if next.is_write_held_by(&owner) {
                    next.writer = Some((owner.clone(), deadline));
                    events.push(LockEvent::Renewed {
                        key: next.key.clone(),
                        owner: owner.to_string(),
                    });
                }
            }

            RwLockInput::ForceClear => {
                for owner in next.readers.keys().chain(next.writer().into_iter()) {
                    events.push(LockEvent::ForceCleared {
                        key: next.key.clone(),
                        previous_owner: owner.to_string(),
                    });
                }
                next.readers.clear();
                next.writer = None;
            }
        }

        (next, events)
    }
}

#[cfg(test)]
#[path = "rwlock_tests.rs"]
mod tests;
