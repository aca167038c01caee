// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive lock state machine with lease-based expiry
//!
//! A held lock stays valid until its lease lapses; an owner that crashes
//! without releasing self-heals to free once the lease runs out.

use crate::clock::Clock;
use crate::event::LockEvent;
use crate::token::OwnerToken;
use std::time::{Duration, Instant};

/// Exclusive lock state
#[derive(Clone, Debug)]
pub enum MutexState {
    /// Lock is available
    Free,
    /// Lock is held under a lease
    Held {
        owner: OwnerToken,
        lease_expiry: Instant,
    },
}

/// An exclusive lock keyed by one resolved name
#[derive(Clone, Debug)]
pub struct Mutex {
    pub key: String,
    pub state: MutexState,
}

/// Events that can trigger lock transitions
#[derive(Clone, Debug)]
pub enum MutexInput {
    /// Attempt to acquire the lock under a lease
    Acquire { owner: OwnerToken, lease: Duration },
    /// Release the lock; foreign owners are a silent no-op
    Release { owner: OwnerToken },
    /// Extend the lease while the owner is still alive
    Renew { owner: OwnerToken, lease: Duration },
    /// Unconditionally clear the lock, irrespective of owner
    ForceClear,
}

impl Mutex {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: MutexState::Free,
        }
    }

    /// Check if the lock is currently free
    pub fn is_free(&self) -> bool {
        matches!(self.state, MutexState::Free)
    }

    /// Get the current owner, if any
    pub fn owner(&self) -> Option<&OwnerToken> {
        match &self.state {
            MutexState::Free => None,
            MutexState::Held { owner, .. } => Some(owner),
        }
    }

    /// Check if the lock is held by a specific owner
    pub fn is_held_by(&self, owner: &OwnerToken) -> bool {
        matches!(&self.state, MutexState::Held { owner: o, .. } if o == owner)
    }

    /// Check if the current lease has lapsed
    pub fn is_expired(&self, clock: &impl Clock) -> bool {
        match &self.state {
            MutexState::Free => false,
            MutexState::Held { lease_expiry, .. } => clock.now() >= *lease_expiry,
        }
    }

    /// Time left on the current lease, if held and not lapsed
    pub fn lease_remaining(&self, clock: &impl Clock) -> Option<Duration> {
        match &self.state {
            MutexState::Free => None,
            MutexState::Held { lease_expiry, .. } => {
                lease_expiry.checked_duration_since(clock.now())
            }
        }
    }

    /// Pure state transition function
    pub fn transition(&self, input: MutexInput, clock: &impl Clock) -> (Mutex, Vec<LockEvent>) {
        let mut next = self.clone();
        let mut events = Vec::new();

        match input {
            MutexInput::Acquire { owner, lease } => match &self.state {
                MutexState::Free => {
                    next.state = MutexState::Held {
                        owner: owner.clone(),
                        lease_expiry: clock.lease_deadline(lease),
                    };
                    events.push(LockEvent::Acquired {
                        key: self.key.clone(),
                        owner: owner.to_string(),
                    });
                }
                MutexState::Held { owner: current, .. } => {
                    if self.is_expired(clock) {
                        // Lease lapsed without a release; the key self-heals
                        let previous = current.clone();
                        next.state = MutexState::Held {
                            owner: owner.clone(),
                            lease_expiry: clock.lease_deadline(lease),
                        };
                        events.push(LockEvent::Reclaimed {
                            key: self.key.clone(),
                            previous_owner: previous.to_string(),
                            new_owner: owner.to_string(),
                        });
                        events.push(LockEvent::Acquired {
                            key: self.key.clone(),
                            owner: owner.to_string(),
                        });
                    } else {
                        events.push(LockEvent::Denied {
                            key: self.key.clone(),
                            owner: owner.to_string(),
                            current_owner: current.to_string(),
                        });
                    }
                }
            },

            MutexInput::Release { owner } => match &self.state {
                MutexState::Held { owner: current, .. } if current == &owner => {
                    next.state = MutexState::Free;
                    events.push(LockEvent::Released {
                        key: self.key.clone(),
                        owner: owner.to_string(),
                    });
                }
                _ => {
                    // Wrong owner or already free; never a transfer
                }
            },

            MutexInput::Renew { owner, lease } => match &self.state {
                MutexState::Held { owner: current, .. }
                    if current == &owner && !self.is_expired(clock) =>
                {
                    next.state = MutexState::Held {
                        owner: owner.clone(),
                        lease_expiry: clock.lease_deadline(lease),
                    };
                    events.push(LockEvent::Renewed {
                        key: self.key.clone(),
                        owner: owner.to_string(),
                    });
                }
                _ => {
                    // Not the live owner; renewal lapses silently
                }
            },

            MutexInput::ForceClear => {
                if let MutexState::Held { owner: current, .. } = &self.state {
                    events.push(LockEvent::ForceCleared {
                        key: self.key.clone(),
                        previous_owner: current.to_string(),
                    });
                    next.state = MutexState::Free;
                }
            }
        }

        (next, events)
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
