// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-write lock pair

use crate::coordinator::{LockCoordinator, LockHandle};
use dl_broker::{LockBroker, LockMode};
use std::time::Duration;

/// The shared/exclusive pair over one key
///
/// Readers share the key with each other and exclude writers; a writer
/// excludes everyone. Obtained from
/// [`LockCoordinator::read_write`](crate::LockCoordinator::read_write);
/// constructing the pair has no broker side effect.
pub struct ReadWriteLock<B> {
    coordinator: LockCoordinator<B>,
    key: String,
}

impl<B: LockBroker> ReadWriteLock<B> {
    pub(crate) fn new(coordinator: LockCoordinator<B>, key: &str) -> Self {
        Self {
            coordinator,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The shared side
    pub fn read(&self) -> SideLock<B> {
        self.side(LockMode::Read)
    }

    /// The exclusive side
    pub fn write(&self) -> SideLock<B> {
        self.side(LockMode::Write)
    }

    fn side(&self, mode: LockMode) -> SideLock<B> {
        SideLock {
            coordinator: self.coordinator.clone(),
            key: self.key.clone(),
            mode,
        }
    }
}

/// One side of a read-write pair
pub struct SideLock<B> {
    coordinator: LockCoordinator<B>,
    key: String,
    mode: LockMode,
}

impl<B: LockBroker> SideLock<B> {
    /// Try to take this side of the lock, waiting up to `wait`
    pub async fn try_lock(&self, wait: Duration, lease: Duration) -> Option<LockHandle> {
        self.coordinator
            .try_lock_mode(&self.key, self.mode, wait, lease)
            .await
    }

    /// Release a previously acquired side
    pub async fn unlock(&self, handle: &LockHandle) -> bool {
        self.coordinator.unlock(handle).await
    }
}

#[cfg(test)]
#[path = "read_write_tests.rs"]
mod tests;
