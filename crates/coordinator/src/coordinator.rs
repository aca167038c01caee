// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lock coordinator and the handles it hands out

use crate::config::CoordinatorConfig;
use crate::error::LockError;
use crate::read_write::ReadWriteLock;
use dl_broker::{LockBroker, LockMode};
use dl_core::spec::DEFAULT_FAIL_MESSAGE;
use dl_core::token::OwnerToken;
use std::future::Future;
use std::time::Duration;

/// Proof of one successful acquisition
///
/// Holds the namespaced key and the owner token minted for the
/// acquisition; release and renewal only act when this token still
/// matches the broker's recorded holder.
#[derive(Clone, Debug)]
pub struct LockHandle {
    key: String,
    mode: LockMode,
    owner: OwnerToken,
}

impl LockHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn owner(&self) -> &OwnerToken {
        &self.owner
    }
}

/// Drives the acquire/release protocol against an injected broker
#[derive(Clone)]
pub struct LockCoordinator<B> {
    pub(crate) broker: B,
    pub(crate) config: CoordinatorConfig,
}

impl<B: LockBroker> LockCoordinator<B> {
    pub fn new(broker: B) -> Self {
        Self::with_config(broker, CoordinatorConfig::default())
    }

    pub fn with_config(broker: B, config: CoordinatorConfig) -> Self {
        Self { broker, config }
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    /// Try to take the exclusive lock on `key`, waiting up to `wait`
    ///
    /// `None` means the lock was not acquired, whether because another
    /// holder kept it for the whole wait window or because the broker
    /// was unreachable. Acquisition fails closed: a broker error never
    /// lets the caller proceed as if it held the lock.
    pub async fn try_lock(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
        fair: bool,
    ) -> Option<LockHandle> {
        self.try_lock_mode(key, LockMode::Exclusive { fair }, wait, lease)
            .await
    }

    pub(crate) async fn try_lock_mode(
        &self,
        key: &str,
        mode: LockMode,
        wait: Duration,
        lease: Duration,
    ) -> Option<LockHandle> {
        let key = self.config.namespace(key);
        let owner = OwnerToken::mint();
        match self
            .broker
            .acquire(&key, mode, owner.clone(), wait, lease)
            .await
        {
            Ok(true) => Some(LockHandle { key, mode, owner }),
            Ok(false) => None,
            Err(e) => {
                tracing::error!(key, error = %e, "acquire failed, treating lock as unavailable");
                None
            }
        }
    }

    /// Like [`try_lock`](Self::try_lock), but a miss becomes an
    /// [`LockError::Acquisition`] carrying `fail_message`
    pub async fn try_lock_or_fail(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
        fair: bool,
        fail_message: &str,
    ) -> Result<LockHandle, LockError> {
        self.try_lock(key, wait, lease, fair)
            .await
            .ok_or_else(|| LockError::Acquisition {
                message: fail_message.to_string(),
            })
    }

    /// Release the acquisition behind `handle`
    ///
    /// `false` when nothing was released: the lease already lapsed and
    /// someone else took the key, or the broker could not be reached.
    /// Release failures are logged and swallowed, never propagated;
    /// the lease lapsing is the backstop.
    pub async fn unlock(&self, handle: &LockHandle) -> bool {
        match self
            .broker
            .release(handle.key(), handle.mode(), handle.owner())
            .await
        {
            Ok(released) => {
                if !released {
                    tracing::debug!(key = handle.key(), "nothing to release, lease already gone");
                }
                released
            }
            Err(e) => {
                tracing::error!(key = handle.key(), error = %e, "release failed, lease will lapse");
                false
            }
        }
    }

    /// Run `body` under the exclusive lock on `key`
    ///
    /// Acquisition uses the default fail message; the lease is renewed
    /// while `body` runs and released on every exit path.
    pub async fn execute_with_lock<T, F, Fut>(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
        fair: bool,
        body: F,
    ) -> Result<T, LockError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let spec = dl_core::spec::LockSpec::new(key)
            .with_wait_time(wait)
            .with_lease_time(lease)
            .with_fair(fair)
            .with_fail_message(DEFAULT_FAIL_MESSAGE);
        self.guard(&spec, &dl_core::key::Bindings::new(), body).await
    }

    /// Whether any holder currently holds `key`
    ///
    /// An unreachable broker reads as unlocked; callers must not use
    /// this as an acquisition check.
    pub async fn is_locked(&self, key: &str) -> bool {
        let key = self.config.namespace(key);
        match self.broker.is_locked(&key).await {
            Ok(locked) => locked,
            Err(e) => {
                tracing::warn!(key, error = %e, "lock status check failed");
                false
            }
        }
    }

    /// Whether the acquisition behind `handle` still holds its key
    pub async fn is_held(&self, handle: &LockHandle) -> bool {
        match self.broker.is_held_by(handle.key(), handle.owner()).await {
            Ok(held) => held,
            Err(e) => {
                tracing::warn!(key = handle.key(), error = %e, "hold check failed");
                false
            }
        }
    }

    /// Clear `key` regardless of who holds it
    ///
    /// Recovery tooling only; this can cut a live holder's critical
    /// section short.
    pub async fn force_unlock(&self, key: &str) -> bool {
        let key = self.config.namespace(key);
        match self.broker.force_clear(&key).await {
            Ok(cleared) => cleared,
            Err(e) => {
                tracing::error!(key, error = %e, "force unlock failed");
                false
            }
        }
    }

    /// The read-write lock pair for `key`
    pub fn read_write(&self, key: &str) -> ReadWriteLock<B> {
        ReadWriteLock::new(self.clone(), key)
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
