// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The guarded-section entry point
//!
//! [`LockCoordinator::guard`] is the one place that strings the whole
//! protocol together: resolve the key template, acquire with the
//! spec's timings, keep the lease renewed, run the body, and release
//! on every exit path. Callers wrap critical sections explicitly
//! instead of relying on interception.

use crate::coordinator::{LockCoordinator, LockHandle};
use crate::error::LockError;
use crate::renew::LeaseRenewer;
use dl_broker::{LockBroker, LockMode};
use dl_core::key::{resolve, Bindings};
use dl_core::spec::LockSpec;
use std::future::Future;

impl<B: LockBroker> LockCoordinator<B> {
    /// Run `body` under the lock described by `spec`
    ///
    /// The key template is resolved against `bindings` before
    /// acquisition. A denied acquisition returns
    /// [`LockError::Acquisition`] with the spec's fail message and the
    /// body never runs. Once the body has started, the lock is
    /// released whether it finishes, returns early, or the whole
    /// future is dropped; in the dropped case release is spawned as a
    /// detached best-effort task, with the lease lapsing as backstop.
    pub async fn guard<T, F, Fut>(
        &self,
        spec: &LockSpec,
        bindings: &Bindings,
        body: F,
    ) -> Result<T, LockError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let key = resolve(&spec.key, bindings)?;
        let mode = LockMode::Exclusive { fair: spec.fair };

        let handle = match self
            .try_lock_mode(&key, mode, spec.wait_time, spec.lease_time)
            .await
        {
            Some(handle) => handle,
            None => {
                return Err(LockError::Acquisition {
                    message: spec.fail_message.clone(),
                })
            }
        };

        let renewer = spec
            .auto_renew
            .then(|| LeaseRenewer::spawn(self.broker.clone(), handle.clone(), spec.lease_time));
        let release = ReleaseGuard::arm(self.broker.clone(), handle.clone());

        let out = body().await;

        release.disarm();
        drop(renewer);
        self.unlock(&handle).await;
        Ok(out)
    }
}

/// Releases the handle if the guarded future is dropped mid-body
struct ReleaseGuard<B: LockBroker> {
    broker: B,
    handle: Option<LockHandle>,
}

impl<B: LockBroker> ReleaseGuard<B> {
    fn arm(broker: B, handle: LockHandle) -> Self {
        Self {
            broker,
            handle: Some(handle),
        }
    }

    fn disarm(mut self) {
        self.handle = None;
    }
}

impl<B: LockBroker> Drop for ReleaseGuard<B> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let key = handle.key().to_string();
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                tracing::debug!(key, "guarded section dropped, releasing in background");
                let broker = self.broker.clone();
                rt.spawn(async move {
                    if let Err(e) = broker
                        .release(handle.key(), handle.mode(), handle.owner())
                        .await
                    {
                        tracing::error!(key = handle.key(), error = %e, "release on drop failed, lease will lapse");
                    }
                });
            }
            Err(_) => {
                tracing::error!(key, "guarded section dropped outside a runtime, lease will lapse");
            }
        }
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
