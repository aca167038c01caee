// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced broker wrapper for consistent observability

use crate::traits::{BrokerError, LockBroker, LockMode};
use async_trait::async_trait;
use dl_core::token::OwnerToken;
use std::time::Duration;

/// Wrapper that adds tracing to any LockBroker
#[derive(Clone)]
pub struct TracedBroker<B> {
    inner: B,
}

impl<B> TracedBroker<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: LockBroker> LockBroker for TracedBroker<B> {
    async fn acquire(
        &self,
        key: &str,
        mode: LockMode,
        owner: OwnerToken,
        wait: Duration,
        lease: Duration,
    ) -> Result<bool, BrokerError> {
        let span = tracing::info_span!("broker.acquire", key, mode = %mode, owner = %owner);
        let _guard = span.enter();

        tracing::debug!(wait_ms = wait.as_millis() as u64, lease_ms = lease.as_millis() as u64, "acquiring");

        let start = std::time::Instant::now();
        let result = self.inner.acquire(key, mode, owner, wait, lease).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(true) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "acquired"),
            Ok(false) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "wait exhausted"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "acquire failed"
            ),
        }

        result
    }

    async fn release(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
    ) -> Result<bool, BrokerError> {
        let span = tracing::info_span!("broker.release", key, mode = %mode, owner = %owner);
        let _guard = span.enter();

        let result = self.inner.release(key, mode, owner).await;
        match &result {
            Ok(true) => tracing::debug!("released"),
            Ok(false) => tracing::debug!("not held by owner, nothing released"),
            Err(e) => tracing::error!(error = %e, "release failed"),
        }

        result
    }

    async fn renew(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
        lease: Duration,
    ) -> Result<bool, BrokerError> {
        let result = self.inner.renew(key, mode, owner, lease).await;
        match &result {
            Ok(true) => tracing::debug!(key, owner = %owner, "lease renewed"),
            // A lost lease is the watchdog's signal to stop, not an error
            Ok(false) => tracing::warn!(key, owner = %owner, "lease lost, renewal declined"),
            Err(e) => tracing::error!(key, error = %e, "renew failed"),
        }
        result
    }

    async fn is_locked(&self, key: &str) -> Result<bool, BrokerError> {
        let result = self.inner.is_locked(key).await;
        tracing::trace!(key, locked = ?result.as_ref().ok(), "checked");
        result
    }

    async fn is_held_by(&self, key: &str, owner: &OwnerToken) -> Result<bool, BrokerError> {
        let result = self.inner.is_held_by(key, owner).await;
        tracing::trace!(key, owner = %owner, held = ?result.as_ref().ok(), "checked");
        result
    }

    async fn force_clear(&self, key: &str) -> Result<bool, BrokerError> {
        let span = tracing::info_span!("broker.force_clear", key);
        let _guard = span.enter();

        let result = self.inner.force_clear(key).await;
        match &result {
            Ok(cleared) => tracing::warn!(cleared, "force cleared"),
            Err(e) => tracing::error!(error = %e, "force clear failed"),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
