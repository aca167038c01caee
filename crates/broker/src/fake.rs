// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault-injecting brokers for exercising failure paths in tests

use crate::traits::{BrokerError, LockBroker, LockMode};
use async_trait::async_trait;
use dl_core::token::OwnerToken;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A broker whose every call fails with [`BrokerError::Unreachable`]
#[derive(Clone, Default)]
pub struct UnreachableBroker;

impl UnreachableBroker {
    fn down<T>() -> Result<T, BrokerError> {
        Err(BrokerError::Unreachable("broker offline".to_string()))
    }
}

#[async_trait]
impl LockBroker for UnreachableBroker {
    async fn acquire(
        &self,
        _key: &str,
        _mode: LockMode,
        _owner: OwnerToken,
        _wait: Duration,
        _lease: Duration,
    ) -> Result<bool, BrokerError> {
        Self::down()
    }

    async fn release(
        &self,
        _key: &str,
        _mode: LockMode,
        _owner: &OwnerToken,
    ) -> Result<bool, BrokerError> {
        Self::down()
    }

    async fn renew(
        &self,
        _key: &str,
        _mode: LockMode,
        _owner: &OwnerToken,
        _lease: Duration,
    ) -> Result<bool, BrokerError> {
        Self::down()
    }

    async fn is_locked(&self, _key: &str) -> Result<bool, BrokerError> {
        Self::down()
    }

    async fn is_held_by(&self, _key: &str, _owner: &OwnerToken) -> Result<bool, BrokerError> {
        Self::down()
    }

    async fn force_clear(&self, _key: &str) -> Result<bool, BrokerError> {
        Self::down()
    }
}

/// Wraps a working broker with switchable per-operation faults
///
/// Cloning shares the fault switches, so a test can hold one handle
/// and flip faults on the copy it handed out.
#[derive(Clone)]
pub struct FaultyBroker<B> {
    inner: B,
    fail_acquire: Arc<AtomicBool>,
    fail_release: Arc<AtomicBool>,
    fail_renew: Arc<AtomicBool>,
}

impl<B> FaultyBroker<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            fail_acquire: Arc::new(AtomicBool::new(false)),
            fail_release: Arc::new(AtomicBool::new(false)),
            fail_renew: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_acquire(&self, on: bool) {
        self.fail_acquire.store(on, Ordering::SeqCst);
    }

    pub fn fail_release(&self, on: bool) {
        self.fail_release.store(on, Ordering::SeqCst);
    }

    pub fn fail_renew(&self, on: bool) {
        self.fail_renew.store(on, Ordering::SeqCst);
    }

    fn tripped(switch: &AtomicBool, op: &str) -> Result<(), BrokerError> {
        if switch.load(Ordering::SeqCst) {
            Err(BrokerError::Unreachable(format!("injected {op} fault")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<B: LockBroker> LockBroker for FaultyBroker<B> {
    async fn acquire(
        &self,
        key: &str,
        mode: LockMode,
        owner: OwnerToken,
        wait: Duration,
        lease: Duration,
    ) -> Result<bool, BrokerError> {
        Self::tripped(&self.fail_acquire, "acquire")?;
        self.inner.acquire(key, mode, owner, wait, lease).await
    }

    async fn release(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
    ) -> Result<bool, BrokerError> {
        Self::tripped(&self.fail_release, "release")?;
        self.inner.release(key, mode, owner).await
    }

    async fn renew(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
        lease: Duration,
    ) -> Result<bool, BrokerError> {
        Self::tripped(&self.fail_renew, "renew")?;
        self.inner.renew(key, mode, owner, lease).await
    }

    async fn is_locked(&self, key: &str) -> Result<bool, BrokerError> {
        self.inner.is_locked(key).await
    }

    async fn is_held_by(&self, key: &str, owner: &OwnerToken) -> Result<bool, BrokerError> {
        self.inner.is_held_by(key, owner).await
    }

    async fn force_clear(&self, key: &str) -> Result<bool, BrokerError> {
        self.inner.force_clear(key).await
    }
}
