// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker trait definition
//!
//! The broker is the only holder of shared lock state; everything above
//! it orchestrates the protocol (acquire-before-use, always release,
//! no silent ownership transfer). Brokers are constructed explicitly
//! and injected, never reached through a process-wide singleton.

use async_trait::async_trait;
use dl_core::token::OwnerToken;
use std::time::Duration;
use thiserror::Error;

/// Which side of a keyed lock an operation targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockMode {
    /// Plain mutual exclusion; `fair` waiters are served in FIFO order,
    /// non-fair waiters race (and may starve)
    Exclusive { fair: bool },
    /// Shared side of the read-write pair
    Read,
    /// Exclusive side of the read-write pair
    Write,
}

impl std::fmt::Display for LockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockMode::Exclusive { fair: true } => write!(f, "exclusive(fair)"),
            LockMode::Exclusive { fair: false } => write!(f, "exclusive"),
            LockMode::Read => write!(f, "read"),
            LockMode::Write => write!(f, "write"),
        }
    }
}

/// Errors from broker operations
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unreachable: {0}")]
    Unreachable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A client for an external distributed-lock broker
///
/// The `key` arguments are fully resolved, namespaced keys. Waiting is
/// bounded: `acquire` returns `Ok(false)` once `wait` lapses rather
/// than hanging. Dropping a pending `acquire` future aborts the
/// attempt without holding anything.
#[async_trait]
pub trait LockBroker: Clone + Send + Sync + 'static {
    /// Block up to `wait` for the lock; `true` iff acquired under `lease`
    async fn acquire(
        &self,
        key: &str,
        mode: LockMode,
        owner: OwnerToken,
        wait: Duration,
        lease: Duration,
    ) -> Result<bool, BrokerError>;

    /// Release if `owner` is the recorded holder; `true` iff released.
    /// A foreign owner is a no-op, never an error.
    async fn release(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
    ) -> Result<bool, BrokerError>;

    /// Extend the lease of a live holder; `false` once the lease is gone
    async fn renew(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
        lease: Duration,
    ) -> Result<bool, BrokerError>;

    /// Whether any holder currently holds the key (either side)
    async fn is_locked(&self, key: &str) -> Result<bool, BrokerError>;

    /// Whether this specific acquisition holds the key
    async fn is_held_by(&self, key: &str, owner: &OwnerToken) -> Result<bool, BrokerError>;

    /// Unconditionally clear all lock state for the key
    ///
    /// Unsafe escape hatch: this can break another holder's critical
    /// section. For recovery tooling only, never business-path code.
    async fn force_clear(&self, key: &str) -> Result<bool, BrokerError>;
}
