// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-operation lock specification
//!
//! A `LockSpec` is the declarative surface consumed by business code:
//! one immutable description of how a guarded operation takes its lock.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Failure message handed to callers when no message is configured
pub const DEFAULT_FAIL_MESSAGE: &str = "lock busy, try again shortly";

const DEFAULT_WAIT: Duration = Duration::from_secs(3);
const DEFAULT_LEASE: Duration = Duration::from_secs(10);

/// Declares how one guarded operation runs under a named lock
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LockSpec {
    /// Key template; literal or containing `#{...}` spans
    pub key: String,
    /// How long an acquisition may block before giving up
    #[serde(with = "humantime_serde", default = "default_wait")]
    pub wait_time: Duration,
    /// How long a granted lease stays valid without renewal
    #[serde(with = "humantime_serde", default = "default_lease")]
    pub lease_time: Duration,
    /// FIFO ordering among waiters vs. no ordering guarantee
    #[serde(default)]
    pub fair: bool,
    /// Whether the lease is periodically extended while the owner runs
    #[serde(default = "default_auto_renew")]
    pub auto_renew: bool,
    /// User-facing message on acquisition failure
    #[serde(default = "default_fail_message")]
    pub fail_message: String,
}

fn default_wait() -> Duration {
    DEFAULT_WAIT
}

fn default_lease() -> Duration {
    DEFAULT_LEASE
}

fn default_auto_renew() -> bool {
    true
}

fn default_fail_message() -> String {
    DEFAULT_FAIL_MESSAGE.to_string()
}

impl LockSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            wait_time: DEFAULT_WAIT,
            lease_time: DEFAULT_LEASE,
            fair: false,
            auto_renew: true,
            fail_message: DEFAULT_FAIL_MESSAGE.to_string(),
        }
    }

    pub fn with_wait_time(mut self, wait: Duration) -> Self {
        self.wait_time = wait;
        self
    }

    pub fn with_lease_time(mut self, lease: Duration) -> Self {
        self.lease_time = lease;
        self
    }

    pub fn with_fair(mut self, fair: bool) -> Self {
        self.fair = fair;
        self
    }

    pub fn with_auto_renew(mut self, auto_renew: bool) -> Self {
        self.auto_renew = auto_renew;
        self
    }

    pub fn with_fail_message(mut self, message: impl Into<String>) -> Self {
        self.fail_message = message.into();
        self
    }
}
