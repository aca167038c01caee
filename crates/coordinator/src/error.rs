// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator error types

use dl_core::key::KeyError;
use thiserror::Error;

/// Errors surfaced by coordinator operations
///
/// Broker failures never appear here: acquisition treats them as "lock
/// unavailable" and release paths log and swallow them, so a flaky
/// broker degrades to denied locks rather than new failure modes.
#[derive(Debug, Error)]
pub enum LockError {
    /// The key template could not be resolved
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The lock was not acquired within the wait window
    ///
    /// Carries the caller-facing message configured on the spec.
    #[error("{message}")]
    Acquisition { message: String },
}
