// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ownership tokens for lock acquisitions
//!
//! Every successful acquisition mints a fresh token; release requires
//! presenting it. This replaces "is the current thread the holder" with
//! an explicit capability that works across tasks and processes.

use uuid::Uuid;

/// Opaque, unique identifier for one lock acquisition
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OwnerToken(Uuid);

impl OwnerToken {
    /// Mint a fresh token
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
