// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic events emitted by lock state transitions
//!
//! Events are observability-only: brokers forward them to logging and
//! tests assert on them, but they never affect control flow.

use serde::{Deserialize, Serialize};

/// Events emitted by the lock state machines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockEvent {
    // Exclusive lock events
    Acquired {
        key: String,
        owner: String,
    },
    Denied {
        key: String,
        owner: String,
        current_owner: String,
    },
    Released {
        key: String,
        owner: String,
    },
    /// A lapsed lease was taken over by a new owner
    Reclaimed {
        key: String,
        previous_owner: String,
        new_owner: String,
    },
    Renewed {
        key: String,
        owner: String,
    },
    ForceCleared {
        key: String,
        previous_owner: String,
    },

    // Read-write lock events
    ReadAcquired {
        key: String,
        owner: String,
    },
    ReadDenied {
        key: String,
        owner: String,
    },
    ReadReleased {
        key: String,
        owner: String,
    },
    WriteAcquired {
        key: String,
        owner: String,
    },
    WriteDenied {
        key: String,
        owner: String,
    },
    WriteReleased {
        key: String,
        owner: String,
    },
}

impl LockEvent {
    /// The resolved key this event concerns
    pub fn key(&self) -> &str {
        match self {
            LockEvent::Acquired { key, .. }
            | LockEvent::Denied { key, .. }
            | LockEvent::Released { key, .. }
            | LockEvent::Reclaimed { key, .. }
            | LockEvent::Renewed { key, .. }
            | LockEvent::ForceCleared { key, .. }
            | LockEvent::ReadAcquired { key, .. }
            | LockEvent::ReadDenied { key, .. }
            | LockEvent::ReadReleased { key, .. }
            | LockEvent::WriteAcquired { key, .. }
            | LockEvent::WriteDenied { key, .. }
            | LockEvent::WriteReleased { key, .. } => key,
        }
    }
}
