// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dl-core: Pure domain logic for the distributed-lock toolkit
//!
//! This crate provides:
//! - Lock key templates and their restricted substitution language
//! - Per-invocation lock specifications
//! - Pure state machines for exclusive and read-write locks with
//!   lease-based expiry
//! - Ownership tokens that replace ambient thread identity

pub mod clock;
pub mod event;
pub mod key;
pub mod mutex;
pub mod rwlock;
pub mod spec;
pub mod token;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use event::LockEvent;
pub use key::{namespaced, resolve, Bindings, KeyError, KEY_PREFIX};
pub use mutex::{Mutex, MutexInput, MutexState};
pub use rwlock::{RwLock, RwLockInput};
pub use spec::LockSpec;
pub use token::OwnerToken;
