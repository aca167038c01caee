// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dl-coordinator: Keyed locking orchestrated over a broker
//!
//! The [`LockCoordinator`] owns the acquire/release protocol: it
//! namespaces keys, mints one owner token per acquisition, keeps
//! leases alive while work runs, and guarantees release on every exit
//! path of a guarded section. The broker it drives is injected, so the
//! same coordinator runs against the in-process broker in tests and a
//! networked one in production.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod guard;
pub mod read_write;
pub mod renew;

pub use config::CoordinatorConfig;
pub use coordinator::{LockCoordinator, LockHandle};
pub use error::LockError;
pub use read_write::{ReadWriteLock, SideLock};
pub use renew::LeaseRenewer;
