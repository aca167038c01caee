// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dl-broker: The broker boundary of the distributed-lock toolkit
//!
//! Defines the [`LockBroker`] trait every backend implements, an
//! in-process [`MemoryBroker`] built on the dl-core state machines, and
//! a tracing wrapper for observability.

pub mod memory;
pub mod traced;
pub mod traits;

pub use memory::MemoryBroker;
pub use traced::TracedBroker;
pub use traits::{BrokerError, LockBroker, LockMode};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FaultyBroker, UnreachableBroker};
