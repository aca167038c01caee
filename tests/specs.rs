//! Behavioral specifications for the distributed-lock workspace.
//!
//! These tests drive the public API end to end: a coordinator over the
//! in-process broker, exercised the way application code would use it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/fairness.rs"]
mod fairness;
#[path = "specs/lease.rs"]
mod lease;
#[path = "specs/mutual_exclusion.rs"]
mod mutual_exclusion;
#[path = "specs/scenario.rs"]
mod scenario;
