// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background lease renewal

use crate::coordinator::LockHandle;
use dl_broker::LockBroker;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Keeps one acquisition's lease alive while its holder works
///
/// Renews at a third of the lease interval and stops on its own once
/// the lease is lost or the broker rejects the renewal. Dropping the
/// renewer aborts the task, so renewal never outlives the guarded
/// section it was spawned for.
pub struct LeaseRenewer {
    task: JoinHandle<()>,
}

impl LeaseRenewer {
    pub fn spawn<B: LockBroker>(broker: B, handle: LockHandle, lease: Duration) -> Self {
        let interval = (lease / 3).max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                match broker
                    .renew(handle.key(), handle.mode(), handle.owner(), lease)
                    .await
                {
                    Ok(true) => {
                        tracing::trace!(key = handle.key(), "lease renewed");
                    }
                    Ok(false) => {
                        tracing::warn!(key = handle.key(), "lease no longer held, stopping renewal");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(key = handle.key(), error = %e, "renewal failed, stopping");
                        break;
                    }
                }
            }
        });
        Self { task }
    }
}

impl Drop for LeaseRenewer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "renew_tests.rs"]
mod tests;
