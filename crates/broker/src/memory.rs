// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process broker backed by the dl-core state machines
//!
//! Every key maps to a cell holding the exclusive and read-write state
//! machines behind a mutex, plus a notifier that wakes blocked
//! acquirers on release. Fairness is a waiting policy: fair acquirers
//! join a per-key FIFO ticket queue and only the front ticket may take
//! the lock; non-fair acquirers race the queue. Dropping a pending
//! acquire future removes its ticket, so cancellation never wedges the
//! queue.

use crate::traits::{BrokerError, LockBroker, LockMode};
use async_trait::async_trait;
use dl_core::clock::{Clock, SystemClock};
use dl_core::event::LockEvent;
use dl_core::mutex::{Mutex, MutexInput};
use dl_core::rwlock::{RwLock, RwLockInput};
use dl_core::token::OwnerToken;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Notify;

/// An in-process [`LockBroker`]
///
/// Suitable for tests and single-process deployments; the protocol it
/// exposes is the same one a networked broker client would implement.
#[derive(Clone)]
pub struct MemoryBroker<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    clock: C,
    cells: StdMutex<HashMap<String, Arc<Cell>>>,
}

struct Cell {
    state: StdMutex<CellState>,
    notify: Notify,
}

struct CellState {
    exclusive: Mutex,
    rw: RwLock,
    fair_queue: VecDeque<u64>,
    next_ticket: u64,
}

/// A fair waiter's place in line; removed from the queue on drop so a
/// cancelled acquire cannot block everyone behind it
struct FairTicket {
    cell: Arc<Cell>,
    id: u64,
    claimed: bool,
}

impl FairTicket {
    fn register(cell: Arc<Cell>) -> Self {
        let id = {
            let mut st = cell.state.lock().unwrap_or_else(|e| e.into_inner());
            let id = st.next_ticket;
            st.next_ticket += 1;
            st.fair_queue.push_back(id);
            id
        };
        Self {
            cell,
            id,
            claimed: false,
        }
    }

    /// Consume this ticket after a successful acquisition
    fn claim(&mut self, st: &mut CellState) {
        st.fair_queue.retain(|t| *t != self.id);
        self.claimed = true;
    }

    fn is_front(&self, st: &CellState) -> bool {
        st.fair_queue.front() == Some(&self.id)
    }
}

impl Drop for FairTicket {
    fn drop(&mut self) {
        if !self.claimed {
            let mut st = self.cell.state.lock().unwrap_or_else(|e| e.into_inner());
            st.fair_queue.retain(|t| *t != self.id);
            drop(st);
            // The next ticket in line may now be at the front
            self.cell.notify.notify_waiters();
        }
    }
}

impl MemoryBroker<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryBroker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryBroker<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock,
                cells: StdMutex::new(HashMap::new()),
            }),
        }
    }

    fn cell(&self, key: &str) -> Arc<Cell> {
        let mut cells = self.inner.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(Cell {
                    state: StdMutex::new(CellState {
                        exclusive: Mutex::new(key),
                        rw: RwLock::new(key),
                        fair_queue: VecDeque::new(),
                        next_ticket: 0,
                    }),
                    notify: Notify::new(),
                })
            })
            .clone()
    }

    /// One acquisition attempt; returns the events and whether it took
    /// the lock, plus a hint for how long to nap before retrying
    fn try_once(
        &self,
        cell: &Cell,
        mode: LockMode,
        owner: &OwnerToken,
        lease: Duration,
        ticket: Option<&mut FairTicket>,
    ) -> (bool, Vec<LockEvent>, Option<Duration>) {
        let clock = &self.inner.clock;
        let mut st = cell.state.lock().unwrap_or_else(|e| e.into_inner());

        match mode {
            LockMode::Exclusive { .. } => {
                if let Some(ticket) = &ticket {
                    if !ticket.is_front(&st) {
                        let hint = st.exclusive.lease_remaining(clock);
                        return (false, Vec::new(), hint);
                    }
                }
                let (next, events) = st.exclusive.transition(
                    MutexInput::Acquire {
                        owner: owner.clone(),
                        lease,
                    },
                    clock,
                );
                let acquired = next.is_held_by(owner);
                st.exclusive = next;
                if acquired {
                    if let Some(ticket) = ticket {
                        ticket.claim(&mut st);
                    }
                }
                let hint = st.exclusive.lease_remaining(clock);
                (acquired, events, hint)
            }
            LockMode::Read => {
                let (next, events) = st.rw.transition(
                    RwLockInput::AcquireRead {
                        owner: owner.clone(),
                        lease,
                    },
                    clock,
                );
                let acquired = next.is_read_held_by(owner);
                st.rw = next;
                let hint = rw_hint(&st.rw, clock);
                (acquired, events, hint)
            }
            LockMode::Write => {
                let (next, events) = st.rw.transition(
                    RwLockInput::AcquireWrite {
                        owner: owner.clone(),
                        lease,
                    },
                    clock,
                );
                let acquired = next.is_write_held_by(owner);
                st.rw = next;
                let hint = rw_hint(&st.rw, clock);
                (acquired, events, hint)
            }
        }
    }
}

/// Time until the earliest current holder lapses
fn rw_hint(rw: &RwLock, clock: &impl Clock) -> Option<Duration> {
    rw.next_expiry()
        .map(|expiry| expiry.saturating_duration_since(clock.now()))
}

fn trace_events(events: &[LockEvent]) {
    for event in events {
        match event {
            LockEvent::Reclaimed {
                key,
                previous_owner,
                new_owner,
            } => {
                tracing::warn!(%key, %previous_owner, %new_owner, "lapsed lease reclaimed");
            }
            LockEvent::ForceCleared {
                key,
                previous_owner,
            } => {
                tracing::warn!(%key, %previous_owner, "lock force-cleared");
            }
            LockEvent::Denied { key, owner, .. }
            | LockEvent::ReadDenied { key, owner }
            | LockEvent::WriteDenied { key, owner } => {
                tracing::trace!(%key, %owner, "acquire denied");
            }
            other => {
                tracing::debug!(key = %other.key(), event = ?other, "lock event");
            }
        }
    }
}

#[async_trait]
impl<C: Clock + 'static> LockBroker for MemoryBroker<C> {
    async fn acquire(
        &self,
        key: &str,
        mode: LockMode,
        owner: OwnerToken,
        wait: Duration,
        lease: Duration,
    ) -> Result<bool, BrokerError> {
        let cell = self.cell(key);
        let deadline = tokio::time::Instant::now() + wait;
        let mut ticket = match mode {
            LockMode::Exclusive { fair: true } => Some(FairTicket::register(cell.clone())),
            _ => None,
        };

        loop {
            // Register interest before checking state so a release
            // between the check and the wait is never missed
            let notified = cell.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (acquired, events, hint) =
                self.try_once(&cell, mode, &owner, lease, ticket.as_mut());
            trace_events(&events);
            if acquired {
                // Non-fair winners may have jumped the queue; wake the
                // rest so they re-evaluate their position
                cell.notify.notify_waiters();
                return Ok(true);
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            let remaining = deadline - now;
            let nap = hint
                .map_or(remaining, |h| h.min(remaining))
                .max(Duration::from_millis(1));

            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep(nap) => {}
            }
        }
    }

    async fn release(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
    ) -> Result<bool, BrokerError> {
        let cell = self.cell(key);
        let clock = &self.inner.clock;

        let events = {
            let mut st = cell.state.lock().unwrap_or_else(|e| e.into_inner());
            match mode {
                LockMode::Exclusive { .. } => {
                    let (next, events) = st.exclusive.transition(
                        MutexInput::Release {
                            owner: owner.clone(),
                        },
                        clock,
                    );
                    st.exclusive = next;
                    events
                }
                LockMode::Read => {
                    let (next, events) = st.rw.transition(
                        RwLockInput::ReleaseRead {
                            owner: owner.clone(),
                        },
                        clock,
                    );
                    st.rw = next;
                    events
                }
                LockMode::Write => {
                    let (next, events) = st.rw.transition(
                        RwLockInput::ReleaseWrite {
                            owner: owner.clone(),
                        },
                        clock,
                    );
                    st.rw = next;
                    events
                }
            }
        };

        let released = !events.is_empty();
        trace_events(&events);
        if released {
            cell.notify.notify_waiters();
        }
        Ok(released)
    }

    async fn renew(
        &self,
        key: &str,
        mode: LockMode,
        owner: &OwnerToken,
        lease: Duration,
    ) -> Result<bool, BrokerError> {
        let cell = self.cell(key);
        let clock = &self.inner.clock;
        let mut st = cell.state.lock().unwrap_or_else(|e| e.into_inner());

        let events = match mode {
            LockMode::Exclusive { .. } => {
                let (next, events) = st.exclusive.transition(
                    MutexInput::Renew {
                        owner: owner.clone(),
                        lease,
                    },
                    clock,
                );
                st.exclusive = next;
                events
            }
            LockMode::Read | LockMode::Write => {
                let (next, events) = st.rw.transition(
                    RwLockInput::Renew {
                        owner: owner.clone(),
                        lease,
                    },
                    clock,
                );
                st.rw = next;
                events
            }
        };
        drop(st);

        trace_events(&events);
        Ok(!events.is_empty())
    }

    async fn is_locked(&self, key: &str) -> Result<bool, BrokerError> {
        let cell = self.cell(key);
        let clock = &self.inner.clock;
        let st = cell.state.lock().unwrap_or_else(|e| e.into_inner());
        let exclusive_live = !st.exclusive.is_free() && !st.exclusive.is_expired(clock);
        let rw_live = !st.rw.purged(clock).is_free();
        Ok(exclusive_live || rw_live)
    }

    async fn is_held_by(&self, key: &str, owner: &OwnerToken) -> Result<bool, BrokerError> {
        let cell = self.cell(key);
        let clock = &self.inner.clock;
        let st = cell.state.lock().unwrap_or_else(|e| e.into_inner());
        if st.exclusive.is_held_by(owner) && !st.exclusive.is_expired(clock) {
            return Ok(true);
        }
        let rw = st.rw.purged(clock);
        Ok(rw.is_read_held_by(owner) || rw.is_write_held_by(owner))
    }

    async fn force_clear(&self, key: &str) -> Result<bool, BrokerError> {
        let cell = self.cell(key);
        let clock = &self.inner.clock;

        let events = {
            let mut st = cell.state.lock().unwrap_or_else(|e| e.into_inner());
            let (next, mut events) = st.exclusive.transition(MutexInput::ForceClear, clock);
            st.exclusive = next;
            let (next, rw_events) = st.rw.transition(RwLockInput::ForceClear, clock);
            st.rw = next;
            events.extend(rw_events);
            events
        };

        let cleared = !events.is_empty();
        trace_events(&events);
        if cleared {
            cell.notify.notify_waiters();
        }
        Ok(cleared)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
