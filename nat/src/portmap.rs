// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per public-port metadata.
//!
//! There is one [`PortMap`] per (protocol, family) of a port pair, covering exactly the pool range
//! of that protocol. Slots are read without the pair lock on the packet path (state, last use);
//! everything else only changes with the pair lock held.

use atomic_instant_full::AtomicInstant;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use config::PortRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no such value: {0}")]
pub struct InvalidDiscriminant(u8);

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Not bound to any flow
    Free = 0,
    /// Bound by an egress allocation
    Dynamic = 1,
    /// Bound at startup, never expires
    Static = 2,
}

impl TryFrom<u8> for SlotState {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SlotState::Free),
            1 => Ok(SlotState::Dynamic),
            2 => Ok(SlotState::Static),
            v => Err(InvalidDiscriminant(v)),
        }
    }
}

/// The direction a packet was travelling when it was observed.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    PrivateToPublic = 1,
    PublicToPrivate = 2,
}

impl TryFrom<u8> for Crossing {
    type Error = InvalidDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Crossing::PrivateToPublic),
            2 => Ok(Crossing::PublicToPrivate),
            v => Err(InvalidDiscriminant(v)),
        }
    }
}

const NO_CROSSING: u8 = 0;

/// Metadata of one public port.
pub struct PortMapEntry {
    last_used: AtomicInstant,
    state: AtomicU8,
    fin_count: AtomicU8,
    termination: AtomicU8,
}

impl Debug for PortMapEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.snapshot())
    }
}

/// A copy of a [`PortMapEntry`] at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub state: SlotState,
    pub last_used: Instant,
    pub fin_count: u8,
    pub termination: Option<Crossing>,
}

impl PortMapEntry {
    fn new(now: Instant) -> Self {
        Self {
            last_used: AtomicInstant::new(now),
            state: AtomicU8::new(SlotState::Free as u8),
            fin_count: AtomicU8::new(0),
            termination: AtomicU8::new(NO_CROSSING),
        }
    }

    #[must_use]
    pub fn state(&self) -> SlotState {
        // only this module stores into `state`, always from a SlotState
        SlotState::try_from(self.state.load(Ordering::Acquire)).unwrap_or(SlotState::Free)
    }

    #[must_use]
    pub fn last_used(&self) -> Instant {
        self.last_used.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn fin_count(&self) -> u8 {
        self.fin_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn termination(&self) -> Option<Crossing> {
        Crossing::try_from(self.termination.load(Ordering::Relaxed)).ok()
    }

    #[must_use]
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            state: self.state(),
            last_used: self.last_used(),
            fin_count: self.fin_count(),
            termination: self.termination(),
        }
    }

    /// Move the last use forward to `now`. A later value, such as the end of a hold-down set
    /// concurrently by a close, is kept.
    pub(crate) fn touch(&self, now: Instant) {
        self.last_used.fetch_max(now, Ordering::Relaxed);
    }

    /// Bind the slot to a new flow. Pair lock held.
    pub(crate) fn bind(&self, state: SlotState, now: Instant) {
        self.last_used.store(now, Ordering::Relaxed);
        self.fin_count.store(0, Ordering::Relaxed);
        self.termination.store(NO_CROSSING, Ordering::Relaxed);
        self.state.store(state as u8, Ordering::Release);
    }

    /// Mark the slot free, keeping its last use time. Pair lock held.
    pub(crate) fn release(&self) {
        self.state.store(SlotState::Free as u8, Ordering::Release);
        self.fin_count.store(0, Ordering::Relaxed);
        self.termination.store(NO_CROSSING, Ordering::Relaxed);
    }

    /// Record a FIN. Returns the new FIN count. Pair lock held.
    pub(crate) fn record_fin(&self, crossing: Crossing) -> u8 {
        match (self.fin_count(), self.termination()) {
            (0, _) => {
                self.termination.store(crossing as u8, Ordering::Relaxed);
                self.fin_count.store(1, Ordering::Relaxed);
                1
            }
            (1, Some(first)) if first != crossing => {
                self.fin_count.store(2, Ordering::Relaxed);
                2
            }
            (count, _) => count,
        }
    }
}

/// The slots of one pool.
#[derive(Debug)]
pub struct PortMap {
    range: PortRange,
    entries: Box<[PortMapEntry]>,
}

impl PortMap {
    /// All slots start free and immediately allocatable from `now` on.
    #[must_use]
    pub fn new(range: PortRange, now: Instant) -> Self {
        let entries = (range.start..range.end)
            .map(|_| PortMapEntry::new(now))
            .collect();
        Self { range, entries }
    }

    #[must_use]
    pub fn range(&self) -> PortRange {
        self.range
    }

    /// The slot for `port`, if `port` belongs to the pool.
    #[must_use]
    pub fn get(&self, port: u16) -> Option<&PortMapEntry> {
        if !self.range.contains(port) {
            return None;
        }
        self.entries.get(usize::from(port - self.range.start))
    }
}
