// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per port-pair counters.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Direction;

#[derive(Debug, Default)]
pub struct PairStats {
    forwarded: AtomicU64,
    dropped: AtomicU64,
    redirected: AtomicU64,
    allocations: AtomicU64,
    exhausted: AtomicU64,
    reaped: AtomicU64,
    terminated: AtomicU64,
}

/// Point-in-time copy of [`PairStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairStatsSnapshot {
    pub forwarded: u64,
    pub dropped: u64,
    pub redirected: u64,
    /// New dynamic mappings
    pub allocations: u64,
    /// Allocations refused for lack of a free port
    pub exhausted: u64,
    /// Dynamic mappings removed for idleness
    pub reaped: u64,
    /// TCP mappings removed by RST or by a completed close
    pub terminated: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl PairStats {
    pub(crate) fn record(&self, direction: Direction) {
        match direction {
            Direction::Forward => bump(&self.forwarded),
            Direction::Drop => bump(&self.dropped),
            Direction::RedirectToHost => bump(&self.redirected),
        }
    }

    pub(crate) fn allocated(&self) {
        bump(&self.allocations);
    }

    pub(crate) fn exhausted(&self) {
        bump(&self.exhausted);
    }

    pub(crate) fn reaped(&self) {
        bump(&self.reaped);
    }

    pub(crate) fn terminated(&self) {
        bump(&self.terminated);
    }

    #[must_use]
    pub fn snapshot(&self) -> PairStatsSnapshot {
        PairStatsSnapshot {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            redirected: self.redirected.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            reaped: self.reaped.load(Ordering::Relaxed),
            terminated: self.terminated.load(Ordering::Relaxed),
        }
    }
}
