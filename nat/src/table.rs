// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Concurrent maps: translation tables and neighbor caches.
//!
//! Lookups never take the port pair lock. Translation table writes do (see
//! [`crate::pair::PortPair`]); neighbor cache writes do not.

use ahash::RandomState;
use dashmap::DashMap;
use net::eth::mac::Mac;
use std::net::IpAddr;
use tracing::trace;

use crate::tuple::Tuple;

fn hasher_state() -> &'static RandomState {
    use std::sync::OnceLock;
    static HASHER_STATE: OnceLock<RandomState> = OnceLock::new();
    HASHER_STATE.get_or_init(|| RandomState::with_seeds(0, 0, 0, 0))
}

/// One direction of the translations of one protocol: from a tuple seen on a side to the tuple
/// on the opposite side.
#[derive(Debug)]
pub struct TranslationTable {
    map: DashMap<Tuple, Tuple, RandomState>,
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(hasher_state().clone()),
        }
    }

    /// Returns a copy of the value, so no shard guard outlives the call.
    #[must_use]
    pub fn lookup(&self, key: &Tuple) -> Option<Tuple> {
        let value = self.map.get(key).map(|v| *v);
        trace!("lookup: {key} -> {value:?}");
        value
    }

    pub(crate) fn insert(&self, key: Tuple, value: Tuple) -> Option<Tuple> {
        self.map.insert(key, value)
    }

    pub(crate) fn remove(&self, key: &Tuple) -> Option<Tuple> {
        self.map.remove(key).map(|(_, v)| v)
    }

    /// Remove `key` only if it still maps to `value`.
    pub(crate) fn remove_paired(&self, key: &Tuple, value: &Tuple) -> bool {
        self.map.remove_if(key, |_, v| v == value).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Snapshot of all entries, in no particular order.
    #[must_use]
    pub fn entries(&self) -> Vec<(Tuple, Tuple)> {
        self.map.iter().map(|e| (*e.key(), *e.value())).collect()
    }
}

/// IP to link address cache of one side. Last writer wins.
#[derive(Debug)]
pub struct NeighborCache {
    map: DashMap<IpAddr, Mac, RandomState>,
}

impl Default for NeighborCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighborCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: DashMap::with_hasher(hasher_state().clone()),
        }
    }

    pub fn learn(&self, ip: IpAddr, mac: Mac) {
        match self.map.insert(ip, mac) {
            Some(old) if old != mac => trace!("neighbor {ip} moved from {old} to {mac}"),
            _ => {}
        }
    }

    #[must_use]
    pub fn resolve(&self, ip: IpAddr) -> Option<Mac> {
        self.map.get(&ip).map(|m| *m)
    }

    pub fn forget(&self, ip: IpAddr) -> Option<Mac> {
        self.map.remove(&ip).map(|(_, m)| m)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
