// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Port pairs: the owning unit of translation state.
//!
//! Every structural change (allocating, deleting, TCP termination) happens with the pair lock
//! held. The lock guards the allocation cursors and the port bindings; the translation tables and
//! slots it keeps consistent are read without it.

use config::{ConfigError, PortPairConfig, PortPools, StaticMapping};
use net::headers::Protocol;
use std::collections::HashMap;
use std::fmt::Debug;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::PoisonError;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::concurrency::sync::{Mutex, MutexGuard};
use crate::errors::NatError;
use crate::portmap::{PortMap, PortMapEntry, SlotSnapshot, SlotState};
use crate::side::{Side, SideKind};
use crate::stats::{PairStats, PairStatsSnapshot};
use crate::tuple::{Family, Tuple};

type SlotKey = (Protocol, Family, u16);

/// State only touched with the pair lock held.
#[derive(Debug, Default)]
pub(crate) struct AllocState {
    /// Next offset into the pool to try, per protocol and family
    cursors: [[u16; 2]; 3],
    /// Public tuple currently bound to each allocated port
    bound: HashMap<SlotKey, Tuple>,
}

/// Outcome of refreshing a slot on a table hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Freshness {
    Live,
    Expired,
    /// Deleted between the table lookup and the slot check
    Gone,
}

pub struct PortPair {
    name: String,
    public: Side,
    private: Side,
    connection_timeout: Duration,
    reuse_hold_down: Duration,
    pools: PortPools,
    state: Mutex<AllocState>,
    port_maps: [[PortMap; 2]; 3],
    stats: PairStats,
}

impl Debug for PortPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortPair")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("private", &self.private)
            .field("connection_timeout", &self.connection_timeout)
            .field("reuse_hold_down", &self.reuse_hold_down)
            .field("pools", &self.pools)
            .finish_non_exhaustive()
    }
}

impl PortPair {
    /// Build a port pair and install its static mappings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: &PortPairConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let now = Instant::now();
        let pools = config.pools;
        let pair = Self {
            name: config.name.clone(),
            public: Side::new(SideKind::Public, &config.public),
            private: Side::new(SideKind::Private, &config.private),
            connection_timeout: config.connection_timeout,
            reuse_hold_down: config.reuse_hold_down,
            pools,
            state: Mutex::new(AllocState::default()),
            port_maps: std::array::from_fn(|p| {
                std::array::from_fn(|_| PortMap::new(pools.get(Protocol::ALL[p]), now))
            }),
            stats: PairStats::default(),
        };
        {
            let mut state = pair.lock();
            for mapping in &config.static_mappings {
                pair.install_static(&mut state, mapping, now)?;
            }
        }
        info!(
            "Port pair '{}' ready with {} static mapping(s)",
            pair.name,
            config.static_mappings.len()
        );
        Ok(pair)
    }

    fn install_static(
        &self,
        state: &mut AllocState,
        mapping: &StaticMapping,
        now: Instant,
    ) -> Result<(), ConfigError> {
        let family = Family::of(mapping.private.ip());
        let no_address =
            || ConfigError::StaticMappingWithoutAddress(self.name.clone(), mapping.private);
        let public_addr = self.public.address(family).ok_or_else(no_address)?;
        let public = Tuple::new(public_addr, mapping.public_port);
        let private = if mapping.redirects_to_host() {
            // one reservation per public port, so that the private table stays one-to-one
            let unspecified = match family {
                Family::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                Family::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            };
            Tuple::new(unspecified, mapping.public_port)
        } else {
            Tuple::from(mapping.private)
        };
        if self.entry(family, mapping.protocol, public.port()).is_none() {
            let range = self.pools.get(mapping.protocol);
            return Err(ConfigError::StaticMappingOutOfPool(
                self.name.clone(),
                mapping.protocol,
                mapping.public_port,
                range.start,
                range.end,
            ));
        }
        self.bind_locked(state, mapping.protocol, public, private, SlotState::Static, now);
        info!(
            "Port pair '{}': static {} mapping {public} -> {}",
            self.name,
            mapping.protocol,
            SocketAddr::from(private)
        );
        Ok(())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, AllocState> {
        // the guarded state is consistent after every statement, a panic elsewhere cannot tear it
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn public(&self) -> &Side {
        &self.public
    }

    #[must_use]
    pub fn private(&self) -> &Side {
        &self.private
    }

    #[must_use]
    pub fn side(&self, kind: SideKind) -> &Side {
        match kind {
            SideKind::Public => &self.public,
            SideKind::Private => &self.private,
        }
    }

    /// The side facing `side`.
    #[must_use]
    pub fn opposite(&self, side: &Side) -> &Side {
        self.side(side.kind().opposite())
    }

    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    #[must_use]
    pub fn reuse_hold_down(&self) -> Duration {
        self.reuse_hold_down
    }

    #[must_use]
    pub fn pools(&self) -> &PortPools {
        &self.pools
    }

    #[must_use]
    pub fn stats(&self) -> PairStatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn counters(&self) -> &PairStats {
        &self.stats
    }

    fn port_map(&self, protocol: Protocol, family: Family) -> &PortMap {
        &self.port_maps[protocol.index()][family.index()]
    }

    pub(crate) fn entry(
        &self,
        family: Family,
        protocol: Protocol,
        port: u16,
    ) -> Option<&PortMapEntry> {
        self.port_map(protocol, family).get(port)
    }

    /// Metadata of a public port, `None` if the port is outside the pool.
    #[must_use]
    pub fn slot(&self, family: Family, protocol: Protocol, port: u16) -> Option<SlotSnapshot> {
        self.entry(family, protocol, port).map(PortMapEntry::snapshot)
    }

    /// Public to private translation of `public`.
    #[must_use]
    pub fn lookup_public(&self, protocol: Protocol, public: &Tuple) -> Option<Tuple> {
        self.public.table(protocol).lookup(public)
    }

    /// Private to public translation of `private`.
    #[must_use]
    pub fn lookup_private(&self, protocol: Protocol, private: &Tuple) -> Option<Tuple> {
        self.private.table(protocol).lookup(private)
    }

    /// Number of live mappings (static included) for `protocol`, both families.
    #[must_use]
    pub fn mapping_count(&self, protocol: Protocol) -> usize {
        self.public.table(protocol).len()
    }

    fn is_idle(&self, slot: &PortMapEntry, now: Instant) -> bool {
        slot.state() == SlotState::Dynamic
            && now.saturating_duration_since(slot.last_used()) > self.connection_timeout
    }

    /// Refresh the last use of a slot found through a table hit, unless it went idle for too long.
    pub(crate) fn refresh(&self, slot: &PortMapEntry, now: Instant) -> Freshness {
        match slot.state() {
            SlotState::Free => Freshness::Gone,
            SlotState::Static => {
                slot.touch(now);
                Freshness::Live
            }
            SlotState::Dynamic if self.is_idle(slot, now) => Freshness::Expired,
            SlotState::Dynamic => {
                slot.touch(now);
                Freshness::Live
            }
        }
    }

    /// Refresh the last use of a slot found through an egress table hit, however long it sat
    /// idle. Returns `false` if the slot was released in the meantime.
    pub(crate) fn revive(&self, slot: &PortMapEntry, now: Instant) -> bool {
        if slot.state() == SlotState::Free {
            return false;
        }
        slot.touch(now);
        true
    }

    /// Create a dynamic mapping for `private` and return its public tuple.
    ///
    /// If another worker created a mapping for the same private tuple in the meantime, that
    /// mapping is returned instead.
    ///
    /// # Errors
    ///
    /// Fails if the public side has no address for the family or if the pool is exhausted. In
    /// both cases nothing is changed.
    pub fn allocate(
        &self,
        protocol: Protocol,
        private: Tuple,
        now: Instant,
    ) -> Result<Tuple, NatError> {
        let family = private.family();
        let mut state = self.lock();
        if let Some(public) = self.private.table(protocol).lookup(&private) {
            return Ok(public);
        }
        let public_addr = self
            .public
            .address(family)
            .ok_or(NatError::NotAcquired(SideKind::Public, family))?;
        let Some(port) = self.pick_port(&mut state, protocol, family, now) else {
            self.stats.exhausted();
            return Err(NatError::Exhausted { protocol, family });
        };
        let public = Tuple::new(public_addr, port);
        self.bind_locked(&mut state, protocol, public, private, SlotState::Dynamic, now);
        self.stats.allocated();
        debug!("Port pair '{}': new {protocol} mapping {private} -> {public}", self.name);
        Ok(public)
    }

    /// Sequential scan of the pool, starting where the previous allocation stopped.
    fn pick_port(
        &self,
        state: &mut AllocState,
        protocol: Protocol,
        family: Family,
        now: Instant,
    ) -> Option<u16> {
        let map = self.port_map(protocol, family);
        let range = map.range();
        let len = u32::from(range.end.saturating_sub(range.start));
        let first = u32::from(state.cursors[protocol.index()][family.index()]);
        for i in 0..len {
            let offset = u16::try_from((first + i) % len).ok()?;
            let port = range.start + offset;
            let Some(slot) = map.get(port) else {
                continue;
            };
            let eligible = match slot.state() {
                SlotState::Static => false,
                // a closed TCP port is held down until `last_used`
                SlotState::Free => now >= slot.last_used(),
                SlotState::Dynamic if self.is_idle(slot, now) => {
                    debug!("Port pair '{}': reclaiming idle {protocol} port {port}", self.name);
                    self.delete_locked(state, protocol, family, port);
                    self.stats.reaped();
                    true
                }
                SlotState::Dynamic => false,
            };
            if eligible {
                let next = (u32::from(offset) + 1) % len;
                state.cursors[protocol.index()][family.index()] = u16::try_from(next).ok()?;
                return Some(port);
            }
        }
        None
    }

    fn bind_locked(
        &self,
        state: &mut AllocState,
        protocol: Protocol,
        public: Tuple,
        private: Tuple,
        kind: SlotState,
        now: Instant,
    ) {
        let family = public.family();
        if let Some(slot) = self.entry(family, protocol, public.port()) {
            slot.bind(kind, now);
        }
        self.public.table(protocol).insert(public, private);
        self.private.table(protocol).insert(private, public);
        state.bound.insert((protocol, family, public.port()), public);
    }

    /// Remove both table entries of a public port and free its slot. The slot keeps its last
    /// use time.
    pub(crate) fn delete_locked(
        &self,
        state: &mut AllocState,
        protocol: Protocol,
        family: Family,
        port: u16,
    ) {
        if let Some(public) = state.bound.remove(&(protocol, family, port)) {
            if let Some(private) = self.public.table(protocol).remove(&public) {
                self.private.table(protocol).remove_paired(&private, &public);
            }
        }
        if let Some(slot) = self.entry(family, protocol, port) {
            slot.release();
        }
    }

    /// Delete the mapping of a public port, static or not. Returns whether there was one.
    pub fn remove_mapping(&self, protocol: Protocol, family: Family, port: u16) -> bool {
        let mut state = self.lock();
        if !state.bound.contains_key(&(protocol, family, port)) {
            return false;
        }
        self.delete_locked(&mut state, protocol, family, port);
        debug!("Port pair '{}': removed {protocol} mapping on port {port}", self.name);
        true
    }

    /// Delete the mapping of a public port if it is (still) idle.
    pub(crate) fn expire_if_idle(
        &self,
        protocol: Protocol,
        family: Family,
        port: u16,
        now: Instant,
    ) -> bool {
        let mut state = self.lock();
        let Some(slot) = self.entry(family, protocol, port) else {
            return false;
        };
        if !self.is_idle(slot, now) {
            return false;
        }
        self.delete_locked(&mut state, protocol, family, port);
        self.stats.reaped();
        debug!("Port pair '{}': {protocol} port {port} expired", self.name);
        true
    }

    /// Delete every idle dynamic mapping. Returns how many were deleted.
    ///
    /// Translation never needs this: idle mappings are reclaimed when a packet or an allocation
    /// touches them. It only bounds how long stale entries linger.
    pub fn reap_expired(&self, now: Instant) -> usize {
        let mut state = self.lock();
        let idle: Vec<SlotKey> = state
            .bound
            .keys()
            .copied()
            .filter(|(protocol, family, port)| {
                self.entry(*family, *protocol, *port)
                    .is_some_and(|slot| self.is_idle(slot, now))
            })
            .collect();
        for (protocol, family, port) in &idle {
            self.delete_locked(&mut state, *protocol, *family, *port);
            self.stats.reaped();
        }
        if !idle.is_empty() {
            debug!("Port pair '{}': reaped {} idle mapping(s)", self.name, idle.len());
        }
        idle.len()
    }
}

#[cfg(all(test, not(feature = "shuttle")))]
mod tests {
    use super::*;
    use config::{AddressConfig4, PortPairConfigBuilder, PortRange, SideConfig};
    use net::eth::mac::Mac;
    use std::net::SocketAddr;

    fn tuple(s: &str) -> Tuple {
        s.parse::<SocketAddr>().unwrap().into()
    }

    fn config(tcp: PortRange) -> PortPairConfig {
        PortPairConfigBuilder::default()
            .name("test")
            .public(
                SideConfig::new(Mac([2, 0, 0, 0, 0, 1])).with_ipv4(AddressConfig4::Static {
                    address: "203.0.113.1/24".parse().unwrap(),
                }),
            )
            .private(
                SideConfig::new(Mac([2, 0, 0, 0, 0, 2])).with_ipv4(AddressConfig4::Static {
                    address: "10.0.0.1/24".parse().unwrap(),
                }),
            )
            .pools(PortPools {
                tcp,
                ..PortPools::default()
            })
            .build()
            .unwrap()
    }

    fn assert_paired(pair: &PortPair, protocol: Protocol) {
        let public = pair.public().table(protocol).entries();
        let private = pair.private().table(protocol).entries();
        assert_eq!(public.len(), private.len());
        for (pub_tuple, priv_tuple) in public {
            assert_eq!(pair.lookup_private(protocol, &priv_tuple), Some(pub_tuple));
        }
    }

    #[test]
    fn sequential_allocation_wraps() {
        let pair = PortPair::new(&config(PortRange::new(1024, 1027))).unwrap();
        let now = Instant::now();
        let ports: Vec<u16> = (0..3)
            .map(|i| {
                pair.allocate(Protocol::Tcp, tuple(&format!("10.0.0.5:{}", 40000 + i)), now)
                    .unwrap()
                    .port()
            })
            .collect();
        assert_eq!(ports, vec![1024, 1025, 1026]);
        assert_paired(&pair, Protocol::Tcp);

        // free the middle one: the cursor is back at 1024, which is taken, so 1025 is next
        assert!(pair.remove_mapping(Protocol::Tcp, Family::V4, 1025));
        let public = pair
            .allocate(Protocol::Tcp, tuple("10.0.0.6:1"), now)
            .unwrap();
        assert_eq!(public, tuple("203.0.113.1:1025"));
        assert_paired(&pair, Protocol::Tcp);
    }

    #[test]
    fn same_private_tuple_allocates_once() {
        let pair = PortPair::new(&config(PortRange::new(1024, 1030))).unwrap();
        let now = Instant::now();
        let first = pair.allocate(Protocol::Udp, tuple("10.0.0.5:53"), now).unwrap();
        let again = pair.allocate(Protocol::Udp, tuple("10.0.0.5:53"), now).unwrap();
        assert_eq!(first, again);
        assert_eq!(pair.mapping_count(Protocol::Udp), 1);
        assert_eq!(pair.stats().allocations, 1);
    }

    #[test]
    fn exhaustion_changes_nothing() {
        let pair = PortPair::new(&config(PortRange::new(1024, 1026))).unwrap();
        let now = Instant::now();
        pair.allocate(Protocol::Tcp, tuple("10.0.0.5:1"), now).unwrap();
        pair.allocate(Protocol::Tcp, tuple("10.0.0.5:2"), now).unwrap();
        assert_eq!(
            pair.allocate(Protocol::Tcp, tuple("10.0.0.5:3"), now),
            Err(NatError::Exhausted {
                protocol: Protocol::Tcp,
                family: Family::V4
            })
        );
        assert_eq!(pair.mapping_count(Protocol::Tcp), 2);
        assert!(pair.lookup_private(Protocol::Tcp, &tuple("10.0.0.5:3")).is_none());
        assert_eq!(pair.stats().exhausted, 1);
    }

    #[test]
    fn idle_ports_are_reclaimed_by_allocation() {
        let pair = PortPair::new(&config(PortRange::new(1024, 1025))).unwrap();
        let now = Instant::now();
        pair.allocate(Protocol::Tcp, tuple("10.0.0.5:1"), now).unwrap();

        let later = now + pair.connection_timeout();
        assert!(pair.allocate(Protocol::Tcp, tuple("10.0.0.5:2"), later).is_err());

        let much_later = later + Duration::from_secs(1);
        let public = pair
            .allocate(Protocol::Tcp, tuple("10.0.0.5:2"), much_later)
            .unwrap();
        assert_eq!(public.port(), 1024);
        assert!(pair.lookup_private(Protocol::Tcp, &tuple("10.0.0.5:1")).is_none());
        assert_paired(&pair, Protocol::Tcp);
        assert_eq!(pair.stats().reaped, 1);
    }

    #[test]
    fn held_down_port_is_skipped() {
        let pair = PortPair::new(&config(PortRange::new(1024, 1026))).unwrap();
        let now = Instant::now();
        pair.allocate(Protocol::Tcp, tuple("10.0.0.5:1"), now).unwrap();
        {
            let mut state = pair.lock();
            pair.delete_locked(&mut state, Protocol::Tcp, Family::V4, 1024);
            pair.entry(Family::V4, Protocol::Tcp, 1024)
                .unwrap()
                .touch(now + Duration::from_secs(5));
        }
        // 1024 is free again but held down
        assert_eq!(
            pair.allocate(Protocol::Tcp, tuple("10.0.0.5:2"), now)
                .unwrap()
                .port(),
            1025
        );
        assert!(pair.allocate(Protocol::Tcp, tuple("10.0.0.5:3"), now).is_err());
        assert_eq!(
            pair.allocate(Protocol::Tcp, tuple("10.0.0.5:3"), now + Duration::from_secs(5))
                .unwrap()
                .port(),
            1024
        );
    }

    #[test]
    fn reap_expired_sweeps_dynamic_only() {
        let mut config = config(PortRange::new(1024, 1100));
        config.static_mappings.push(StaticMapping::new(
            Protocol::Tcp,
            1099,
            "10.0.0.9:22".parse().unwrap(),
        ));
        let pair = PortPair::new(&config).unwrap();
        let now = Instant::now();
        for i in 0..10 {
            pair.allocate(Protocol::Tcp, tuple(&format!("10.0.0.5:{}", 100 + i)), now)
                .unwrap();
        }
        assert_eq!(pair.reap_expired(now), 0);
        let later = now + pair.connection_timeout() + Duration::from_secs(1);
        assert_eq!(pair.reap_expired(later), 10);
        assert_eq!(pair.mapping_count(Protocol::Tcp), 1);
        assert_eq!(
            pair.lookup_public(Protocol::Tcp, &tuple("203.0.113.1:1099")),
            Some(tuple("10.0.0.9:22"))
        );
        assert_paired(&pair, Protocol::Tcp);
    }

    #[test]
    fn static_reservation_for_host() {
        let mut config = config(PortRange::default());
        config.static_mappings.push(StaticMapping::new(
            Protocol::Udp,
            5000,
            "0.0.0.0:0".parse().unwrap(),
        ));
        let pair = PortPair::new(&config).unwrap();
        let private = pair
            .lookup_public(Protocol::Udp, &tuple("203.0.113.1:5000"))
            .unwrap();
        assert!(private.is_zero());
        assert_eq!(
            pair.slot(Family::V4, Protocol::Udp, 5000).unwrap().state,
            SlotState::Static
        );
        assert_paired(&pair, Protocol::Udp);
    }

    #[test]
    fn ipv6_needs_a_public_address() {
        let pair = PortPair::new(&config(PortRange::default())).unwrap();
        assert_eq!(
            pair.allocate(Protocol::Tcp, tuple("[fd00::5]:1000"), Instant::now()),
            Err(NatError::NotAcquired(SideKind::Public, Family::V6))
        );
        pair.public().set_ipv6(Some("2001:db8::1/64".parse().unwrap()));
        let public = pair
            .allocate(Protocol::Tcp, tuple("[fd00::5]:1000"), Instant::now())
            .unwrap();
        assert_eq!(public, tuple("[2001:db8::1]:1024"));
    }
}
