// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The front end: all port pairs of a configuration, plus the collaborators.

use config::{ConfigError, NatConfig};
use net::packet::Packet;
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info};

use crate::Direction;
use crate::concurrency::sync::Arc;
use crate::engine;
use crate::errors::NatError;
use crate::handlers::{NoHandlers, PacketHandlers};
use crate::pair::PortPair;

/// Index of a port pair, in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairId(pub usize);

impl Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A set of independent port pairs sharing the same collaborators.
#[derive(Debug)]
pub struct Nat<H: PacketHandlers = NoHandlers> {
    pairs: Vec<Arc<PortPair>>,
    handlers: H,
}

impl Nat<NoHandlers> {
    /// A translator without collaborators: no ARP, DHCP or ICMP handling.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn without_handlers(config: &NatConfig) -> Result<Self, ConfigError> {
        Self::new(config, NoHandlers)
    }
}

impl<H: PacketHandlers> Nat<H> {
    /// Build all port pairs of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: &NatConfig, handlers: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let pairs = config
            .pairs
            .iter()
            .map(|pair| PortPair::new(pair).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        info!("NAT ready with {} port pair(s)", pairs.len());
        Ok(Self { pairs, handlers })
    }

    #[must_use]
    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    #[must_use]
    pub fn pairs(&self) -> &[Arc<PortPair>] {
        &self.pairs
    }

    #[must_use]
    pub fn pair(&self, id: PairId) -> Option<&Arc<PortPair>> {
        self.pairs.get(id.0)
    }

    #[must_use]
    pub fn pair_id(&self, name: &str) -> Option<PairId> {
        self.pairs.iter().position(|p| p.name() == name).map(PairId)
    }

    fn get(&self, id: PairId) -> Option<&PortPair> {
        let pair = self.pair(id).map(AsRef::as_ref);
        if pair.is_none() {
            debug!("Dropping packet: {}", NatError::UnknownPair(id));
        }
        pair
    }

    /// Translate a packet received on the public side of pair `id`.
    pub fn public_to_private(&self, id: PairId, packet: &mut Packet) -> Direction {
        self.public_to_private_at(id, packet, Instant::now())
    }

    /// Translate a packet received on the private side of pair `id`.
    pub fn private_to_public(&self, id: PairId, packet: &mut Packet) -> Direction {
        self.private_to_public_at(id, packet, Instant::now())
    }

    /// [`Nat::public_to_private`], at time `now`.
    pub fn public_to_private_at(&self, id: PairId, packet: &mut Packet, now: Instant) -> Direction {
        self.get(id).map_or(Direction::Drop, |pair| {
            engine::public_to_private(pair, &self.handlers, packet, now)
        })
    }

    /// [`Nat::private_to_public`], at time `now`.
    pub fn private_to_public_at(&self, id: PairId, packet: &mut Packet, now: Instant) -> Direction {
        self.get(id).map_or(Direction::Drop, |pair| {
            engine::private_to_public(pair, &self.handlers, packet, now)
        })
    }

    /// Delete idle mappings in all pairs. Returns how many were deleted.
    pub fn reap_expired(&self, now: Instant) -> usize {
        self.pairs.iter().map(|pair| pair.reap_expired(now)).sum()
    }
}
