// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! One attachment point of a port pair.

use arc_swap::ArcSwapOption;
use config::SideConfig;
use ipnet::{Ipv4Net, Ipv6Net};
use net::eth::mac::Mac;
use net::headers::Protocol;
use net::vlan::Vid;
use std::fmt::Display;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;
use tracing::info;

use crate::table::{NeighborCache, TranslationTable};
use crate::tuple::Family;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideKind {
    Public,
    Private,
}

impl SideKind {
    #[must_use]
    pub fn opposite(self) -> SideKind {
        match self {
            SideKind::Public => SideKind::Private,
            SideKind::Private => SideKind::Public,
        }
    }
}

impl Display for SideKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SideKind::Public => write!(f, "public"),
            SideKind::Private => write!(f, "private"),
        }
    }
}

/// Solicited-node multicast group of `addr` (RFC 4291, section 2.7.1).
#[must_use]
pub fn solicited_node(addr: Ipv6Addr) -> Ipv6Addr {
    let o = addr.octets();
    Ipv6Addr::new(
        0xff02,
        0,
        0,
        0,
        0,
        1,
        0xff00 | u16::from(o[13]),
        u16::from_be_bytes([o[14], o[15]]),
    )
}

/// An attachment point: link identity, acquired addresses, neighbors and the translation tables
/// keyed by tuples seen on this side.
///
/// Sides do not reference each other; the owning [`crate::PortPair`] resolves the opposite one.
#[derive(Debug)]
pub struct Side {
    kind: SideKind,
    mac: Mac,
    vid: Option<Vid>,
    host_redirect: Option<String>,
    link_local: Ipv6Addr,
    ipv4: ArcSwapOption<Ipv4Net>,
    ipv6: ArcSwapOption<Ipv6Net>,
    neighbors: NeighborCache,
    tables: [TranslationTable; 3],
}

impl Side {
    #[must_use]
    pub fn new(kind: SideKind, config: &SideConfig) -> Self {
        let side = Self {
            kind,
            mac: config.mac,
            vid: config.vlan,
            host_redirect: config.host_redirect.clone(),
            link_local: config.mac.link_local_ipv6(),
            ipv4: ArcSwapOption::empty(),
            ipv6: ArcSwapOption::empty(),
            neighbors: NeighborCache::new(),
            tables: Default::default(),
        };
        side.set_ipv4(config.static_ipv4());
        side.set_ipv6(config.static_ipv6());
        side
    }

    #[must_use]
    pub fn kind(&self) -> SideKind {
        self.kind
    }

    #[must_use]
    pub fn mac(&self) -> Mac {
        self.mac
    }

    #[must_use]
    pub fn vid(&self) -> Option<Vid> {
        self.vid
    }

    /// Name of the host-stack interface, if traffic can be handed to the host on this side.
    #[must_use]
    pub fn host_redirect(&self) -> Option<&str> {
        self.host_redirect.as_deref()
    }

    #[must_use]
    pub fn ipv4(&self) -> Option<Ipv4Net> {
        self.ipv4.load().as_deref().copied()
    }

    #[must_use]
    pub fn ipv6(&self) -> Option<Ipv6Net> {
        self.ipv6.load().as_deref().copied()
    }

    /// Record (or withdraw) the IPv4 address, e.g. when a DHCP lease is obtained or lost.
    pub fn set_ipv4(&self, subnet: Option<Ipv4Net>) {
        if let Some(subnet) = subnet {
            info!("{} side: IPv4 address {subnet}", self.kind);
        }
        self.ipv4.store(subnet.map(Arc::new));
    }

    /// Record (or withdraw) the IPv6 address, e.g. when a DHCPv6 lease is obtained or lost.
    pub fn set_ipv6(&self, subnet: Option<Ipv6Net>) {
        if let Some(subnet) = subnet {
            info!("{} side: IPv6 address {subnet}", self.kind);
        }
        self.ipv6.store(subnet.map(Arc::new));
    }

    /// The primary address of the given family, if acquired.
    #[must_use]
    pub fn address(&self, family: Family) -> Option<IpAddr> {
        match family {
            Family::V4 => self.ipv4().map(|net| IpAddr::V4(net.addr())),
            Family::V6 => self.ipv6().map(|net| IpAddr::V6(net.addr())),
        }
    }

    #[must_use]
    pub fn acquired(&self, family: Family) -> bool {
        match family {
            Family::V4 => self.ipv4.load().is_some(),
            Family::V6 => self.ipv6.load().is_some(),
        }
    }

    #[must_use]
    pub fn link_local(&self) -> Ipv6Addr {
        self.link_local
    }

    /// Whether `addr` is one of this side's own identities: the primary address, and for IPv6
    /// also the link-local address and the solicited-node groups of both.
    #[must_use]
    pub fn is_own_address(&self, addr: IpAddr) -> bool {
        match addr {
            IpAddr::V4(addr) => self.ipv4().is_some_and(|net| net.addr() == addr),
            IpAddr::V6(addr) => {
                if addr == self.link_local || addr == solicited_node(self.link_local) {
                    return true;
                }
                self.ipv6()
                    .is_some_and(|net| addr == net.addr() || addr == solicited_node(net.addr()))
            }
        }
    }

    /// Host redirect needs both a host interface and a known address for the family.
    #[must_use]
    pub fn can_redirect_to_host(&self, family: Family) -> bool {
        self.host_redirect.is_some() && self.acquired(family)
    }

    #[must_use]
    pub fn neighbors(&self) -> &NeighborCache {
        &self.neighbors
    }

    #[must_use]
    pub fn table(&self, protocol: Protocol) -> &TranslationTable {
        &self.tables[protocol.index()]
    }
}
