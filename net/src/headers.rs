// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Definition of [`Headers`] and related methods and types.

use crate::arp::Arp;
use crate::eth::Eth;
use crate::eth::mac::Mac;
use crate::icmp::{Icmp4, Icmp6};
use crate::ip::NextHeader;
use crate::ipv4::Ipv4;
use crate::ipv6::Ipv6;
use crate::tcp::Tcp;
use crate::udp::Udp;
use crate::vlan::{Vid, Vlan};
use std::fmt::Display;
use std::net::IpAddr;

/// Errors raised when rewriting a network header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("address {0} does not match the IP version of the header")]
    InvalidIpVersion(IpAddr),
}

/// Errors raised when rewriting a transport header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("ICMP message has no identifier to rewrite to {0}")]
    NoIdentifier(u16),
}

/// The transport protocols subject to translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [Protocol::Tcp, Protocol::Udp, Protocol::Icmp];

    /// Dense index, for per-protocol arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Protocol::Tcp => 0,
            Protocol::Udp => 1,
            Protocol::Icmp => 2,
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Icmp => write!(f, "icmp"),
        }
    }
}

/// Network layer header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Net {
    Ipv4(Ipv4),
    Ipv6(Ipv6),
}

impl Net {
    #[must_use]
    pub fn source(&self) -> IpAddr {
        match self {
            Net::Ipv4(ip) => IpAddr::V4(ip.source()),
            Net::Ipv6(ip) => IpAddr::V6(ip.source()),
        }
    }

    #[must_use]
    pub fn destination(&self) -> IpAddr {
        match self {
            Net::Ipv4(ip) => IpAddr::V4(ip.destination()),
            Net::Ipv6(ip) => IpAddr::V6(ip.destination()),
        }
    }

    #[must_use]
    pub fn next_header(&self) -> NextHeader {
        match self {
            Net::Ipv4(ip) => ip.protocol(),
            Net::Ipv6(ip) => ip.next_header(),
        }
    }

    /// Set the source address.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::InvalidIpVersion`] if the address family does not match the header.
    pub fn try_set_source(&mut self, addr: IpAddr) -> Result<(), NetError> {
        match (self, addr) {
            (Net::Ipv4(ip), IpAddr::V4(addr)) => {
                ip.set_source(addr);
            }
            (Net::Ipv6(ip), IpAddr::V6(addr)) => {
                ip.set_source(addr);
            }
            (_, addr) => return Err(NetError::InvalidIpVersion(addr)),
        }
        Ok(())
    }

    /// Set the destination address.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::InvalidIpVersion`] if the address family does not match the header.
    pub fn try_set_destination(&mut self, addr: IpAddr) -> Result<(), NetError> {
        match (self, addr) {
            (Net::Ipv4(ip), IpAddr::V4(addr)) => {
                ip.set_destination(addr);
            }
            (Net::Ipv6(ip), IpAddr::V6(addr)) => {
                ip.set_destination(addr);
            }
            (_, addr) => return Err(NetError::InvalidIpVersion(addr)),
        }
        Ok(())
    }
}

/// Transport layer header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Tcp(Tcp),
    Udp(Udp),
    Icmp4(Icmp4),
    Icmp6(Icmp6),
}

impl Transport {
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        match self {
            Transport::Tcp(_) => Protocol::Tcp,
            Transport::Udp(_) => Protocol::Udp,
            Transport::Icmp4(_) | Transport::Icmp6(_) => Protocol::Icmp,
        }
    }

    /// Source port; for ICMP, the query identifier (0 when the message carries none).
    #[must_use]
    pub fn source_port(&self) -> u16 {
        match self {
            Transport::Tcp(tcp) => tcp.source(),
            Transport::Udp(udp) => udp.source(),
            Transport::Icmp4(icmp) => icmp.identifier().unwrap_or(0),
            Transport::Icmp6(icmp) => icmp.identifier().unwrap_or(0),
        }
    }

    /// Destination port; for ICMP, the query identifier (0 when the message carries none).
    #[must_use]
    pub fn destination_port(&self) -> u16 {
        match self {
            Transport::Tcp(tcp) => tcp.destination(),
            Transport::Udp(udp) => udp.destination(),
            Transport::Icmp4(icmp) => icmp.identifier().unwrap_or(0),
            Transport::Icmp6(icmp) => icmp.identifier().unwrap_or(0),
        }
    }

    /// Set the source port (ICMP: the identifier).
    ///
    /// # Errors
    ///
    /// Fails if asked to give a non-zero identifier to an ICMP message that has none.
    pub fn try_set_source(&mut self, port: u16) -> Result<(), TransportError> {
        match self {
            Transport::Tcp(tcp) => {
                tcp.set_source(port);
            }
            Transport::Udp(udp) => {
                udp.set_source(port);
            }
            Transport::Icmp4(icmp) => set_icmp_identifier(icmp.set_identifier(port), port)?,
            Transport::Icmp6(icmp) => set_icmp_identifier(icmp.set_identifier(port), port)?,
        }
        Ok(())
    }

    /// Set the destination port (ICMP: the identifier).
    ///
    /// # Errors
    ///
    /// Fails if asked to give a non-zero identifier to an ICMP message that has none.
    pub fn try_set_destination(&mut self, port: u16) -> Result<(), TransportError> {
        match self {
            Transport::Tcp(tcp) => {
                tcp.set_destination(port);
            }
            Transport::Udp(udp) => {
                udp.set_destination(port);
            }
            Transport::Icmp4(icmp) => set_icmp_identifier(icmp.set_identifier(port), port)?,
            Transport::Icmp6(icmp) => set_icmp_identifier(icmp.set_identifier(port), port)?,
        }
        Ok(())
    }
}

fn set_icmp_identifier(written: bool, port: u16) -> Result<(), TransportError> {
    if written || port == 0 {
        Ok(())
    } else {
        Err(TransportError::NoIdentifier(port))
    }
}

/// Link/network classification of a frame.
#[derive(Debug, Clone, Copy)]
pub enum L3<'a> {
    Arp(&'a Arp),
    Ipv4(&'a Ipv4),
    Ipv6(&'a Ipv6),
    Other,
}

/// The transport facts the translation engine needs from a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L4Info {
    pub protocol: Protocol,
    pub source_port: u16,
    pub destination_port: u16,
}

/// The decoded headers of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headers {
    pub eth: Eth,
    pub vlan: Option<Vlan>,
    pub arp: Option<Arp>,
    pub net: Option<Net>,
    pub transport: Option<Transport>,
}

impl Headers {
    #[must_use]
    pub fn new(eth: Eth) -> Headers {
        Headers {
            eth,
            vlan: None,
            arp: None,
            net: None,
            transport: None,
        }
    }

    /// Classify the frame at the link/network layer.
    #[must_use]
    pub fn link_and_network(&self) -> L3<'_> {
        match (&self.arp, &self.net) {
            (Some(arp), _) => L3::Arp(arp),
            (None, Some(Net::Ipv4(ip))) => L3::Ipv4(ip),
            (None, Some(Net::Ipv6(ip))) => L3::Ipv6(ip),
            (None, None) => L3::Other,
        }
    }

    /// Transport protocol and ports, or `None` if the transport is absent, unsupported, or does
    /// not belong to the network header's family (e.g. ICMPv6 inside IPv4).
    #[must_use]
    pub fn transport_info(&self) -> Option<L4Info> {
        let net = self.net.as_ref()?;
        let transport = self.transport.as_ref()?;
        let consistent = matches!(
            (net, transport),
            (_, Transport::Tcp(_) | Transport::Udp(_))
                | (Net::Ipv4(_), Transport::Icmp4(_))
                | (Net::Ipv6(_), Transport::Icmp6(_))
        );
        if !consistent {
            return None;
        }
        Some(L4Info {
            protocol: transport.protocol(),
            source_port: transport.source_port(),
            destination_port: transport.destination_port(),
        })
    }

    #[must_use]
    pub fn vid(&self) -> Option<Vid> {
        self.vlan.map(|v| v.vid())
    }

    /// Rewrite the link layer for transmission: new source and destination [`Mac`]. A tagged frame
    /// gets `vid`, or loses its tag when the outgoing side has none. Untagged frames stay so.
    pub fn set_link(&mut self, source: Mac, destination: Mac, vid: Option<Vid>) {
        self.eth.set_source(source).set_destination(destination);
        match (self.vlan.as_mut(), vid) {
            (Some(vlan), Some(vid)) => {
                vlan.set_vid(vid);
            }
            (Some(_), None) => self.vlan = None,
            (None, _) => {}
        }
    }
}
