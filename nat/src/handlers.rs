// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Collaborators the engine delegates to: ARP, DHCP, ICMP and packet capture.

use net::headers::Protocol;
use net::packet::Packet;

use crate::Direction;
use crate::side::Side;
use crate::tuple::Tuple;

/// Hooks called by the engine for the traffic it does not translate itself.
///
/// All methods have defaults that make the engine a plain translator: ARP is dropped, DHCP is
/// never consumed, ICMP is translated like any other protocol, and nothing is captured. Handlers
/// run on the packet path, concurrently, and must not block.
pub trait PacketHandlers: Send + Sync {
    /// Handle an ARP frame received on `side`. The returned direction is final.
    fn handle_arp(&self, _side: &Side, _packet: &mut Packet) -> Direction {
        Direction::Drop
    }

    /// Offer a UDP/IPv4 packet received on `side` to the DHCP client. Returns true if consumed.
    fn handle_dhcp(&self, _side: &Side, _packet: &mut Packet) -> bool {
        false
    }

    /// Offer a UDP/IPv6 packet received on `side` to the DHCPv6 client. Returns true if consumed.
    fn handle_dhcpv6(&self, _side: &Side, _packet: &mut Packet) -> bool {
        false
    }

    /// Offer an ICMP packet received on `side`, with the tuple it will be looked up with.
    /// `None` lets the engine translate it; anything else is final. The handler may rewrite the
    /// packet.
    fn handle_icmp(
        &self,
        _side: &Side,
        _protocol: Protocol,
        _packet: &mut Packet,
        _key: &Tuple,
    ) -> Option<Direction> {
        None
    }

    /// Observe every packet after its fate is decided.
    fn dump_packet(&self, _side: &Side, _packet: &Packet, _direction: Direction) {}
}

/// No collaborators at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHandlers;

impl PacketHandlers for NoHandlers {}
