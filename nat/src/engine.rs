// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The two per-packet procedures: public to private (ingress) and private to public (egress).

use net::eth::mac::Mac;
use net::headers::{Headers, L3, Protocol, Transport};
use net::ip::NextHeader;
use net::packet::Packet;
use net::tcp::TcpFlags;
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::Direction;
use crate::errors::{ErrorKind, NatError};
use crate::handlers::PacketHandlers;
use crate::pair::{Freshness, PortPair};
use crate::portmap::Crossing;
use crate::side::{Side, SideKind};
use crate::tuple::{Family, Tuple};

/// What the engine needs to know about an IP packet.
#[derive(Debug, Clone, Copy)]
struct Flow {
    protocol: Protocol,
    family: Family,
    source: Tuple,
    destination: Tuple,
    tcp_flags: Option<TcpFlags>,
    /// False for ICMP messages without an identifier, which have no port to rewrite
    identified: bool,
}

enum Frame {
    Arp,
    Ip(Flow),
}

fn classify(headers: &Headers) -> Result<Frame, NatError> {
    let net = match headers.link_and_network() {
        L3::Arp(_) => return Ok(Frame::Arp),
        L3::Other => return Err(NatError::NotIp),
        L3::Ipv4(_) | L3::Ipv6(_) => headers.net.as_ref().ok_or(NatError::NotIp)?,
    };
    let Some(l4) = headers.transport_info() else {
        let next_header = net.next_header();
        let translated = [
            NextHeader::TCP,
            NextHeader::UDP,
            NextHeader::ICMP,
            NextHeader::ICMP6,
        ];
        if headers.transport.is_none() && !translated.contains(&next_header) {
            return Err(NatError::UnsupportedProtocol(next_header));
        }
        return Err(NatError::MissingHeader("transport"));
    };
    let (tcp_flags, identified) = match &headers.transport {
        Some(Transport::Tcp(tcp)) => (Some(tcp.flags()), true),
        Some(Transport::Icmp4(icmp)) => (None, icmp.identifier().is_some()),
        Some(Transport::Icmp6(icmp)) => (None, icmp.identifier().is_some()),
        _ => (None, true),
    };
    Ok(Frame::Ip(Flow {
        protocol: l4.protocol,
        family: Family::of(net.source()),
        source: Tuple::new(net.source(), l4.source_port),
        destination: Tuple::new(net.destination(), l4.destination_port),
        tcp_flags,
        identified,
    }))
}

/// Give the ICMP and DHCP handlers a chance at the packet before translation.
fn offer<H: PacketHandlers + ?Sized>(
    handlers: &H,
    side: &Side,
    flow: &Flow,
    packet: &mut Packet,
    key: &Tuple,
) -> Option<Direction> {
    match flow.protocol {
        Protocol::Icmp => handlers.handle_icmp(side, flow.protocol, packet, key),
        Protocol::Udp => {
            let consumed = match flow.family {
                Family::V4 => handlers.handle_dhcp(side, packet),
                Family::V6 => handlers.handle_dhcpv6(side, packet),
            };
            consumed.then_some(Direction::Drop)
        }
        Protocol::Tcp => None,
    }
}

/// Which address/port pair of the packet gets translated.
#[derive(Debug, Clone, Copy)]
enum Rewrite {
    Source,
    Destination,
}

/// Rewrite the packet for transmission on `out` to the neighbor `next_hop`.
fn rewrite(
    packet: &mut Packet,
    out: &Side,
    next_hop: Mac,
    field: Rewrite,
    to: Tuple,
) -> Result<(), NatError> {
    let headers = packet.headers_mut();
    headers.set_link(out.mac(), next_hop, out.vid());
    let net = headers.net.as_mut().ok_or(NatError::MissingHeader("IP"))?;
    let transport = headers
        .transport
        .as_mut()
        .ok_or(NatError::MissingHeader("transport"))?;
    match field {
        Rewrite::Source => {
            net.try_set_source(to.addr())?;
            transport.try_set_source(to.port())?;
        }
        Rewrite::Destination => {
            net.try_set_destination(to.addr())?;
            transport.try_set_destination(to.port())?;
        }
    }
    Ok(())
}

/// No mapping: only the host stack may take unsolicited traffic.
fn unsolicited(side: &Side, flow: &Flow, key: Tuple) -> Result<Direction, NatError> {
    if side.can_redirect_to_host(flow.family) {
        Ok(Direction::RedirectToHost)
    } else {
        Err(NatError::NoMapping(key))
    }
}

/// Refresh the slot of public port `port` after an ingress table hit.
fn freshness(pair: &PortPair, flow: &Flow, port: u16, now: Instant) -> Freshness {
    pair.entry(flow.family, flow.protocol, port)
        .map_or(Freshness::Gone, |slot| pair.refresh(slot, now))
}

fn expire(pair: &PortPair, flow: &Flow, port: u16, now: Instant) -> NatError {
    pair.expire_if_idle(flow.protocol, flow.family, port, now);
    NatError::Expired {
        protocol: flow.protocol,
        port,
    }
}

fn ingress<H: PacketHandlers + ?Sized>(
    pair: &PortPair,
    handlers: &H,
    packet: &mut Packet,
    now: Instant,
) -> Result<Direction, NatError> {
    let side = pair.public();
    let flow = match classify(packet.headers())? {
        Frame::Arp => return Ok(handlers.handle_arp(side, packet)),
        Frame::Ip(flow) => flow,
    };
    let key = flow.destination;
    if let Some(direction) = offer(handlers, side, &flow, packet, &key) {
        return Ok(direction);
    }

    let hit = side
        .table(flow.protocol)
        .lookup(&key)
        .map(|private| (private, freshness(pair, &flow, key.port(), now)));
    let private = match hit {
        Some((private, Freshness::Live)) => private,
        Some((_, Freshness::Expired)) => return Err(expire(pair, &flow, key.port(), now)),
        None | Some((_, Freshness::Gone)) => {
            side.neighbors().learn(flow.source.addr(), packet.headers().eth.source());
            return unsolicited(side, &flow, key);
        }
    };
    if private.is_zero() {
        return Ok(Direction::RedirectToHost);
    }
    if let Some(flags) = flow.tcp_flags {
        pair.track_tcp(flow.family, key.port(), Crossing::PublicToPrivate, flags, now);
    }

    let out = pair.opposite(side);
    let next_hop = out
        .neighbors()
        .resolve(private.addr())
        .ok_or(NatError::NoNeighbor(private.addr()))?;
    rewrite(packet, out, next_hop, Rewrite::Destination, private)?;
    trace!("{} {key} -> {private}", flow.protocol);
    Ok(Direction::Forward)
}

fn egress<H: PacketHandlers + ?Sized>(
    pair: &PortPair,
    handlers: &H,
    packet: &mut Packet,
    now: Instant,
) -> Result<Direction, NatError> {
    let side = pair.private();
    let flow = match classify(packet.headers())? {
        Frame::Arp => return Ok(handlers.handle_arp(side, packet)),
        Frame::Ip(flow) => flow,
    };
    let key = flow.source;
    if let Some(direction) = offer(handlers, side, &flow, packet, &key) {
        return Ok(direction);
    }
    if side.can_redirect_to_host(flow.family) && side.is_own_address(flow.destination.addr()) {
        return Ok(Direction::RedirectToHost);
    }
    if !flow.identified {
        return Err(NatError::MissingHeader("ICMP identifier"));
    }

    // outbound traffic keeps its mapping alive, idle or not; the canonical slot is the public one
    let hit = side.table(flow.protocol).lookup(&key).filter(|public| {
        pair.entry(flow.family, flow.protocol, public.port())
            .is_some_and(|slot| pair.revive(slot, now))
    });
    let public = if let Some(public) = hit {
        public
    } else {
        side.neighbors().learn(key.addr(), packet.headers().eth.source());
        for kind in [SideKind::Private, SideKind::Public] {
            if !pair.side(kind).acquired(flow.family) {
                return Err(NatError::NotAcquired(kind, flow.family));
            }
        }
        pair.allocate(flow.protocol, key, now)?
    };
    if let Some(flags) = flow.tcp_flags {
        pair.track_tcp(flow.family, public.port(), Crossing::PrivateToPublic, flags, now);
    }

    let out = pair.opposite(side);
    let destination = flow.destination.addr();
    let next_hop = out
        .neighbors()
        .resolve(destination)
        .ok_or(NatError::NoNeighbor(destination))?;
    rewrite(packet, out, next_hop, Rewrite::Source, public)?;
    trace!("{} {key} -> {public}", flow.protocol);
    Ok(Direction::Forward)
}

fn report(pair: &PortPair, from: SideKind, error: &NatError) -> Direction {
    match error.kind() {
        ErrorKind::ResourceExhausted => {
            warn!("Port pair '{}': {error}, dropping packet from {from} side", pair.name());
        }
        ErrorKind::PolicyDrop | ErrorKind::Malformed => {
            debug!("Port pair '{}': dropping packet from {from} side: {error}", pair.name());
        }
    }
    Direction::Drop
}

/// Translate a packet received on the public side of `pair`.
pub fn public_to_private<H: PacketHandlers + ?Sized>(
    pair: &PortPair,
    handlers: &H,
    packet: &mut Packet,
    now: Instant,
) -> Direction {
    let direction = ingress(pair, handlers, packet, now)
        .unwrap_or_else(|e| report(pair, SideKind::Public, &e));
    pair.counters().record(direction);
    handlers.dump_packet(pair.public(), packet, direction);
    direction
}

/// Translate a packet received on the private side of `pair`.
pub fn private_to_public<H: PacketHandlers + ?Sized>(
    pair: &PortPair,
    handlers: &H,
    packet: &mut Packet,
    now: Instant,
) -> Direction {
    let direction = egress(pair, handlers, packet, now)
        .unwrap_or_else(|e| report(pair, SideKind::Private, &e));
    pair.counters().record(direction);
    handlers.dump_packet(pair.private(), packet, direction);
    direction
}
