// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Frame builders for tests.

use crate::arp::Arp;
use crate::eth::mac::Mac;
use crate::eth::{Eth, EthType};
use crate::headers::{Headers, Net, Transport};
use crate::icmp::{Icmp4, Icmp6};
use crate::ip::NextHeader;
use crate::ipv4::Ipv4;
use crate::ipv6::Ipv6;
use crate::packet::Packet;
use crate::tcp::{Tcp, TcpFlags};
use crate::udp::Udp;
use crate::vlan::{Vid, Vlan};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const TEST_SRC_MAC: Mac = Mac([0x02, 0, 0, 0, 0, 0x01]);
pub const TEST_DST_MAC: Mac = Mac([0x02, 0, 0, 0, 0, 0x02]);

fn build_ip_frame(src: IpAddr, dst: IpAddr, transport: Transport) -> Packet {
    let (ethtype, net) = match (src, dst) {
        (IpAddr::V4(src), IpAddr::V4(dst)) => {
            let proto = match transport {
                Transport::Tcp(_) => NextHeader::TCP,
                Transport::Udp(_) => NextHeader::UDP,
                Transport::Icmp4(_) | Transport::Icmp6(_) => NextHeader::ICMP,
            };
            (EthType::IPV4, Net::Ipv4(Ipv4::new(src, dst, proto)))
        }
        (IpAddr::V6(src), IpAddr::V6(dst)) => {
            let proto = match transport {
                Transport::Tcp(_) => NextHeader::TCP,
                Transport::Udp(_) => NextHeader::UDP,
                Transport::Icmp4(_) | Transport::Icmp6(_) => NextHeader::ICMP6,
            };
            (EthType::IPV6, Net::Ipv6(Ipv6::new(src, dst, proto)))
        }
        _ => unreachable!("mixed address families in test frame"),
    };
    let mut headers = Headers::new(Eth::new(TEST_SRC_MAC, TEST_DST_MAC, ethtype));
    headers.net = Some(net);
    headers.transport = Some(transport);
    Packet::new(headers, vec![0xaa; 16])
}

#[must_use]
pub fn build_test_tcp_frame(src: SocketAddr, dst: SocketAddr, flags: TcpFlags) -> Packet {
    let tcp = Tcp::new(src.port(), dst.port(), flags);
    build_ip_frame(src.ip(), dst.ip(), Transport::Tcp(tcp))
}

#[must_use]
pub fn build_test_udp_frame(src: SocketAddr, dst: SocketAddr) -> Packet {
    let udp = Udp::new(src.port(), dst.port());
    build_ip_frame(src.ip(), dst.ip(), Transport::Udp(udp))
}

/// An echo request (or reply) with the given identifier.
#[must_use]
pub fn build_test_icmp_echo(src: IpAddr, dst: IpAddr, identifier: u16, reply: bool) -> Packet {
    let transport = match (src, reply) {
        (IpAddr::V4(_), false) => Transport::Icmp4(Icmp4::echo_request(identifier)),
        (IpAddr::V4(_), true) => Transport::Icmp4(Icmp4::echo_reply(identifier)),
        (IpAddr::V6(_), false) => Transport::Icmp6(Icmp6::echo_request(identifier)),
        (IpAddr::V6(_), true) => Transport::Icmp6(Icmp6::echo_reply(identifier)),
    };
    build_ip_frame(src, dst, transport)
}

/// An IP frame whose transport is not one we decode (`protocol` is copied into the IP header).
#[must_use]
pub fn build_test_unsupported_frame(src: IpAddr, dst: IpAddr, protocol: NextHeader) -> Packet {
    let (ethtype, net) = match (src, dst) {
        (IpAddr::V4(src), IpAddr::V4(dst)) => {
            (EthType::IPV4, Net::Ipv4(Ipv4::new(src, dst, protocol)))
        }
        (IpAddr::V6(src), IpAddr::V6(dst)) => {
            (EthType::IPV6, Net::Ipv6(Ipv6::new(src, dst, protocol)))
        }
        _ => unreachable!("mixed address families in test frame"),
    };
    let mut headers = Headers::new(Eth::new(TEST_SRC_MAC, TEST_DST_MAC, ethtype));
    headers.net = Some(net);
    Packet::new(headers, vec![])
}

#[must_use]
pub fn build_test_arp_request(sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Packet {
    let mut headers = Headers::new(Eth::new(TEST_SRC_MAC, Mac::BROADCAST, EthType::ARP));
    headers.arp = Some(Arp::request(TEST_SRC_MAC, sender_ip, target_ip));
    Packet::new(headers, vec![])
}

/// A frame with an ethertype we do not handle.
#[must_use]
pub fn build_test_non_ip_frame() -> Packet {
    let headers = Headers::new(Eth::new(TEST_SRC_MAC, TEST_DST_MAC, EthType(0x88cc)));
    Packet::new(headers, vec![0; 46])
}

/// Override the link layer of a test frame.
#[must_use]
pub fn with_link(mut packet: Packet, source: Mac, destination: Mac) -> Packet {
    packet.headers_mut().set_link(source, destination, None);
    packet
}

/// Tag a test frame.
///
/// # Panics
///
/// Panics if `vid` is not a legal VLAN id.
#[must_use]
pub fn with_vlan(mut packet: Packet, vid: u16) -> Packet {
    packet.headers_mut().vlan = Some(Vlan::new(Vid::new(vid).unwrap()));
    packet
}
