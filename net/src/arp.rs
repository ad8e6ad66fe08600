// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Address resolution protocol (IPv4 over ethernet only).

use crate::eth::mac::Mac;
use std::net::Ipv4Addr;

/// ARP operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    Request,
    Reply,
}

/// A decoded ARP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arp {
    pub operation: ArpOperation,
    pub sender_mac: Mac,
    pub sender_ip: Ipv4Addr,
    pub target_mac: Mac,
    pub target_ip: Ipv4Addr,
}

impl Arp {
    /// Who-has `target_ip`, tell `sender_ip`.
    #[must_use]
    pub fn request(sender_mac: Mac, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Arp {
        Arp {
            operation: ArpOperation::Request,
            sender_mac,
            sender_ip,
            target_mac: Mac::ZERO,
            target_ip,
        }
    }
}
