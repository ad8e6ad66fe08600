// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 header.

use crate::ip::NextHeader;
use std::net::Ipv4Addr;

/// A decoded IPv4 header (options and checksum are left to the codec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4 {
    source: Ipv4Addr,
    destination: Ipv4Addr,
    protocol: NextHeader,
    ttl: u8,
}

impl Ipv4 {
    pub const DEFAULT_TTL: u8 = 64;

    #[must_use]
    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, protocol: NextHeader) -> Ipv4 {
        Ipv4 {
            source,
            destination,
            protocol,
            ttl: Self::DEFAULT_TTL,
        }
    }

    #[must_use]
    pub fn source(&self) -> Ipv4Addr {
        self.source
    }

    #[must_use]
    pub fn destination(&self) -> Ipv4Addr {
        self.destination
    }

    #[must_use]
    pub fn protocol(&self) -> NextHeader {
        self.protocol
    }

    #[must_use]
    pub fn ttl(&self) -> u8 {
        self.ttl
    }

    pub fn set_source(&mut self, source: Ipv4Addr) -> &mut Self {
        self.source = source;
        self
    }

    pub fn set_destination(&mut self, destination: Ipv4Addr) -> &mut Self {
        self.destination = destination;
        self
    }
}
