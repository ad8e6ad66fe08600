// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv6 header.

use crate::ip::NextHeader;
use std::net::Ipv6Addr;

/// A decoded IPv6 header. `next_header` is the upper-layer protocol, extension headers having
/// been walked by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6 {
    source: Ipv6Addr,
    destination: Ipv6Addr,
    next_header: NextHeader,
    hop_limit: u8,
}

impl Ipv6 {
    pub const DEFAULT_HOP_LIMIT: u8 = 64;

    #[must_use]
    pub fn new(source: Ipv6Addr, destination: Ipv6Addr, next_header: NextHeader) -> Ipv6 {
        Ipv6 {
            source,
            destination,
            next_header,
            hop_limit: Self::DEFAULT_HOP_LIMIT,
        }
    }

    #[must_use]
    pub fn source(&self) -> Ipv6Addr {
        self.source
    }

    #[must_use]
    pub fn destination(&self) -> Ipv6Addr {
        self.destination
    }

    #[must_use]
    pub fn next_header(&self) -> NextHeader {
        self.next_header
    }

    #[must_use]
    pub fn hop_limit(&self) -> u8 {
        self.hop_limit
    }

    pub fn set_source(&mut self, source: Ipv6Addr) -> &mut Self {
        self.source = source;
        self
    }

    pub fn set_destination(&mut self, destination: Ipv6Addr) -> &mut Self {
        self.destination = destination;
        self
    }
}
