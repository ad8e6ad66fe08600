// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! UDP header.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Udp {
    source: u16,
    destination: u16,
}

impl Udp {
    /// Well-known DHCP server port
    pub const DHCP_SERVER: u16 = 67;
    /// Well-known DHCP client port
    pub const DHCP_CLIENT: u16 = 68;
    /// Well-known DHCPv6 client port
    pub const DHCPV6_CLIENT: u16 = 546;
    /// Well-known DHCPv6 server port
    pub const DHCPV6_SERVER: u16 = 547;

    #[must_use]
    pub fn new(source: u16, destination: u16) -> Udp {
        Udp {
            source,
            destination,
        }
    }

    #[must_use]
    pub fn source(&self) -> u16 {
        self.source
    }

    #[must_use]
    pub fn destination(&self) -> u16 {
        self.destination
    }

    pub fn set_source(&mut self, port: u16) -> &mut Self {
        self.source = port;
        self
    }

    pub fn set_destination(&mut self, port: u16) -> &mut Self {
        self.destination = port;
        self
    }
}
