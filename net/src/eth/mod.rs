// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ethernet header type and logic.

pub mod mac;

use mac::Mac;

/// An [`EtherType`](https://en.wikipedia.org/wiki/EtherType).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EthType(pub u16);

impl EthType {
    /// Internet protocol version 4
    pub const IPV4: EthType = EthType(0x0800);
    /// Address resolution protocol
    pub const ARP: EthType = EthType(0x0806);
    /// IEEE 802.1Q VLAN tag
    pub const VLAN: EthType = EthType(0x8100);
    /// Internet protocol version 6
    pub const IPV6: EthType = EthType(0x86DD);
}

/// An ethernet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eth {
    source: Mac,
    destination: Mac,
    ethtype: EthType,
}

impl Eth {
    /// Create a new ethernet header.
    #[must_use]
    pub fn new(source: Mac, destination: Mac, ethtype: EthType) -> Eth {
        Eth {
            source,
            destination,
            ethtype,
        }
    }

    /// Source [`Mac`] of the frame.
    #[must_use]
    pub fn source(&self) -> Mac {
        self.source
    }

    /// Destination [`Mac`] of the frame.
    #[must_use]
    pub fn destination(&self) -> Mac {
        self.destination
    }

    /// The [`EthType`] of the payload following this header (or following the VLAN tag).
    #[must_use]
    pub fn ethtype(&self) -> EthType {
        self.ethtype
    }

    pub fn set_source(&mut self, source: Mac) -> &mut Self {
        self.source = source;
        self
    }

    pub fn set_destination(&mut self, destination: Mac) -> &mut Self {
        self.destination = destination;
        self
    }
}
