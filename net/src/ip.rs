// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IP protocol numbers.

use std::fmt::Display;

/// The protocol number carried in the IPv4 `protocol` / IPv6 `next header` field.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NextHeader(pub u8);

impl NextHeader {
    pub const ICMP: NextHeader = NextHeader(1);
    pub const TCP: NextHeader = NextHeader(6);
    pub const UDP: NextHeader = NextHeader(17);
    pub const ICMP6: NextHeader = NextHeader(58);

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl Display for NextHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            NextHeader::ICMP => write!(f, "icmp"),
            NextHeader::TCP => write!(f, "tcp"),
            NextHeader::UDP => write!(f, "udp"),
            NextHeader::ICMP6 => write!(f, "icmp6"),
            NextHeader(other) => write!(f, "proto-{other}"),
        }
    }
}
