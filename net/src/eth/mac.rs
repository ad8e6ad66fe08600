// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ethernet hardware addresses.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// A 48-bit Ethernet address, in transmission order.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mac(pub [u8; 6]);

impl From<[u8; 6]> for Mac {
    fn from(octets: [u8; 6]) -> Self {
        Mac(octets)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a colon separated MAC address")]
pub struct MacFromStringError(String);

impl FromStr for Mac {
    type Err = MacFromStringError;

    /// Parse the `aa:bb:cc:dd:ee:ff` form, in either case.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || MacFromStringError(text.to_owned());
        let mut parts = text.split(':');
        let mut mac = Mac::ZERO;
        for octet in &mut mac.0 {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        match parts.next() {
            None => Ok(mac),
            Some(_) => Err(invalid()),
        }
    }
}

impl TryFrom<&str> for Mac {
    type Error = MacFromStringError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl Mac {
    pub const BROADCAST: Mac = Mac([0xff; 6]);
    /// Never a valid source or destination on the wire.
    pub const ZERO: Mac = Mac([0; 6]);

    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Mac::BROADCAST
    }

    /// Group bit set (broadcast included).
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 1 != 0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Mac::ZERO
    }

    /// Modified EUI-64 interface identifier (RFC 4291, appendix A).
    #[must_use]
    pub fn eui64(&self) -> [u8; 8] {
        let m = self.0;
        [m[0] ^ 0x02, m[1], m[2], 0xff, 0xfe, m[3], m[4], m[5]]
    }

    /// The `fe80::/64` address an interface with this address auto-configures.
    #[must_use]
    pub fn link_local_ipv6(&self) -> Ipv6Addr {
        let mut octets = [0u8; 16];
        octets[..2].copy_from_slice(&[0xfe, 0x80]);
        octets[8..].copy_from_slice(&self.eui64());
        Ipv6Addr::from(octets)
    }
}

impl Display for Mac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for Mac {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Mac {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
