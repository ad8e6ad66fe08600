// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Address/port tuples, the keys and values of the translation tables.

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::V4, Family::V6];

    /// Dense index, for per-family arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Family::V4 => 0,
            Family::V6 => 1,
        }
    }

    #[must_use]
    pub fn of(addr: IpAddr) -> Family {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// One endpoint of a translated flow.
///
/// A tuple whose address is unspecified (all zeros) is a reservation: the port is taken, but
/// traffic for it goes to the host stack rather than to a private endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tuple {
    V4 { addr: Ipv4Addr, port: u16 },
    V6 { addr: Ipv6Addr, port: u16 },
}

impl Tuple {
    #[must_use]
    pub fn new(addr: IpAddr, port: u16) -> Tuple {
        match addr {
            IpAddr::V4(addr) => Tuple::V4 { addr, port },
            IpAddr::V6(addr) => Tuple::V6 { addr, port },
        }
    }

    #[must_use]
    pub fn addr(&self) -> IpAddr {
        match *self {
            Tuple::V4 { addr, .. } => IpAddr::V4(addr),
            Tuple::V6 { addr, .. } => IpAddr::V6(addr),
        }
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        match *self {
            Tuple::V4 { port, .. } | Tuple::V6 { port, .. } => port,
        }
    }

    #[must_use]
    pub fn family(&self) -> Family {
        match self {
            Tuple::V4 { .. } => Family::V4,
            Tuple::V6 { .. } => Family::V6,
        }
    }

    /// True for a reservation (unspecified address).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Tuple::V4 { addr, .. } => addr.is_unspecified(),
            Tuple::V6 { addr, .. } => addr.is_unspecified(),
        }
    }
}

impl From<SocketAddr> for Tuple {
    fn from(value: SocketAddr) -> Self {
        Tuple::new(value.ip(), value.port())
    }
}

impl From<Tuple> for SocketAddr {
    fn from(value: Tuple) -> Self {
        SocketAddr::new(value.addr(), value.port())
    }
}

impl Display for Tuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        SocketAddr::from(*self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinel() {
        assert!(Tuple::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 80).is_zero());
        assert!(Tuple::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0).is_zero());
        assert!(!Tuple::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 0).is_zero());
    }

    #[test]
    fn display() {
        let t: Tuple = "10.0.0.5:40000".parse::<SocketAddr>().unwrap().into();
        assert_eq!(t.to_string(), "10.0.0.5:40000");
        assert_eq!(t.family(), Family::V4);
        let t: Tuple = "[2001:db8::1]:443".parse::<SocketAddr>().unwrap().into();
        assert_eq!(t.to_string(), "[2001:db8::1]:443");
        assert_eq!(t.family(), Family::V6);
    }
}
