// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Port pools: the public port numbers handed out to translated flows.

use crate::{ConfigError, ConfigResult};
use net::headers::Protocol;
use serde::{Deserialize, Serialize};

/// A half-open range of ports, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub const DEFAULT_START: u16 = 1024;
    pub const DEFAULT_END: u16 = 65500;

    #[must_use]
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, port: u16) -> bool {
        (self.start..self.end).contains(&port)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.end.saturating_sub(self.start))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self, protocol: Protocol) -> ConfigResult {
        if self.start == 0 || self.start >= self.end {
            return Err(ConfigError::InvalidPortRange(protocol, self.start, self.end));
        }
        Ok(())
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::new(Self::DEFAULT_START, Self::DEFAULT_END)
    }
}

/// One pool per translated protocol. Each pool is used independently for IPv4 and IPv6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortPools {
    pub tcp: PortRange,
    pub udp: PortRange,
    pub icmp: PortRange,
}

impl PortPools {
    #[must_use]
    pub fn get(&self, protocol: Protocol) -> PortRange {
        match protocol {
            Protocol::Tcp => self.tcp,
            Protocol::Udp => self.udp,
            Protocol::Icmp => self.icmp,
        }
    }

    pub fn validate(&self) -> ConfigResult {
        Protocol::ALL
            .iter()
            .try_for_each(|proto| self.get(*proto).validate(*proto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range() {
        let range = PortRange::default();
        assert!(range.contains(1024));
        assert!(range.contains(65499));
        assert!(!range.contains(65500));
        assert!(!range.contains(1023));
        assert_eq!(range.len(), 64476);
    }

    #[test]
    fn bad_ranges() {
        assert_eq!(
            PortRange::new(0, 10).validate(Protocol::Udp),
            Err(ConfigError::InvalidPortRange(Protocol::Udp, 0, 10))
        );
        assert!(PortRange::new(2000, 2000).validate(Protocol::Tcp).is_err());
        assert!(PortRange::new(2000, 1000).validate(Protocol::Tcp).is_err());
        assert!(PortRange::new(2000, 2001).validate(Protocol::Tcp).is_ok());
    }
}
