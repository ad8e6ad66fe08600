// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration of one attachment point (the public or the private side of a port pair).

use ipnet::{Ipv4Net, Ipv6Net};
use net::eth::mac::Mac;
use net::vlan::Vid;
use serde::{Deserialize, Serialize};

/// How the side obtains its IPv4 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AddressConfig4 {
    /// Fixed address, usable from startup
    Static { address: Ipv4Net },
    /// Learned at runtime by the DHCP client
    Dhcp,
}

/// How the side obtains its IPv6 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AddressConfig6 {
    /// Fixed address, usable from startup
    Static { address: Ipv6Net },
    /// Learned at runtime by the DHCPv6 client
    Dhcp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideConfig {
    pub mac: Mac,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<Vid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<AddressConfig4>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<AddressConfig6>,
    /// Host-stack interface receiving traffic addressed to the translator itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_redirect: Option<String>,
}

impl SideConfig {
    #[must_use]
    pub fn new(mac: Mac) -> Self {
        Self {
            mac,
            vlan: None,
            ipv4: None,
            ipv6: None,
            host_redirect: None,
        }
    }

    #[must_use]
    pub fn with_vlan(mut self, vid: Vid) -> Self {
        self.vlan = Some(vid);
        self
    }

    #[must_use]
    pub fn with_ipv4(mut self, address: AddressConfig4) -> Self {
        self.ipv4 = Some(address);
        self
    }

    #[must_use]
    pub fn with_ipv6(mut self, address: AddressConfig6) -> Self {
        self.ipv6 = Some(address);
        self
    }

    #[must_use]
    pub fn with_host_redirect(mut self, ifname: &str) -> Self {
        self.host_redirect = Some(ifname.to_string());
        self
    }

    #[must_use]
    pub fn static_ipv4(&self) -> Option<Ipv4Net> {
        match self.ipv4 {
            Some(AddressConfig4::Static { address }) => Some(address),
            _ => None,
        }
    }

    #[must_use]
    pub fn static_ipv6(&self) -> Option<Ipv6Net> {
        match self.ipv6 {
            Some(AddressConfig6::Static { address }) => Some(address),
            _ => None,
        }
    }
}
