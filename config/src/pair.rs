// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per port-pair configuration: the two sides, the timers and the port pools.

use derive_builder::Builder;
use net::headers::Protocol;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use crate::pools::PortPools;
use crate::side::SideConfig;
use crate::{ConfigError, ConfigResult};

/// A permanent translation installed at startup. It never expires and is never torn down by TCP
/// termination tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaticMapping {
    pub protocol: Protocol,
    pub public_port: u16,
    /// Private endpoint. An unspecified address (`0.0.0.0` / `::`) reserves the public port for
    /// the host stack.
    pub private: SocketAddr,
}

impl StaticMapping {
    #[must_use]
    pub fn new(protocol: Protocol, public_port: u16, private: SocketAddr) -> Self {
        Self {
            protocol,
            public_port,
            private,
        }
    }

    #[must_use]
    pub fn redirects_to_host(&self) -> bool {
        self.private.ip().is_unspecified()
    }
}

#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct PortPairConfig {
    pub name: String,
    pub public: SideConfig,
    pub private: SideConfig,
    /// Idle time after which a dynamic mapping is reclaimed.
    #[serde(default = "default_connection_timeout", with = "duration_secs")]
    #[builder(default = "PortPairConfig::DEFAULT_CONNECTION_TIMEOUT")]
    pub connection_timeout: Duration,
    /// Quarantine of a port after a graceful TCP close.
    #[serde(default = "default_reuse_hold_down", with = "duration_secs")]
    #[builder(default = "PortPairConfig::DEFAULT_REUSE_HOLD_DOWN")]
    pub reuse_hold_down: Duration,
    #[serde(default)]
    #[builder(default)]
    pub pools: PortPools,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(each(name = "static_mapping")))]
    pub static_mappings: Vec<StaticMapping>,
}

fn default_connection_timeout() -> Duration {
    PortPairConfig::DEFAULT_CONNECTION_TIMEOUT
}

fn default_reuse_hold_down() -> Duration {
    PortPairConfig::DEFAULT_REUSE_HOLD_DOWN
}

impl PortPairConfig {
    pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_REUSE_HOLD_DOWN: Duration = Duration::from_secs(1);

    pub fn validate(&self) -> ConfigResult {
        if self.connection_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout(self.name.clone()));
        }
        self.pools.validate()?;

        let mut seen = HashSet::new();
        let mut endpoints = HashSet::new();
        for mapping in &self.static_mappings {
            let range = self.pools.get(mapping.protocol);
            if !range.contains(mapping.public_port) {
                return Err(ConfigError::StaticMappingOutOfPool(
                    self.name.clone(),
                    mapping.protocol,
                    mapping.public_port,
                    range.start,
                    range.end,
                ));
            }
            let has_address = match mapping.private {
                SocketAddr::V4(_) => self.public.static_ipv4().is_some(),
                SocketAddr::V6(_) => self.public.static_ipv6().is_some(),
            };
            if !has_address {
                return Err(ConfigError::StaticMappingWithoutAddress(
                    self.name.clone(),
                    mapping.private,
                ));
            }
            if !seen.insert((mapping.protocol, mapping.private.is_ipv4(), mapping.public_port)) {
                return Err(ConfigError::DuplicateStaticMapping(
                    self.name.clone(),
                    mapping.protocol,
                    mapping.public_port,
                ));
            }
            let endpoint = (mapping.protocol, mapping.private);
            if !mapping.redirects_to_host() && !endpoints.insert(endpoint) {
                return Err(ConfigError::DuplicateStaticEndpoint(
                    self.name.clone(),
                    mapping.protocol,
                    mapping.private,
                ));
            }
        }
        Ok(())
    }
}

/// Durations as a whole number of seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
