// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type for configuration / validation failures

use net::headers::Protocol;
use std::net::SocketAddr;
use thiserror::Error;

use crate::pair::PortPairConfigBuilderError;

/// The reasons why we may reject a configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("A port pair with name '{0}' already exists")]
    DuplicatePairName(String),
    #[error("Invalid {0} port range [{1}, {2})")]
    InvalidPortRange(Protocol, u16, u16),
    #[error("Port pair '{0}': connection timeout must not be zero")]
    ZeroTimeout(String),
    #[error("Port pair '{0}': {1} port {2} is mapped more than once")]
    DuplicateStaticMapping(String, Protocol, u16),
    #[error("Port pair '{0}': {1} endpoint {2} is the target of more than one static mapping")]
    DuplicateStaticEndpoint(String, Protocol, SocketAddr),
    #[error("Port pair '{0}': static {1} port {2} is outside of the pool [{3}, {4})")]
    StaticMappingOutOfPool(String, Protocol, u16, u16, u16),
    #[error("Port pair '{0}': static mapping to {1} needs a static public address of that family")]
    StaticMappingWithoutAddress(String, SocketAddr),
    #[error("Missing mandatory parameter: {0}")]
    MissingParameter(String),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Result-like type for configurations
pub type ConfigResult = Result<(), ConfigError>;

impl From<PortPairConfigBuilderError> for ConfigError {
    fn from(e: PortPairConfigBuilderError) -> Self {
        ConfigError::MissingParameter(e.to_string())
    }
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
