// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Top-level configuration: the set of port pairs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::pair::PortPairConfig;
use crate::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatConfig {
    #[serde(default)]
    pub pairs: Vec<PortPairConfig>,
}

impl NatConfig {
    /// Parse a YAML document. The result is not validated.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult {
        let mut names = HashSet::new();
        for pair in &self.pairs {
            if !names.insert(pair.name.as_str()) {
                return Err(ConfigError::DuplicatePairName(pair.name.clone()));
            }
            pair.validate()?;
        }
        debug!("Validated configuration with {} port pair(s)", self.pairs.len());
        Ok(())
    }
}
