// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model for the translator: one [`PortPairConfig`] per public/private attachment
//! pair, loaded from YAML and validated before any translation state is built from it.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

pub mod errors;
pub mod natconfig;
pub mod pair;
pub mod pools;
pub mod side;

pub use errors::{ConfigError, ConfigResult}; // re-export
pub use natconfig::NatConfig; // re-export
pub use pair::{PortPairConfig, PortPairConfigBuilder, StaticMapping}; // re-export
pub use pools::{PortPools, PortRange}; // re-export
pub use side::{AddressConfig4, AddressConfig6, SideConfig}; // re-export
