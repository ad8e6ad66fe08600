// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![forbid(unsafe_code)] // Validation logic should always be strictly safe
#![deny(clippy::all, clippy::pedantic)]

//! Parsed packet model consumed by the translation engine.
//!
//! Nothing in this crate reads or writes wire bytes: frames arrive here already decoded into
//! [`headers::Headers`], and the translation engine only reads and rewrites the decoded fields.

pub mod arp;
pub mod eth;
pub mod headers;
pub mod icmp;
pub mod ip;
pub mod ipv4;
pub mod ipv6;
pub mod packet;
pub mod tcp;
pub mod udp;
pub mod vlan;
