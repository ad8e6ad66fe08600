// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]
#![allow(clippy::must_use_candidate)]

//! Stateful dual-stack network address and port translation.
//!
//! A [`PortPair`] joins a public and a private attachment point. Traffic leaving the private side
//! creates mappings from private tuples to ports of the public address; traffic arriving on the
//! public side is only let through if it matches an existing mapping, or handed to the host stack
//! when the pair has one.
//!
//! # Example
//!
//! ```
//! # use config::NatConfig;
//! # use napt_nat::{Direction, Nat, PairId};
//! # use net::packet::test_utils::build_test_tcp_frame;
//! # use net::tcp::TcpFlags;
//! let config = NatConfig::from_yaml(
//!     r#"
//! pairs:
//!   - name: uplink
//!     public:
//!       mac: "02:00:00:00:00:01"
//!       ipv4: { mode: static, address: 203.0.113.1/24 }
//!     private:
//!       mac: "02:00:00:00:00:02"
//!       ipv4: { mode: static, address: 10.0.0.1/24 }
//! "#,
//! )
//! .unwrap();
//! let nat = Nat::without_handlers(&config).unwrap();
//! let pair = nat.pair(PairId(0)).unwrap();
//! pair.public()
//!     .neighbors()
//!     .learn("8.8.8.8".parse().unwrap(), "02:00:00:00:00:99".try_into().unwrap());
//!
//! let src = "10.0.0.5:40000".parse().unwrap();
//! let dst = "8.8.8.8:80".parse().unwrap();
//! let mut packet = build_test_tcp_frame(src, dst, TcpFlags::SYN);
//! assert_eq!(nat.private_to_public(PairId(0), &mut packet), Direction::Forward);
//! ```
//!
//! # Limitations
//!
//! - TCP connections are tracked from their FIN, RST and ACK flags only, without sequence numbers.
//! - No inbound mapping is ever created by traffic; inbound reachability comes from static
//!   mappings only.
//! - Idle mappings are reclaimed when traffic or an allocation touches them, or when
//!   [`PortPair::reap_expired`] is called.

pub mod concurrency;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod pair;
pub mod portmap;
pub mod side;
pub mod stats;
pub mod table;
mod tcp;
pub mod translator;
pub mod tuple;


pub use errors::{ErrorKind, NatError};
pub use handlers::{NoHandlers, PacketHandlers};
pub use pair::PortPair;
pub use side::{Side, SideKind};
pub use translator::{Nat, PairId};
pub use tuple::{Family, Tuple};

/// The fate of a packet, for the caller to act upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Transmit the rewritten packet on the opposite side
    Forward,
    /// Discard the packet
    Drop,
    /// Hand the packet, unchanged, to the host network stack
    RedirectToHost,
}
