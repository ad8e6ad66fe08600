// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per-packet failures. None of them is fatal: every one resolves to dropping the packet.

use crate::side::SideKind;
use crate::translator::PairId;
use crate::tuple::{Family, Tuple};
use net::headers::{NetError, Protocol, TransportError};
use net::ip::NextHeader;
use std::net::IpAddr;

/// How a [`NatError`] is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The packet is not allowed by the translation policy
    PolicyDrop,
    /// No public port left for a new flow
    ResourceExhausted,
    /// A header the engine relies on is missing or inconsistent
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NatError {
    #[error("not an IP or ARP frame")]
    NotIp,
    #[error("unsupported transport protocol {0}")]
    UnsupportedProtocol(NextHeader),
    #[error("missing or inconsistent {0} header")]
    MissingHeader(&'static str),
    #[error("{0} side has no {1} address")]
    NotAcquired(SideKind, Family),
    #[error("no mapping for {0}")]
    NoMapping(Tuple),
    #[error("{protocol} mapping on public port {port} expired")]
    Expired { protocol: Protocol, port: u16 },
    #[error("no neighbor entry for {0}")]
    NoNeighbor(IpAddr),
    #[error("no free {protocol} port for {family}")]
    Exhausted { protocol: Protocol, family: Family },
    #[error("unknown port pair {0}")]
    UnknownPair(PairId),
    #[error(transparent)]
    Net(#[from] NetError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl NatError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            NatError::Exhausted { .. } => ErrorKind::ResourceExhausted,
            NatError::MissingHeader(_) | NatError::Net(_) | NatError::Transport(_) => {
                ErrorKind::Malformed
            }
            NatError::NotIp
            | NatError::UnsupportedProtocol(_)
            | NatError::NotAcquired(..)
            | NatError::NoMapping(_)
            | NatError::Expired { .. }
            | NatError::NoNeighbor(_)
            | NatError::UnknownPair(_) => ErrorKind::PolicyDrop,
        }
    }
}
