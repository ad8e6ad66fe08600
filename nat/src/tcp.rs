// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! TCP termination tracking, from flags alone.
//!
//! A FIN from each side followed by an ACK closes the mapping and holds its port down for the
//! reuse hold-down. A RST closes it right away.

use net::headers::Protocol;
use net::tcp::TcpFlags;
use std::time::Instant;
use tracing::debug;

use crate::pair::PortPair;
use crate::portmap::{Crossing, SlotState};
use crate::tuple::Family;

/// What the tracker did with a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    None,
    Fin(u8),
    Reset,
    Closed,
}

impl PortPair {
    /// Feed the flags of a TCP packet to the slot of public port `port`.
    pub(crate) fn track_tcp(
        &self,
        family: Family,
        port: u16,
        crossing: Crossing,
        flags: TcpFlags,
        now: Instant,
    ) -> Termination {
        let Some(slot) = self.entry(family, Protocol::Tcp, port) else {
            return Termination::None;
        };
        let fin = flags.contains(TcpFlags::FIN);
        let rst = flags.contains(TcpFlags::RST);
        let ack = flags.contains(TcpFlags::ACK);
        // plain data segments of a flow that is not closing
        if !fin && !rst && !(ack && slot.fin_count() >= 2) {
            return Termination::None;
        }

        let mut state = self.lock();
        if slot.state() != SlotState::Dynamic {
            return Termination::None;
        }
        if fin {
            Termination::Fin(slot.record_fin(crossing))
        } else if rst {
            self.delete_locked(&mut state, Protocol::Tcp, family, port);
            self.counters().terminated();
            debug!("Port pair '{}': TCP port {port} reset", self.name());
            Termination::Reset
        } else if slot.fin_count() >= 2 {
            self.delete_locked(&mut state, Protocol::Tcp, family, port);
            slot.touch(now + self.reuse_hold_down());
            self.counters().terminated();
            debug!("Port pair '{}': TCP port {port} closed", self.name());
            Termination::Closed
        } else {
            Termination::None
        }
    }
}
