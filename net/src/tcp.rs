// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! TCP header (ports and control flags only).

use bitflags::bitflags;

bitflags! {
    /// TCP control bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TcpFlags: u8 {
        const FIN = 0x01;
        const SYN = 0x02;
        const RST = 0x04;
        const PSH = 0x08;
        const ACK = 0x10;
        const URG = 0x20;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tcp {
    source: u16,
    destination: u16,
    flags: TcpFlags,
}

impl Tcp {
    #[must_use]
    pub fn new(source: u16, destination: u16, flags: TcpFlags) -> Tcp {
        Tcp {
            source,
            destination,
            flags,
        }
    }

    #[must_use]
    pub fn source(&self) -> u16 {
        self.source
    }

    #[must_use]
    pub fn destination(&self) -> u16 {
        self.destination
    }

    #[must_use]
    pub fn flags(&self) -> TcpFlags {
        self.flags
    }

    #[must_use]
    pub fn fin(&self) -> bool {
        self.flags.contains(TcpFlags::FIN)
    }

    #[must_use]
    pub fn rst(&self) -> bool {
        self.flags.contains(TcpFlags::RST)
    }

    #[must_use]
    pub fn ack(&self) -> bool {
        self.flags.contains(TcpFlags::ACK)
    }

    pub fn set_source(&mut self, port: u16) -> &mut Self {
        self.source = port;
        self
    }

    pub fn set_destination(&mut self, port: u16) -> &mut Self {
        self.destination = port;
        self
    }

    pub fn set_flags(&mut self, flags: TcpFlags) -> &mut Self {
        self.flags = flags;
        self
    }
}
