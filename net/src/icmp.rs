// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! ICMPv4 and ICMPv6 headers.
//!
//! Only query messages (echo and friends) carry an identifier; error messages embed the offending
//! datagram instead, and that embedded datagram is the business of the ICMP handler, not ours.

macro_rules! icmp_header {
    ($name:ident, $request:expr, $reply:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            icmp_type: u8,
            code: u8,
            identifier: Option<u16>,
        }

        impl $name {
            pub const ECHO_REQUEST: u8 = $request;
            pub const ECHO_REPLY: u8 = $reply;

            #[must_use]
            pub fn new(icmp_type: u8, code: u8, identifier: Option<u16>) -> Self {
                Self {
                    icmp_type,
                    code,
                    identifier,
                }
            }

            #[must_use]
            pub fn echo_request(identifier: u16) -> Self {
                Self::new(Self::ECHO_REQUEST, 0, Some(identifier))
            }

            #[must_use]
            pub fn echo_reply(identifier: u16) -> Self {
                Self::new(Self::ECHO_REPLY, 0, Some(identifier))
            }

            #[must_use]
            pub fn icmp_type(&self) -> u8 {
                self.icmp_type
            }

            #[must_use]
            pub fn code(&self) -> u8 {
                self.code
            }

            #[must_use]
            pub fn identifier(&self) -> Option<u16> {
                self.identifier
            }

            /// Overwrite the identifier of a query message.
            ///
            /// Returns `false` (and changes nothing) if the message has no identifier.
            pub fn set_identifier(&mut self, identifier: u16) -> bool {
                match self.identifier.as_mut() {
                    Some(id) => {
                        *id = identifier;
                        true
                    }
                    None => false,
                }
            }
        }
    };
}

icmp_header!(Icmp4, 8, 0);
icmp_header!(Icmp6, 128, 129);
