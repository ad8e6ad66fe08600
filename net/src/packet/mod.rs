// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Packet definition

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

use crate::headers::Headers;

/// A decoded frame: its headers plus whatever follows the last decoded header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    headers: Headers,
    payload: Vec<u8>,
}

impl Packet {
    #[must_use]
    pub fn new(headers: Headers, payload: Vec<u8>) -> Packet {
        Packet { headers, payload }
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
