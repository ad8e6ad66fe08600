// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! 802.1Q tags carried by a side's frames.

use core::num::NonZero;
use std::fmt::Display;

/// A 12-bit VLAN identifier in `1..=4094`.
///
/// Zero (priority tagging) and 4095 are not usable identifiers. `Option<Vid>` stays two bytes
/// wide thanks to the `NonZero` niche.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Vid(NonZero<u16>);

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidVid {
    #[error("VLAN id 0 only marks priority tagged frames")]
    Zero,
    #[error("VLAN id 4095 is reserved")]
    Reserved,
    #[error("VLAN id {0} does not fit in 12 bits")]
    TooLarge(u16),
}

impl Vid {
    pub const MIN: Vid = Vid(NonZero::<u16>::MIN);
    pub const MAX: Vid = match NonZero::new(4094) {
        Some(max) => Vid(max),
        None => Vid::MIN,
    };

    /// # Errors
    ///
    /// Fails for 0, 4095 and anything above 4095.
    pub fn new(raw: u16) -> Result<Self, InvalidVid> {
        match raw {
            0 => Err(InvalidVid::Zero),
            4095 => Err(InvalidVid::Reserved),
            4096.. => Err(InvalidVid::TooLarge(raw)),
            _ => NonZero::new(raw).map(Vid).ok_or(InvalidVid::Zero),
        }
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0.get()
    }
}

impl TryFrom<u16> for Vid {
    type Error = InvalidVid;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Vid> for u16 {
    fn from(vid: Vid) -> Self {
        vid.as_u16()
    }
}

impl Display for Vid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_u16().fmt(f)
    }
}

/// An 802.1Q tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vlan {
    vid: Vid,
    pcp: u8,
}

impl Vlan {
    /// Create a new tag with priority zero.
    #[must_use]
    pub fn new(vid: Vid) -> Vlan {
        Vlan { vid, pcp: 0 }
    }

    #[must_use]
    pub fn vid(&self) -> Vid {
        self.vid
    }

    /// Priority code point (3 bits).
    #[must_use]
    pub fn pcp(&self) -> u8 {
        self.pcp
    }

    pub fn set_vid(&mut self, vid: Vid) -> &mut Self {
        self.vid = vid;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vid_bounds() {
        assert_eq!(Vid::new(0), Err(InvalidVid::Zero));
        assert_eq!(Vid::new(4095), Err(InvalidVid::Reserved));
        assert_eq!(Vid::new(5000), Err(InvalidVid::TooLarge(5000)));
        assert_eq!(Vid::new(1).unwrap(), Vid::MIN);
        assert_eq!(Vid::new(4094).unwrap(), Vid::MAX);
    }

    #[test]
    fn vid_from_u16_matches_range() {
        bolero::check!().with_type::<u16>().for_each(|raw| {
            let legal = (1..=4094).contains(raw);
            assert_eq!(Vid::try_from(*raw).is_ok(), legal);
        });
    }

    #[test]
    fn vid_deserialize_validates() {
        let vid: Vid = serde_yaml_ng::from_str("100").unwrap();
        assert_eq!(vid.as_u16(), 100);
        assert!(serde_yaml_ng::from_str::<Vid>("0").is_err());
    }
}
