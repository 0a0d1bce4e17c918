//! Satellite identifiers, as found in epoch descriptors
use crate::prelude::{Constellation, SV};
use std::str::FromStr;

/// [Prn] is the raw 3 byte satellite identifier ("G01", "R 5", " 12"..)
/// found in epoch descriptors. Satellites are matched across epochs
/// by bytewise comparison of their [Prn], no interpretation takes place.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prn(pub [u8; 3]);

impl Prn {
    /// Builds a [Prn] from the 3 first bytes of given slice
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 3] = bytes.get(..3)?.try_into().ok()?;
        Some(Self(bytes))
    }

    /// GNSS system letter. Blank in some RINEX2 files, where it means GPS.
    pub fn system(&self) -> u8 {
        self.0[0]
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Interprets this identifier as a [SV]
    pub fn sv(&self) -> Option<SV> {
        let prn = std::str::from_utf8(&self.0[1..]).ok()?;
        let prn = prn.trim().parse::<u8>().ok()?;
        let constellation = match self.system() {
            b' ' => Constellation::GPS,
            letter => Constellation::from_str(&(letter as char).to_string()).ok()?,
        };
        Some(SV::new(constellation, prn))
    }
}

impl std::fmt::Display for Prn {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
