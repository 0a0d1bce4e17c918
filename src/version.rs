//! `RINEX` and `CRINEX` revision description
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Version is used to describe both RINEX and CRINEX revisions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Version major number
    pub major: u8,
    /// Version minor number
    pub minor: u8,
}

#[derive(Clone, Debug, Error)]
pub enum ParsingError {
    #[error("empty version")]
    Empty,
    #[error("failed to parse version")]
    ParseIntError(#[from] std::num::ParseIntError),
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParsingError::Empty);
        }
        match s.split_once('.') {
            Some((major, minor)) => Ok(Self {
                major: major.parse::<u8>()?,
                minor: if minor.is_empty() {
                    0
                } else {
                    minor.parse::<u8>()?
                },
            }),
            None => Ok(Self {
                major: s.parse::<u8>()?,
                minor: 0,
            }),
        }
    }
}

impl From<Version> for (u8, u8) {
    fn from(v: Version) -> (u8, u8) {
        (v.major, v.minor)
    }
}

impl Version {
    /// Builds a new `Version` object
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}
