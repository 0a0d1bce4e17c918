//! Decoder settings
use crate::{hatanaka::numdiff::MAX_ORDER, version::Version};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Behavior when the stream ends in the middle of an epoch
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Truncation {
    /// Premature end of stream terminates decoding without error.
    /// A missing clock line is reported with a placeholder comment.
    #[default]
    Tolerate,
    /// Premature end of stream is fatal
    Fail,
}

/// The two historical behaviors of the CRX2RNX engine
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Revision {
    /// Strict truncation, difference orders strictly below [MAX_ORDER],
    /// CRINEX 1.0 / 3.0 carrying RINEX 2 / 3 only.
    Legacy,
    /// Tolerant truncation, difference orders up to [MAX_ORDER] included,
    /// CRINEX 1.0 / 3.0 / 3.1 carrying RINEX 2 / 3 / 4.
    #[default]
    Current,
}

/// [Config] is passed to each decoding session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Premature end of stream policy
    pub truncation: Truncation,
    /// Highest arc order accepted (included).
    /// Cannot exceed [MAX_ORDER].
    pub max_order: usize,
    /// Accepted CRINEX revisions
    pub crinex_revisions: Vec<Version>,
    /// Accepted RINEX major revisions
    pub rinex_majors: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(Revision::default())
    }
}

impl From<Revision> for Config {
    fn from(revision: Revision) -> Self {
        match revision {
            Revision::Legacy => Self {
                truncation: Truncation::Fail,
                max_order: MAX_ORDER - 1,
                crinex_revisions: vec![Version::new(1, 0), Version::new(3, 0)],
                rinex_majors: vec![2, 3],
            },
            Revision::Current => Self {
                truncation: Truncation::Tolerate,
                max_order: MAX_ORDER,
                crinex_revisions: vec![Version::new(1, 0), Version::new(3, 0), Version::new(3, 1)],
                rinex_majors: vec![2, 3, 4],
            },
        }
    }
}

impl Config {
    /// Copies and updates the truncation policy
    pub fn with_truncation(&self, truncation: Truncation) -> Self {
        let mut s = self.clone();
        s.truncation = truncation;
        s
    }

    /// Copies and updates the highest arc order accepted
    pub fn with_max_order(&self, order: usize) -> Self {
        let mut s = self.clone();
        s.max_order = order.min(MAX_ORDER);
        s
    }

    /// Highest arc order effectively accepted
    pub(crate) fn order_limit(&self) -> usize {
        self.max_order.min(MAX_ORDER)
    }

    pub(crate) fn accepts_crinex(&self, version: &Version) -> bool {
        self.crinex_revisions.contains(version)
    }

    pub(crate) fn accepts_rinex(&self, major: u8) -> bool {
        self.rinex_majors.contains(&major)
    }
}
