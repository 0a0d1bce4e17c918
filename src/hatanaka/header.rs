//! CRINEX header section
use crate::{
    hatanaka::{Config, CRINEX},
    prelude::Version,
    Error,
};

use std::{collections::HashMap, str::FromStr};

#[cfg(feature = "log")]
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const CRINEX_VERS: &[u8] = b"CRINEX VERS   / TYPE";
const CRINEX_PROG: &[u8] = b"CRINEX PROG / DATE";
const RINEX_VERSION: &[u8] = b"RINEX VERSION / TYPE";
const V2_OBS_TYPES: &[u8] = b"# / TYPES OF OBSERV";
const V3_OBS_TYPES: &[u8] = b"SYS / # / OBS TYPES";
const END_OF_HEADER: &[u8] = b"END OF HEADER";

/// Revisions of a CRINEX stream: the compression revision
/// and the revision of the RINEX it carries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormatVersion {
    pub crinex: Version,
    pub rinex: Version,
}

/// Number of observation types, either globally (RINEX2)
/// or per GNSS system letter (RINEX3 and later).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ObsTypeTable {
    global: Option<usize>,
    systems: HashMap<u8, usize>,
}

/// Parses the first integer found in given content, leading blanks are skipped
fn leading_integer(content: &[u8]) -> Option<i64> {
    let start = content.iter().position(|b| *b != b' ')?;
    let content = &content[start..];
    let end = content
        .iter()
        .enumerate()
        .position(|(i, b)| !(b.is_ascii_digit() || (i == 0 && *b == b'-')))
        .unwrap_or(content.len());
    std::str::from_utf8(&content[..end]).ok()?.parse::<i64>().ok()
}

fn has_label(line: &[u8], label: &[u8]) -> bool {
    line.get(60..)
        .map(|content| content.starts_with(label))
        .unwrap_or(false)
}

impl ObsTypeTable {
    /// Scans given header line for observation type definitions.
    /// Continuation lines do not modify the table. Returns true on new definition.
    pub fn amend(&mut self, line: &[u8]) -> Result<bool, Error> {
        if has_label(line, V2_OBS_TYPES) && line.get(5) != Some(&b' ') {
            let count = leading_integer(line).ok_or(Error::InvalidObsTypeCount)?;
            if count <= 0 {
                return Err(Error::InvalidObsTypeCount);
            }
            self.global = Some(count as usize);
            Ok(true)
        } else if has_label(line, V3_OBS_TYPES) && line[0] != b' ' {
            let count = leading_integer(&line[3..]).ok_or(Error::InvalidObsTypeCount)?;
            if count <= 0 {
                return Err(Error::InvalidObsTypeCount);
            }
            self.systems.insert(line[0], count as usize);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Returns the number of observation types for given satellite system.
    /// RINEX2 uses a single table for all systems.
    pub fn count(&self, rinex_major: u8, system: u8) -> Result<usize, Error> {
        if rinex_major < 3 {
            self.global.ok_or(Error::UndefinedObsTypes)
        } else {
            self.systems
                .get(&system)
                .copied()
                .ok_or(Error::UndefinedSystem(system as char))
        }
    }
}

/// What to do with a header line
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HeaderLine {
    /// CRINEX specific line, does not exist in RINEX
    Stripped,
    /// Copied as is
    Passthrough,
    /// Copied as is, the header section is over
    End,
}

/// Header section parser
#[derive(Debug, Default, Clone)]
pub struct Header {
    pub crinex: Option<CRINEX>,
    pub rinex: Option<Version>,
    pub obs_types: ObsTypeTable,
}

impl Header {
    /// Consumes one header line
    pub fn parse_line(&mut self, line: &[u8], config: &Config) -> Result<HeaderLine, Error> {
        if line.len() <= 60 {
            return Err(Error::HeaderLineTooShort);
        }
        let content = String::from_utf8_lossy(&line[..60]);

        if self.crinex.is_none() {
            if !has_label(line, CRINEX_VERS) {
                return Err(Error::NotACrinex);
            }
            let desc = String::from_utf8_lossy(&line[..20]).trim().to_string();
            let version =
                Version::from_str(&desc).map_err(|_| Error::NonSupportedCrinexVersion(desc.clone()))?;
            if !config.accepts_crinex(&version) {
                return Err(Error::NonSupportedCrinexVersion(desc));
            }
            #[cfg(feature = "log")]
            debug!("CRINEX V{}", version);
            self.crinex = Some(CRINEX::default().with_version(version));
            return Ok(HeaderLine::Stripped);
        }

        if has_label(line, CRINEX_PROG) {
            if let Some(crinex) = &mut self.crinex {
                *crinex = crinex.with_prog_date(&content);
            }
            Ok(HeaderLine::Stripped)
        } else if has_label(line, RINEX_VERSION) {
            let desc = String::from_utf8_lossy(&line[..9]).trim().to_string();
            let version =
                Version::from_str(&desc).map_err(|_| Error::NonSupportedRinexVersion(desc.clone()))?;
            if !config.accepts_rinex(version.major) {
                return Err(Error::NonSupportedRinexVersion(desc));
            }
            #[cfg(feature = "log")]
            debug!("RINEX V{}", version);
            self.rinex = Some(version);
            Ok(HeaderLine::Passthrough)
        } else if has_label(line, END_OF_HEADER) {
            if self.rinex.is_none() {
                return Err(Error::MissingRinexVersion);
            }
            Ok(HeaderLine::End)
        } else {
            self.obs_types.amend(line)?;
            Ok(HeaderLine::Passthrough)
        }
    }

    /// Returns the format revisions, once both were identified
    pub fn format(&self) -> Option<FormatVersion> {
        Some(FormatVersion {
            crinex: self.crinex.as_ref()?.version,
            rinex: self.rinex?,
        })
    }
}
