//! CRINEX Header definitions
use crate::prelude::{Epoch, Version};
use hifitime::TimeScale;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// CRINEX specifications, found in the two leading header lines.
/// These lines do not exist in the recovered RINEX.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CRINEX {
    /// Compression algorithm revision
    pub version: Version,
    /// Compression program name
    pub prog: String,
    /// Date of compression, if it could be interpreted
    pub date: Option<Epoch>,
}

/// Parses "Jan", "Feb".. month descriptors
fn parse_formatted_month(desc: &str) -> Option<u8> {
    let month = match desc.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

impl CRINEX {
    /// Defines compression algorithm revision
    pub fn with_version(&self, version: Version) -> Self {
        let mut s = self.clone();
        s.version = version;
        s
    }

    /// Parse and append prog+date fields, from a "CRINEX PROG / DATE" line.
    /// The date remains unknown if it does not follow the "dd-Mon-yy hh:mm" format.
    pub(crate) fn with_prog_date(&self, prog_date: &str) -> Self {
        let mut s = self.clone();
        let prog = prog_date.get(..20).unwrap_or(prog_date);
        s.prog = prog.trim().to_string();
        s.date = prog_date
            .get(40..)
            .map(|date| date.get(..20).unwrap_or(date))
            .and_then(|date| Self::parse_date(date.trim()));
        s
    }

    fn parse_date(content: &str) -> Option<Epoch> {
        let (date, time) = content.split_once(' ')?;

        let mut items = date.split('-');
        let day = items.next()?.trim().parse::<u8>().ok()?;
        let month = parse_formatted_month(items.next()?.trim())?;
        // CRINEX: Y2000
        let year = 2000 + items.next()?.trim().parse::<i32>().ok()?;

        let (hour, mins) = time.trim().split_once(':')?;
        let hour = hour.parse::<u8>().ok()?;
        let mins = mins.parse::<u8>().ok()?;

        Epoch::maybe_from_gregorian(year, month, day, hour, mins, 0, 0, TimeScale::UTC).ok()
    }
}
