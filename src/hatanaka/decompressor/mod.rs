//! CRINEX decompression module
use crate::{
    hatanaka::{
        epoch::{DropReason, EpochError, EpochRecord},
        field::{decode_clock, decode_observations, SatelliteState},
        formatting::{format_comment, format_epoch, format_observations},
        header::{FormatVersion, Header, HeaderLine},
        layout::Layout,
        numdiff::ClockDiff,
        textdiff::TextDiff,
        Config, Truncation, CRINEX,
    },
    prelude::SV,
    prn::Prn,
    Error,
};

use std::{
    collections::{BTreeSet, HashMap},
    io::Write,
};

pub mod io;

#[cfg(feature = "log")]
use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const ABNORMAL_LINE: &str = "  *** Abnormal line, skipped by CRX2RNX ***";
const ABNORMAL_CLOCK: &str = " *** Abnormal clock line, skipped by CRX2RNX ***";
const ABNORMAL_SATELLITES: &str = "  *** Abnormal satellite list, skipped by CRX2RNX ***";

#[derive(Default, Debug, Copy, Clone, PartialEq)]
enum State {
    #[default]
    /// Header section
    Header,
    /// Gathering epoch descriptor
    Epoch,
    /// Passing through the lines of an event record
    Event { remaining: usize },
    /// Gathering clock offset
    Clock,
    /// Gathering observations of the nth satellite
    Observation { index: usize },
    /// Dropping the remaining lines of a dropped epoch
    Skip { remaining: usize },
    /// Dropping lines until the next initialization epoch
    Resync { skipped: usize },
}

/// Decoded quantities of the last emitted epoch,
/// every difference of the next epoch applies to it.
#[derive(Debug, Default, Clone)]
struct Snapshot {
    clock: Option<ClockDiff>,
    satellites: HashMap<Prn, SatelliteState>,
}

/// Epoch being decoded, not emitted yet
#[derive(Debug)]
struct PendingEpoch {
    record: EpochRecord,
    clock: Option<ClockDiff>,
    satellites: Vec<SatelliteState>,
}

/// Decoding session report
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    /// Input lines consumed
    pub lines: usize,
    /// Observation epochs emitted
    pub epochs: usize,
    /// Event records passed through
    pub events: usize,
    /// Epochs that could not be recovered
    pub dropped: usize,
    /// Lines discarded while looking for the next initialization epoch.
    /// Epochs encoded in those lines are lost too, but cannot be counted.
    pub skipped: usize,
    /// Satellites observed in emitted epochs
    pub satellites: BTreeSet<SV>,
}

/// [Decompressor] recovers RINEX from CRINEX, one line at a time.
/// It owns the complete decoding state, so one [Decompressor] is needed
/// per stream. Output is written as soon as each epoch is complete:
/// an epoch that cannot be recovered produces no output.
///
/// ```
/// use crinex::prelude::{Config, Decompressor};
///
/// let crinex = [
///     "1.0                 COMPACT RINEX FORMAT                    CRINEX VERS   / TYPE",
///     "RNX2CRX ver.4.0.7                       28-Dec-21 00:17     CRINEX PROG / DATE",
///     "     2.11           OBSERVATION DATA    G (GPS)             RINEX VERSION / TYPE",
///     "     1    C1                                                # / TYPES OF OBSERV",
///     "                                                            END OF HEADER",
///     "&21 12 28  0  0  0.0000000  0  1G01",
///     "",
///     "3&23619095450",
/// ];
///
/// let mut decompressor = Decompressor::new(Config::default());
/// let mut rinex = Vec::<u8>::new();
/// for line in crinex {
///     decompressor.decompress(line.as_bytes(), &mut rinex).unwrap();
/// }
/// let summary = decompressor.finish(&mut rinex).unwrap();
/// assert_eq!(summary.epochs, 1);
///
/// let rinex = String::from_utf8(rinex).unwrap();
/// assert!(rinex.ends_with(
///     " 21 12 28  0  0  0.0000000  0  1G01\n  23619095.450\n"
/// ));
/// ```
#[derive(Debug, Default)]
pub struct Decompressor {
    config: Config,
    state: State,
    /// Lines consumed so far
    line: usize,
    header: Header,
    layout: Layout,
    /// Next epoch must be an initialization epoch
    must_init: bool,
    descriptor: TextDiff,
    pico: TextDiff,
    snapshot: Snapshot,
    pending: Option<PendingEpoch>,
    summary: Summary,
}

/// Removes trailing blanks, tabs and carriage return
fn trim_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !matches!(b, b' ' | b'\t' | b'\r'))
        .map(|pos| pos + 1)
        .unwrap_or(0);
    &line[..end]
}

impl Decompressor {
    /// Builds a new [Decompressor], ready to consume a complete CRINEX stream
    pub fn new(config: Config) -> Self {
        Self {
            config,
            must_init: true,
            ..Default::default()
        }
    }

    /// CRINEX specifications, once the header has been parsed
    pub fn crinex(&self) -> Option<&CRINEX> {
        self.header.crinex.as_ref()
    }

    /// Format revisions, once the header has been parsed
    pub fn format(&self) -> Option<FormatVersion> {
        self.header.format()
    }

    /// Current session report
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    fn crinex_major(&self) -> u8 {
        self.header
            .crinex
            .as_ref()
            .map(|crinex| crinex.version.major)
            .unwrap_or(3)
    }

    fn rinex_major(&self) -> u8 {
        self.header.rinex.map(|v| v.major).unwrap_or(3)
    }

    /// Consumes a new line (without termination). Recovered content,
    /// if any, is written to `w`.
    pub fn decompress<W: Write>(&mut self, line: &[u8], w: &mut W) -> Result<(), Error> {
        self.line += 1;
        self.summary.lines += 1;
        let line = trim_end(line);
        self.consume(line, w).map_err(|e| e.at_line(self.line))
    }

    /// Declares end of stream. Returns the session report.
    pub fn finish<W: Write>(&mut self, w: &mut W) -> Result<Summary, Error> {
        let truncated = match self.state {
            State::Header => {
                return Err(if self.header.crinex.is_none() {
                    Error::NotACrinex
                } else {
                    Error::MissingEndOfHeader
                });
            },
            State::Epoch => false,
            State::Resync { skipped: _skipped } => {
                #[cfg(feature = "log")]
                warn!("{} line(s) skipped until end of stream", _skipped);
                false
            },
            State::Clock | State::Observation { .. } => {
                self.summary.dropped += 1;
                true
            },
            State::Event { .. } | State::Skip { .. } => true,
        };

        if truncated {
            #[cfg(feature = "log")]
            warn!("line {}: premature end of stream", self.line);

            if self.config.truncation == Truncation::Fail {
                return Err(Error::PrematureEnd.at_line(self.line));
            }
            if self.state == State::Clock {
                let mut buf = Vec::new();
                format_comment(&self.layout, ABNORMAL_CLOCK, &mut buf)?;
                w.write_all(&buf)?;
            }
        }

        self.pending = None;
        self.state = State::Epoch;
        Ok(self.summary.clone())
    }

    fn consume<W: Write>(&mut self, line: &[u8], w: &mut W) -> Result<(), Error> {
        match self.state {
            State::Header => self.header_line(line, w),
            State::Epoch => self.epoch_line(line, w),
            State::Resync { skipped } => {
                if line.first() == Some(&self.layout.crinex_marker) {
                    #[cfg(feature = "log")]
                    warn!("line {}: resynchronized, {} line(s) skipped", self.line, skipped);
                    self.state = State::Epoch;
                    self.epoch_line(line, w)
                } else {
                    self.summary.skipped += 1;
                    self.state = State::Resync {
                        skipped: skipped + 1,
                    };
                    Ok(())
                }
            },
            State::Event { remaining } => {
                self.header.obs_types.amend(line)?;
                w.write_all(line)?;
                w.write_all(b"\n")?;
                self.state = match remaining {
                    0 | 1 => State::Epoch,
                    remaining => State::Event {
                        remaining: remaining - 1,
                    },
                };
                Ok(())
            },
            State::Skip { remaining } => {
                self.state = match remaining {
                    0 | 1 => State::Epoch,
                    remaining => State::Skip {
                        remaining: remaining - 1,
                    },
                };
                Ok(())
            },
            State::Clock => self.clock_line(line, w),
            State::Observation { index } => self.observation_line(index, line, w),
        }
    }

    fn header_line<W: Write>(&mut self, line: &[u8], w: &mut W) -> Result<(), Error> {
        match self.header.parse_line(line, &self.config)? {
            HeaderLine::Stripped => {},
            HeaderLine::Passthrough => {
                w.write_all(line)?;
                w.write_all(b"\n")?;
            },
            HeaderLine::End => {
                w.write_all(line)?;
                w.write_all(b"\n")?;
                self.layout = Layout::from_rinex_major(self.rinex_major());
                self.must_init = true;
                self.state = State::Epoch;
            },
        }
        Ok(())
    }

    fn epoch_line<W: Write>(&mut self, line: &[u8], w: &mut W) -> Result<(), Error> {
        let layout = self.layout;

        // CRINEX3 escape lines
        if self.crinex_major() == 3 && line.first() == Some(&b'&') {
            return Ok(());
        }

        let rinex_major = self.rinex_major();
        let init = line.first() == Some(&layout.crinex_marker);

        if self.must_init && !init {
            if !line.is_empty() {
                #[cfg(feature = "log")]
                warn!("line {}: abnormal line", self.line);
                let mut buf = Vec::new();
                format_comment(&layout, ABNORMAL_LINE, &mut buf)?;
                w.write_all(&buf)?;
            }
            return Ok(());
        }

        if init {
            if let Some(_flag) = layout.event_flag(line) {
                #[cfg(feature = "log")]
                debug!("line {}: event (flag {})", self.line, _flag as char);
                w.write_all(&[layout.rinex_marker])?;
                w.write_all(&line[1..])?;
                w.write_all(b"\n")?;

                self.summary.events += 1;
                self.must_init = true;
                self.state = match layout.numsat(line).unwrap_or(0) {
                    0 => State::Epoch,
                    remaining => State::Event { remaining },
                };
                return Ok(());
            }

            self.descriptor.reset();
            self.snapshot.satellites.clear();
            self.must_init = false;
        }

        let descriptor = self.descriptor.decompress(line);

        match EpochRecord::parse(descriptor, &layout, rinex_major, &self.header.obs_types) {
            Ok(record) => {
                #[cfg(feature = "log")]
                debug!(
                    "line {}: epoch (flag {}, {} satellites)",
                    self.line,
                    record.flag as char,
                    record.numsat()
                );
                self.pending = Some(PendingEpoch {
                    satellites: Vec::with_capacity(record.numsat()),
                    clock: None,
                    record,
                });
                self.state = State::Clock;
                Ok(())
            },
            Err(EpochError::Fatal(e)) => Err(e),
            Err(EpochError::Drop(reason)) => {
                let remaining = match reason {
                    DropReason::SatelliteList => {
                        let mut buf = Vec::new();
                        format_comment(&layout, ABNORMAL_SATELLITES, &mut buf)?;
                        w.write_all(&buf)?;
                        // numsat was readable
                        layout.numsat(descriptor).map(|numsat| numsat + 1)
                    },
                    _ => None,
                };
                self.drop_epoch(reason, remaining);
                Ok(())
            },
        }
    }

    fn clock_line<W: Write>(&mut self, line: &[u8], w: &mut W) -> Result<(), Error> {
        let pending = match self.pending.as_mut() {
            Some(pending) => pending,
            None => {
                self.state = State::Epoch;
                return Ok(());
            },
        };

        let numsat = pending.record.numsat();

        match decode_clock(
            line,
            self.snapshot.clock.as_ref(),
            &mut self.pico,
            self.config.order_limit(),
        ) {
            Ok(clock) => {
                pending.clock = clock;
                if numsat == 0 {
                    self.emit(w)
                } else {
                    self.state = State::Observation { index: 0 };
                    Ok(())
                }
            },
            Err(EpochError::Fatal(e)) => Err(e),
            Err(EpochError::Drop(reason)) => {
                self.drop_epoch(reason, Some(numsat));
                Ok(())
            },
        }
    }

    fn observation_line<W: Write>(
        &mut self,
        index: usize,
        line: &[u8],
        w: &mut W,
    ) -> Result<(), Error> {
        let crinex_major = self.crinex_major();

        let pending = match self.pending.as_mut() {
            Some(pending) => pending,
            None => {
                self.state = State::Epoch;
                return Ok(());
            },
        };

        let numsat = pending.record.numsat();
        let satellite = pending.record.satellites[index];

        match decode_observations(
            line,
            satellite.numobs,
            self.snapshot.satellites.get(&satellite.prn),
            crinex_major,
            self.config.order_limit(),
        ) {
            Ok(state) => {
                pending.satellites.push(state);
                if index + 1 == numsat {
                    self.emit(w)
                } else {
                    self.state = State::Observation { index: index + 1 };
                    Ok(())
                }
            },
            Err(EpochError::Fatal(e)) => Err(e),
            Err(EpochError::Drop(reason)) => {
                self.drop_epoch(reason, Some(numsat - index - 1));
                Ok(())
            },
        }
    }

    /// Drops current epoch. When the number of remaining lines of this
    /// epoch is not known, every line is dropped until next initialization epoch.
    /// The snapshot is left untouched.
    fn drop_epoch(&mut self, _reason: DropReason, remaining: Option<usize>) {
        #[cfg(feature = "log")]
        warn!("line {}: epoch dropped: {}", self.line, _reason);

        self.summary.dropped += 1;
        self.pending = None;
        self.state = match remaining {
            None => State::Resync { skipped: 0 },
            Some(0) => State::Epoch,
            Some(remaining) => State::Skip { remaining },
        };
    }

    /// Formats current epoch, which becomes the new snapshot
    fn emit<W: Write>(&mut self, w: &mut W) -> Result<(), Error> {
        self.state = State::Epoch;

        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => return Ok(()),
        };

        let mut buf = Vec::with_capacity(1024);

        format_epoch(
            &self.layout,
            &pending.record,
            pending.clock.map(|clock| clock.value()),
            &mut buf,
        )?;

        for (satellite, state) in pending.record.satellites.iter().zip(&pending.satellites) {
            format_observations(&self.layout, &satellite.prn, state, &mut buf)?;
        }

        w.write_all(&buf)?;

        self.summary.epochs += 1;
        for satellite in pending.record.satellites.iter() {
            if let Some(sv) = satellite.prn.sv() {
                self.summary.satellites.insert(sv);
            }
        }

        self.snapshot = Snapshot {
            clock: pending.clock,
            satellites: pending
                .record
                .satellites
                .iter()
                .map(|satellite| satellite.prn)
                .zip(pending.satellites)
                .collect(),
        };

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn line_trimming() {
        assert_eq!(trim_end(b"abc \t\r"), b"abc");
        assert_eq!(trim_end(b"  "), b"");
        assert_eq!(trim_end(b" a b"), b" a b");
    }

    #[test]
    fn empty_stream() {
        let mut decompressor = Decompressor::new(Config::default());
        let mut buf = Vec::new();
        match decompressor.finish(&mut buf) {
            Err(Error::NotACrinex) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_end_of_header() {
        let mut decompressor = Decompressor::new(Config::default());
        let mut buf = Vec::new();
        decompressor
            .decompress(
                b"3.0                 COMPACT RINEX FORMAT                    CRINEX VERS   / TYPE",
                &mut buf,
            )
            .unwrap();
        match decompressor.finish(&mut buf) {
            Err(Error::MissingEndOfHeader) => {},
            other => panic!("unexpected result {:?}", other),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn numbered_header_failures() {
        let mut decompressor = Decompressor::new(Config::default());
        let mut buf = Vec::new();
        decompressor
            .decompress(
                b"3.0                 COMPACT RINEX FORMAT                    CRINEX VERS   / TYPE",
                &mut buf,
            )
            .unwrap();
        match decompressor.decompress(b"too short", &mut buf) {
            Err(Error::Line { line, source }) => {
                assert_eq!(line, 2);
                assert!(matches!(*source, Error::HeaderLineTooShort));
            },
            other => panic!("unexpected result {:?}", other),
        }
    }
}
