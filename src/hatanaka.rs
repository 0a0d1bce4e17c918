//! CRINEX (Hatanaka compressed RINEX) decompression.
//!
//! CRINEX replaces every quantity of an Observation RINEX by its
//! difference with previous epochs:
//! - numeric fields (clock offsets and observations) are differenced
//! up to a given order, see [NumDiff]
//! - text fields (epoch descriptors and flags) only retain the
//! bytes that changed, see [TextDiff]
//!
//! [Decompressor] is the line-oriented core, [DecompressorIO] and [decompress]
//! wrap it for I/O interfaces and [decompress_file] for files.

mod config;
mod crinex;
mod decompressor;
mod epoch;
mod field;
mod formatting;
mod header;
mod layout;
mod numdiff;
mod textdiff;

pub use config::{Config, Revision, Truncation};
pub use crinex::CRINEX;
pub use decompressor::{
    io::{decompress, decompress_file, output_path, DecompressorIO},
    Decompressor, Summary,
};
pub use header::FormatVersion;
pub use numdiff::{ClockValue, FixedPoint, NumDiff, ObsValue, MAX_ORDER};
pub use textdiff::TextDiff;
