#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * CRINEX is part of the Geo-Rust framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * (cf. https://github.com/georust/rinex/graphs/contributors)
 * This framework is shipped under both Apache-2.0 and MIT License.
 *
 * Documentation: https://github.com/georust/rinex
 */

extern crate gnss_rs as gnss;

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

pub mod hatanaka;
pub mod prn;
pub mod version;

mod error;
mod reader;

#[cfg(test)]
mod tests;

pub use error::Error;

/// Package to include all basic structures
pub mod prelude {
    pub use crate::{
        error::Error,
        hatanaka::{
            decompress, decompress_file, output_path, Config, Decompressor, DecompressorIO,
            FormatVersion, Revision, Summary, Truncation, CRINEX,
        },
        prn::Prn,
        version::Version,
    };

    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::Epoch;
}
