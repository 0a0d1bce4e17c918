//! CRINEX decompression from direct I/O
use crate::{
    hatanaka::{decompressor::Summary, Config, Decompressor, FormatVersion, CRINEX},
    reader::BufferedReader,
    Error,
};

use std::{
    fs::File,
    io::{BufRead, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

#[cfg(feature = "log")]
use log::debug;

/// Pulls the next line from the reader, without its termination.
/// Returns false once the reader is exhausted.
fn next_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> std::io::Result<bool> {
    line.clear();
    if reader.read_until(b'\n', line)? == 0 {
        return Ok(false);
    }
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    Ok(true)
}

/// Decompresses a complete CRINEX stream.
/// ```
/// use crinex::prelude::{decompress, Config};
///
/// let crinex = "\
/// 3.0                 COMPACT RINEX FORMAT                    CRINEX VERS   / TYPE
/// RNX2CRX ver.4.1.0                       04-Mar-22 00:00     CRINEX PROG / DATE
///      3.04           OBSERVATION DATA    M                   RINEX VERSION / TYPE
/// G    1 C1C                                                  SYS / # / OBS TYPES
///                                                             END OF HEADER
/// > 2022 03 04 00 00  0.0000000  0  1      G01
///
/// 3&23619095450
/// ";
///
/// let mut rinex = Vec::<u8>::new();
/// let summary = decompress(crinex.as_bytes(), &mut rinex, Config::default()).unwrap();
/// assert_eq!(summary.epochs, 1);
/// ```
pub fn decompress<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    config: Config,
) -> Result<Summary, Error> {
    let mut decompressor = Decompressor::new(config);
    let mut line = Vec::with_capacity(256);
    while next_line(&mut reader, &mut line)? {
        decompressor.decompress(&line, &mut writer)?;
    }
    let summary = decompressor.finish(&mut writer)?;
    writer.flush()?;
    Ok(summary)
}

/// [DecompressorIO] exposes the RINEX content recovered from
/// any [BufRead]able CRINEX interface, through [Read].
/// Decoding errors are reported as [std::io::ErrorKind::InvalidData].
/// ```
/// use std::io::Read;
/// use crinex::prelude::{Config, DecompressorIO};
///
/// let crinex = "\
/// 1.0                 COMPACT RINEX FORMAT                    CRINEX VERS   / TYPE
///      2.11           OBSERVATION DATA    G (GPS)             RINEX VERSION / TYPE
///      1    C1                                                # / TYPES OF OBSERV
///                                                             END OF HEADER
/// ";
///
/// let mut rinex = String::new();
/// let mut decompressor = DecompressorIO::new(crinex.as_bytes(), Config::default());
/// decompressor.read_to_string(&mut rinex).unwrap();
/// assert!(rinex.ends_with("END OF HEADER\n"));
/// ```
pub struct DecompressorIO<R: BufRead> {
    reader: R,
    decompressor: Decompressor,
    /// Current input line
    line: Vec<u8>,
    /// Recovered content, not read yet
    output: Vec<u8>,
    /// Read pointer in output
    pos: usize,
    eos: bool,
}

impl<R: BufRead> DecompressorIO<R> {
    /// Builds a new [DecompressorIO], ready to decode a complete CRINEX stream
    pub fn new(reader: R, config: Config) -> Self {
        Self {
            reader,
            decompressor: Decompressor::new(config),
            line: Vec::with_capacity(256),
            output: Vec::with_capacity(4096),
            pos: 0,
            eos: false,
        }
    }

    /// CRINEX specifications, once the header has been consumed
    pub fn crinex(&self) -> Option<&CRINEX> {
        self.decompressor.crinex()
    }

    /// Format revisions, once the header has been consumed
    pub fn format(&self) -> Option<FormatVersion> {
        self.decompressor.format()
    }

    /// Session report so far
    pub fn summary(&self) -> &Summary {
        self.decompressor.summary()
    }

    /// Consumes input until some content is recovered or the stream is over
    fn fill(&mut self) -> Result<(), Error> {
        self.output.clear();
        self.pos = 0;
        while self.output.is_empty() && !self.eos {
            if next_line(&mut self.reader, &mut self.line)? {
                self.decompressor.decompress(&self.line, &mut self.output)?;
            } else {
                self.eos = true;
                self.decompressor.finish(&mut self.output)?;
            }
        }
        Ok(())
    }
}

impl<R: BufRead> Read for DecompressorIO<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos == self.output.len() {
            self.fill()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        }
        let size = buf.len().min(self.output.len() - self.pos);
        buf[..size].copy_from_slice(&self.output[self.pos..self.pos + size]);
        self.pos += size;
        Ok(size)
    }
}

/// Derives the RINEX file name from a CRINEX file name, in the same directory:
/// `.yyd` becomes `.yyo` and `.crx` becomes `.rnx` (case is preserved).
/// A trailing `.gz` extension is dropped.
pub fn output_path(input: &Path) -> Result<PathBuf, Error> {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| Error::OutputFilename(input.to_string_lossy().to_string()))?;

    if name.ends_with(".Z") {
        return Err(Error::NonSupportedCompression(name));
    }

    let stem = name.strip_suffix(".gz").unwrap_or(&name);
    let bytes = stem.as_bytes();
    let len = bytes.len();

    let output = if let Some(stem) = stem.strip_suffix(".crx") {
        format!("{}.rnx", stem)
    } else if let Some(stem) = stem.strip_suffix(".CRX") {
        format!("{}.RNX", stem)
    } else if len > 4 && bytes[len - 4] == b'.' && matches!(bytes[len - 1], b'd' | b'D') {
        let obs = if bytes[len - 1] == b'd' { 'o' } else { 'O' };
        format!("{}{}", &stem[..len - 1], obs)
    } else {
        return Err(Error::OutputFilename(name));
    };

    Ok(input.with_file_name(output))
}

/// Decompresses a complete CRINEX file (possibly gzip compressed, with the "flate2" feature).
/// The RINEX file is named after [output_path] unless `output` is provided.
/// Returns the path to the RINEX file. The RINEX file is removed on failure.
pub fn decompress_file(
    input: &Path,
    output: Option<&Path>,
    config: Config,
) -> Result<(PathBuf, Summary), Error> {
    let output = match output {
        Some(output) => output.to_path_buf(),
        None => output_path(input)?,
    };

    let reader = BufferedReader::new(input)?;
    let writer = BufWriter::new(File::create(&output)?);

    match decompress(reader, writer, config) {
        Ok(summary) => {
            #[cfg(feature = "log")]
            debug!(
                "{}: {} epochs ({} dropped) recovered to {}",
                input.display(),
                summary.epochs,
                summary.dropped,
                output.display()
            );
            Ok((output, summary))
        },
        Err(e) => {
            #[cfg(feature = "log")]
            debug!("{}: {}", input.display(), e);
            let _ = std::fs::remove_file(&output);
            Err(e)
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_filenames() {
        for (input, expected) in [
            ("ESBC00DNK_R_20201770000_01D_30S_MO.crx", "ESBC00DNK_R_20201770000_01D_30S_MO.rnx"),
            ("ESBC00DNK_R_20201770000_01D_30S_MO.CRX", "ESBC00DNK_R_20201770000_01D_30S_MO.RNX"),
            ("ESBC00DNK_R_20201770000_01D_30S_MO.crx.gz", "ESBC00DNK_R_20201770000_01D_30S_MO.rnx"),
            ("data/AJAC3550.21d", "data/AJAC3550.21o"),
            ("AJAC3550.21D", "AJAC3550.21O"),
            ("AJAC3550.21d.gz", "AJAC3550.21o"),
        ] {
            assert_eq!(
                output_path(Path::new(input)).unwrap(),
                PathBuf::from(expected),
                "failed for \"{}\"",
                input
            );
        }
        for input in ["AJAC3550.21o", "README.md", "d", ".crx.gz.txt"] {
            match output_path(Path::new(input)) {
                Err(Error::OutputFilename(_)) => {},
                other => panic!("unexpected result {:?} for \"{}\"", other, input),
            }
        }
        match output_path(Path::new("AJAC3550.21d.Z")) {
            Err(Error::NonSupportedCompression(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn line_splitting() {
        let mut reader = "first\r\nsecond\n\nlast".as_bytes();
        let mut line = Vec::new();
        let mut lines = Vec::new();
        while next_line(&mut reader, &mut line).unwrap() {
            lines.push(String::from_utf8(line.clone()).unwrap());
        }
        assert_eq!(lines, vec!["first\r", "second", "", "last"]);
    }
}
