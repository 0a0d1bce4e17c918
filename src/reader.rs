//! Generic Buffered Reader
use crate::Error;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

#[cfg(feature = "flate2")]
use crate::GzDecoder;

/// Input files, either plain CRINEX or gzip compressed CRINEX
#[derive(Debug)]
pub enum BufferedReader {
    /// Plain (Hatanaka compressed only) input
    PlainFile(BufReader<File>),
    /// gzip + Hatanaka compressed input
    #[cfg(feature = "flate2")]
    GzFile(BufReader<GzDecoder<File>>),
}

impl BufferedReader {
    pub fn new(path: &Path) -> Result<Self, Error> {
        let name = path.to_string_lossy();
        if name.ends_with(".Z") {
            // unix compress (LZW): not supported
            return Err(Error::NonSupportedCompression(name.to_string()));
        }
        let fd = File::open(path)?;
        if name.ends_with(".gz") {
            #[cfg(feature = "flate2")]
            {
                Ok(Self::GzFile(BufReader::new(GzDecoder::new(fd))))
            }
            #[cfg(not(feature = "flate2"))]
            {
                Err(Error::NonSupportedCompression(name.to_string()))
            }
        } else {
            Ok(Self::PlainFile(BufReader::new(fd)))
        }
    }
}

impl Read for BufferedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::PlainFile(h) => h.read(buf),
            #[cfg(feature = "flate2")]
            Self::GzFile(h) => h.read(buf),
        }
    }
}

impl BufRead for BufferedReader {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        match self {
            Self::PlainFile(h) => h.fill_buf(),
            #[cfg(feature = "flate2")]
            Self::GzFile(h) => h.fill_buf(),
        }
    }
    fn consume(&mut self, s: usize) {
        match self {
            Self::PlainFile(h) => h.consume(s),
            #[cfg(feature = "flate2")]
            Self::GzFile(h) => h.consume(s),
        }
    }
}
