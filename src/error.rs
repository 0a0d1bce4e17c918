use thiserror::Error;

/// Errors that abort the decoding of a complete file.
/// Errors limited to a single epoch never surface here:
/// that epoch is dropped and decoding carries on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("this is not a CRINEX file")]
    NotACrinex,
    #[error("non supported CRINEX revision \"{0}\"")]
    NonSupportedCrinexVersion(String),
    #[error("non supported RINEX revision \"{0}\"")]
    NonSupportedRinexVersion(String),
    #[error("missing RINEX VERSION / TYPE")]
    MissingRinexVersion,
    /// Valid header lines are at least 61 byte long
    #[error("header line is too short")]
    HeaderLineTooShort,
    #[error("missing END OF HEADER")]
    MissingEndOfHeader,
    #[error("invalid number of observation types")]
    InvalidObsTypeCount,
    #[error("observation types are not defined")]
    UndefinedObsTypes,
    #[error("undefined GNSS system '{0}'")]
    UndefinedSystem(char),
    #[error("difference order {0} exceeds maximal order {1}")]
    OrderTooBig(usize, usize),
    #[error("clock offset out of range")]
    ClockOffsetOutOfRange,
    #[error("observation out of range")]
    ObservationOutOfRange,
    #[error("numeric field \"{0}\" exceeds 64 bit storage")]
    NumericOverflow(String),
    #[error("premature end of stream")]
    PrematureEnd,
    #[error("non supported compression: \"{0}\"")]
    NonSupportedCompression(String),
    #[error("can't derive output file name from \"{0}\"")]
    OutputFilename(String),
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attaches the 1-based input line number
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Self::Line { .. } => self,
            source => Self::Line {
                line,
                source: Box::new(source),
            },
        }
    }
    /// Returns the input line number, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Error;
    #[test]
    fn line_numbering() {
        let e = Error::ClockOffsetOutOfRange.at_line(12);
        assert_eq!(e.line(), Some(12));
        assert_eq!(e.to_string(), "line 12: clock offset out of range");
        // never nested twice
        let e = e.at_line(13);
        assert_eq!(e.line(), Some(12));
        assert!(Error::PrematureEnd.line().is_none());
    }
}
