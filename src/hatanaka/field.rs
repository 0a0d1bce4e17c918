//! Clock offset and observation lines decoding
use crate::{
    hatanaka::{
        epoch::{DropReason, EpochError},
        numdiff::{ClockDiff, ClockValue, FixedPoint, LiteralError, ObsDiff, ObsValue},
        textdiff::TextDiff,
    },
    Error,
};

/// Recovered state of one satellite, at one epoch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SatelliteState {
    /// One kernel per observation type, None when blank
    pub fields: Vec<Option<ObsDiff>>,
    /// Two flags (LLI, SSI) per observation type
    pub flags: Vec<u8>,
}

impl SatelliteState {
    /// Flags of given observation type, blank when not defined
    pub fn flags(&self, index: usize) -> [u8; 2] {
        let lli = self.flags.get(2 * index).copied().unwrap_or(b' ');
        let ssi = self.flags.get(2 * index + 1).copied().unwrap_or(b' ');
        [lli, ssi]
    }
}

fn parse_literal<const D: u32>(literal: &[u8]) -> Result<FixedPoint<D>, EpochError> {
    FixedPoint::<D>::parse(literal).map_err(|e| match e {
        LiteralError::Invalid => EpochError::Drop(DropReason::Literal),
        LiteralError::Overflow => EpochError::Fatal(Error::NumericOverflow(
            String::from_utf8_lossy(literal).to_string(),
        )),
    })
}

/// Parses an arc order digit, which may not exceed given limit
fn parse_order(byte: u8, limit: usize) -> Result<usize, EpochError> {
    if !byte.is_ascii_digit() {
        return Err(EpochError::Drop(DropReason::Literal));
    }
    let order = (byte - b'0') as usize;
    if order > limit {
        return Err(EpochError::Fatal(Error::OrderTooBig(order, limit)));
    }
    Ok(order)
}

/// Decodes the clock line of current epoch.
/// Returns the clock kernel of this epoch, None when there is no clock offset.
/// The trailing picosecond token, if any, is recovered into `pico`.
pub fn decode_clock(
    line: &[u8],
    prev: Option<&ClockDiff>,
    pico: &mut TextDiff,
    limit: usize,
) -> Result<Option<ClockDiff>, EpochError> {
    let (token, rem) = match line.iter().position(|b| *b == b' ') {
        Some(pos) => (&line[..pos], &line[pos + 1..]),
        None => (line, &line[line.len()..]),
    };

    let _ = pico.decompress(rem);

    if token.is_empty() {
        return Ok(None);
    }

    if token.get(1) == Some(&b'&') {
        let order = parse_order(token[0], limit)?;
        let literal: ClockValue = parse_literal(&token[2..])?;
        Ok(Some(ClockDiff::new(literal, order)?))
    } else {
        let mut kernel = *prev.ok_or(EpochError::Drop(DropReason::MissingArc))?;
        let literal: ClockValue = parse_literal(token)?;
        kernel.decompress(literal)?;
        Ok(Some(kernel))
    }
}

/// Decodes the observation line of one satellite.
/// `prev` is the state of that same satellite at previous epoch, if it was observed.
pub fn decode_observations(
    line: &[u8],
    numobs: usize,
    prev: Option<&SatelliteState>,
    crinex_major: u8,
    limit: usize,
) -> Result<SatelliteState, EpochError> {
    let mut idx = 0;
    let mut fields = Vec::<Option<ObsDiff>>::with_capacity(numobs);

    for i in 0..numobs {
        match line.get(idx) {
            None | Some(b' ') => {
                fields.push(None);
                idx += 1;
                continue;
            },
            Some(_) => {},
        }

        let (order, start) = if line.get(idx + 1) == Some(&b'&') {
            (Some(parse_order(line[idx], limit)?), idx + 2)
        } else {
            (None, idx)
        };

        let end = line[start..]
            .iter()
            .position(|b| *b == b' ')
            .map(|pos| start + pos)
            .unwrap_or(line.len());

        let literal: ObsValue = parse_literal(&line[start..end])?;

        let kernel = match order {
            Some(order) => ObsDiff::new(literal, order)?,
            None => {
                let mut kernel = prev
                    .and_then(|prev| prev.fields.get(i).copied().flatten())
                    .ok_or(EpochError::Drop(DropReason::MissingArc))?;
                kernel.decompress(literal)?;
                kernel
            },
        };

        fields.push(Some(kernel));
        idx = end + 1;
    }

    // flags are recovered from previous flags of this satellite
    let mut textdiff = match prev {
        Some(prev) => TextDiff::new(&prev.flags),
        None => TextDiff::default(),
    };
    let mut flags = textdiff
        .decompress(line.get(idx..).unwrap_or_default())
        .to_vec();

    if flags.len() < 2 * numobs {
        flags.resize(2 * numobs, b' ');
    }

    if crinex_major == 1 {
        for (i, field) in fields.iter().enumerate() {
            if field.is_none() {
                flags[2 * i] = b' ';
                flags[2 * i + 1] = b' ';
            }
        }
    }

    Ok(SatelliteState { fields, flags })
}
