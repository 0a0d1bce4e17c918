//! RINEX formatting of recovered epochs
use crate::{
    hatanaka::{
        epoch::EpochRecord,
        field::SatelliteState,
        layout::{Layout, OBS_WIDTH, V2_DESCRIPTOR_WIDTH, V2_OBS_PER_LINE, V2_SATS_PER_LINE},
        numdiff::{ClockValue, ObsValue},
    },
    prn::Prn,
    Error,
};

use num_integer::div_ceil;
use std::io::Write;

fn trim_end(buf: &mut Vec<u8>, start: usize) {
    while buf.len() > start && buf.last() == Some(&b' ') {
        buf.pop();
    }
}

/// Formats the clock offset: two digits (or sign and digit) ahead of the
/// decimal point, then `shift` + 8 fractional digits.
pub fn format_clock(value: ClockValue, shift: usize, buf: &mut Vec<u8>) -> Result<(), Error> {
    let value = value.normalize();
    let digits = format!("{:0width$}", value.upper.unsigned_abs(), width = shift);
    let (integer, fraction) = digits.split_at(digits.len() - shift);

    let integer = if value.is_negative() {
        format!("-{}", integer)
    } else {
        integer.to_string()
    };

    if integer.len() > 2 {
        return Err(Error::ClockOffsetOutOfRange);
    }

    write!(
        buf,
        "{:>2}.{}{:08}",
        integer,
        fraction,
        value.lower.unsigned_abs()
    )?;
    Ok(())
}

/// Formats one observation (F14.3), without its flags.
/// Zero integer parts are not printed: 0.123 is formatted as ".123".
pub fn format_observation(value: ObsValue, buf: &mut Vec<u8>) -> Result<(), Error> {
    let value = value.normalize();
    if value.upper > 99_999_999 || value.upper < -9_999_999 {
        return Err(Error::ObservationOutOfRange);
    }

    let lower = value.lower.unsigned_abs();
    let integer = value.upper.unsigned_abs() * 100 + lower / 1000;

    let integer = match (value.is_negative(), integer) {
        (false, 0) => String::new(),
        (true, 0) => "-".to_string(),
        (false, integer) => integer.to_string(),
        (true, integer) => format!("-{}", integer),
    };

    write!(buf, "{:>10}.{:03}", integer, lower % 1000)?;
    Ok(())
}

/// Formats the epoch descriptor, with its clock offset if any
pub fn format_epoch(
    layout: &Layout,
    record: &EpochRecord,
    clock: Option<ClockValue>,
    buf: &mut Vec<u8>,
) -> Result<(), Error> {
    let descriptor = &record.descriptor;

    let width = if layout.is_v2() {
        V2_DESCRIPTOR_WIDTH
    } else {
        layout.sat_list
    };

    let start = buf.len();
    buf.extend_from_slice(&descriptor[..width.min(descriptor.len())]);

    match clock {
        Some(clock) => {
            buf.resize(start + width, b' ');
            format_clock(clock, layout.clock_shift, buf)?;
        },
        None => {
            if !layout.is_v2() {
                trim_end(buf, start);
            }
        },
    }

    buf.push(b'\n');

    if layout.is_v2() {
        // satellite list continuation
        let lines = div_ceil(record.numsat(), V2_SATS_PER_LINE);
        for i in 1..lines {
            let offset = layout.sat_list + i * V2_SATS_PER_LINE * 3;
            let end = (offset + V2_SATS_PER_LINE * 3).min(descriptor.len());
            let start = buf.len();
            buf.extend_from_slice(&[b' '; 32]);
            buf.extend_from_slice(descriptor.get(offset..end).unwrap_or_default());
            trim_end(buf, start);
            buf.push(b'\n');
        }
    }

    Ok(())
}

/// Formats the observations of one satellite
pub fn format_observations(
    layout: &Layout,
    prn: &Prn,
    state: &SatelliteState,
    buf: &mut Vec<u8>,
) -> Result<(), Error> {
    let mut start = buf.len();

    if !layout.is_v2() {
        buf.extend_from_slice(prn.as_bytes());
    }

    let numobs = state.fields.len();

    for (i, field) in state.fields.iter().enumerate() {
        match field {
            Some(kernel) => format_observation(kernel.value(), buf)?,
            None => buf.extend_from_slice(&[b' '; OBS_WIDTH]),
        }

        buf.extend_from_slice(&state.flags(i));

        if i + 1 == numobs || (layout.is_v2() && (i + 1) % V2_OBS_PER_LINE == 0) {
            trim_end(buf, start);
            buf.push(b'\n');
            start = buf.len();
        }
    }

    Ok(())
}

/// Formats a placeholder comment record (event flag 4)
pub fn format_comment(layout: &Layout, comment: &str, buf: &mut Vec<u8>) -> Result<(), Error> {
    if layout.is_v2() {
        write!(buf, "{:29}{:3}\n{:<60}COMMENT\n", 4, 1, comment)?;
    } else {
        write!(buf, ">{:31}{:3}\n{:<60}COMMENT\n", 4, 1, comment)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hatanaka::{
        epoch::Satellite,
        layout::{V2, V3},
        numdiff::ObsDiff,
    };

    fn clock(upper: i64, lower: i64, shift: usize) -> Result<String, Error> {
        let mut buf = Vec::new();
        format_clock(ClockValue::new(upper, lower), shift, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    fn observation(scaled: i128) -> String {
        let mut buf = Vec::new();
        format_observation(ObsValue::from_scaled(scaled), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn clock_formatting() {
        for (upper, lower, shift, expected) in [
            (0, 1000, 1, "  .000001000"),
            (0, 1005, 1, "  .000001005"),
            (-1, -5, 1, " -.100000005"),
            (5, 12345678, 1, "  .512345678"),
            (12, 0, 1, " 1.200000000"),
            (123, 0, 1, "12.300000000"),
            (-12, -1, 1, "-1.200000001"),
            (0, -1, 1, " -.000000001"),
            (0, 1000, 4, "  .000000001000"),
            (-1234, -5, 4, " -.123400000005"),
            (12345, 0, 4, " 1.234500000000"),
            // non normalized input
            (-1, 99999999, 1, " -.000000001"),
        ] {
            assert_eq!(
                clock(upper, lower, shift).unwrap(),
                expected,
                "failed for ({}, {})",
                upper,
                lower
            );
        }
        for (upper, lower, shift) in [(1234, 0, 1), (-123, 0, 1), (1234567, 0, 4)] {
            match clock(upper, lower, shift) {
                Err(Error::ClockOffsetOutOfRange) => {},
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn observation_formatting() {
        for (scaled, expected) in [
            (23619095450, "  23619095.450"),
            (-53875632, "    -53875.632"),
            (0, "          .000"),
            (5, "          .005"),
            (-5, "         -.005"),
            (123, "          .123"),
            (1234, "         1.234"),
            (-1234, "        -1.234"),
            (12345, "        12.345"),
            (-12345, "       -12.345"),
            (100000, "       100.000"),
            (-100500, "      -100.500"),
            (9999999999999, "9999999999.999"),
            (-999999999999, "-999999999.999"),
        ] {
            assert_eq!(observation(scaled), expected, "failed for {}", scaled);
        }
        let mut buf = Vec::new();
        for value in [ObsValue::new(100_000_000, 0), ObsValue::new(-10_000_000, 0)] {
            match format_observation(value, &mut buf) {
                Err(Error::ObservationOutOfRange) => {},
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    fn epoch_record(descriptor: &str, numsat: usize) -> EpochRecord {
        EpochRecord {
            descriptor: descriptor.as_bytes().to_vec(),
            flag: b'0',
            satellites: vec![
                Satellite {
                    prn: Prn(*b"G01"),
                    numobs: 1,
                };
                numsat
            ],
        }
    }

    #[test]
    fn v2_epoch_formatting() {
        let record = epoch_record(" 21 12 28  0  0  0.0000000  0  2G01G02", 2);
        let mut buf = Vec::new();
        format_epoch(&V2, &record, None, &mut buf).unwrap();
        assert_eq!(buf, b" 21 12 28  0  0  0.0000000  0  2G01G02\n");

        let mut buf = Vec::new();
        format_epoch(&V2, &record, Some(ClockValue::new(0, 1000)), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            format!(
                "{:<68}{}\n",
                " 21 12 28  0  0  0.0000000  0  2G01G02", "  .000001000"
            )
        );

        let sats = (1..=26).map(|prn| format!("G{:02}", prn)).collect::<String>();
        let record = epoch_record(&format!(" 21 12 28  0  0  0.0000000  0 26{}", sats), 26);
        let mut buf = Vec::new();
        format_epoch(&V2, &record, None, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            format!(
                " 21 12 28  0  0  0.0000000  0 26{}\n{:32}{}\n{:32}{}\n",
                &sats[..36],
                "",
                &sats[36..72],
                "",
                &sats[72..]
            )
        );
    }

    #[test]
    fn v3_epoch_formatting() {
        let record = epoch_record("> 2022 03 04 00 00  0.0000000  0  1      G01", 1);
        let mut buf = Vec::new();
        format_epoch(&V3, &record, None, &mut buf).unwrap();
        assert_eq!(buf, b"> 2022 03 04 00 00  0.0000000  0  1\n");

        let mut buf = Vec::new();
        format_epoch(&V3, &record, Some(ClockValue::new(-1234, -5)), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "> 2022 03 04 00 00  0.0000000  0  1       -.123400000005\n"
        );

        // clock offset always starts at column 41, whatever the satellite count
        let record = epoch_record("> 2022 03 04 00 00  0.0000000  0  0", 0);
        let mut buf = Vec::new();
        format_epoch(&V3, &record, Some(ClockValue::new(-1234, -5)), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "> 2022 03 04 00 00  0.0000000  0  0       -.123400000005\n"
        );
    }

    #[test]
    fn observations_formatting() {
        let kernel = |scaled| Some(ObsDiff::new(ObsValue::from_scaled(scaled), 3).unwrap());
        let state = SatelliteState {
            fields: vec![kernel(23619095450), None, kernel(-53875632), None, None, kernel(45250)],
            flags: b" 6  18        ".to_vec(),
        };

        let mut buf = Vec::new();
        format_observations(&V2, &Prn(*b"G01"), &state, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "  23619095.450 6                    -53875.63218\n        45.250\n"
        );

        let mut buf = Vec::new();
        format_observations(&V3, &Prn(*b"G01"), &state, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "G01  23619095.450 6                    -53875.63218                                        45.250\n"
        );
    }

    #[test]
    fn comment_formatting() {
        let mut buf = Vec::new();
        format_comment(&V2, "  *** test ***", &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            format!("{:>29}{:>3}\n{:<60}COMMENT\n", "4", "1", "  *** test ***")
        );
        let mut buf = Vec::new();
        format_comment(&V3, "test", &mut buf).unwrap();
        let content = String::from_utf8(buf).unwrap();
        let lines = content.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], ">                              4  1");
        assert_eq!(lines[1].len(), 67);
        assert!(lines[1].ends_with("COMMENT"));
    }
}
