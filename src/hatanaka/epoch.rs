//! Epoch descriptor decoding
use crate::{
    hatanaka::{header::ObsTypeTable, layout::Layout},
    prn::Prn,
    Error,
};

/// Reasons for dropping a single epoch
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// Recovered descriptor is not framed as expected,
    /// or its number of satellites is not readable
    Descriptor,
    /// Satellite list is shorter than announced
    SatelliteList,
    /// A difference continues an arc that was never opened
    MissingArc,
    /// Unreadable numeric literal or arc order
    Literal,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Descriptor => write!(f, "invalid epoch descriptor"),
            Self::SatelliteList => write!(f, "truncated satellite list"),
            Self::MissingArc => write!(f, "difference without arc initialization"),
            Self::Literal => write!(f, "invalid numeric field"),
        }
    }
}

/// Outcome of a failed epoch decoding step
#[derive(Debug)]
pub enum EpochError {
    /// This epoch is lost, decoding carries on
    Drop(DropReason),
    /// Decoding cannot go on
    Fatal(Error),
}

impl From<Error> for EpochError {
    fn from(e: Error) -> Self {
        Self::Fatal(e)
    }
}

/// Satellite of the current epoch
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Satellite {
    pub prn: Prn,
    /// Number of observation types
    pub numobs: usize,
}

/// Recovered epoch descriptor and its satellites
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    /// Recovered RINEX descriptor, including the complete satellite list
    pub descriptor: Vec<u8>,
    /// Event flag (ASCII digit)
    pub flag: u8,
    pub satellites: Vec<Satellite>,
}

impl EpochRecord {
    /// Interprets a recovered descriptor
    pub fn parse(
        descriptor: &[u8],
        layout: &Layout,
        rinex_major: u8,
        obs_types: &ObsTypeTable,
    ) -> Result<Self, EpochError> {
        if !layout.is_valid_descriptor(descriptor) {
            return Err(EpochError::Drop(DropReason::Descriptor));
        }

        let numsat = layout
            .numsat(descriptor)
            .ok_or(EpochError::Drop(DropReason::Descriptor))?;

        let list = descriptor.get(layout.sat_list..).unwrap_or_default();

        let mut satellites = Vec::with_capacity(numsat);
        for i in 0..numsat {
            let prn = list
                .get(i * 3..)
                .and_then(Prn::from_bytes)
                .ok_or(EpochError::Drop(DropReason::SatelliteList))?;
            let numobs = obs_types.count(rinex_major, prn.system())?;
            satellites.push(Satellite { prn, numobs });
        }

        Ok(Self {
            descriptor: descriptor.to_vec(),
            flag: descriptor[layout.event_flag],
            satellites,
        })
    }

    pub fn numsat(&self) -> usize {
        self.satellites.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hatanaka::layout::{V2, V3};

    fn v2_table() -> ObsTypeTable {
        let mut table = ObsTypeTable::default();
        table
            .amend(b"     3    C1    L1    S1                                    # / TYPES OF OBSERV")
            .unwrap();
        table
    }

    fn v3_table() -> ObsTypeTable {
        let mut table = ObsTypeTable::default();
        table
            .amend(b"G    4 C1C L1C D1C S1C                                      SYS / # / OBS TYPES")
            .unwrap();
        table
            .amend(b"R    2 C1C L1C                                              SYS / # / OBS TYPES")
            .unwrap();
        table
    }

    #[test]
    fn v2_descriptor() {
        let table = v2_table();
        let record = EpochRecord::parse(
            b" 21 12 28  0  0  0.0000000  0  3G01G02 12",
            &V2,
            2,
            &table,
        )
        .unwrap();
        assert_eq!(record.flag, b'0');
        assert_eq!(record.numsat(), 3);
        assert_eq!(record.satellites[0].prn, Prn(*b"G01"));
        assert_eq!(record.satellites[2].prn, Prn(*b" 12"));
        assert!(record.satellites.iter().all(|sat| sat.numobs == 3));

        match EpochRecord::parse(b" 21 12 28  0  0  0.0000000  0  3G01G02", &V2, 2, &table) {
            Err(EpochError::Drop(DropReason::SatelliteList)) => {},
            other => panic!("unexpected result {:?}", other),
        }
        match EpochRecord::parse(b" 21 12 28  0  0  0.0000000 10  3G01G02 12", &V2, 2, &table) {
            Err(EpochError::Drop(DropReason::Descriptor)) => {},
            other => panic!("unexpected result {:?}", other),
        }
        match EpochRecord::parse(b" 21 12 28  0  0  0.0000000  0  ?G01G02 12", &V2, 2, &table) {
            Err(EpochError::Drop(DropReason::Descriptor)) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn v3_descriptor() {
        let table = v3_table();
        let record = EpochRecord::parse(
            b"> 2022 03 04 00 00  0.0000000  0  3      G01R05G12",
            &V3,
            3,
            &table,
        )
        .unwrap();
        assert_eq!(record.numsat(), 3);
        assert_eq!(
            record.satellites.iter().map(|sat| sat.numobs).collect::<Vec<_>>(),
            vec![4, 2, 4]
        );

        match EpochRecord::parse(
            b"> 2022 03 04 00 00  0.0000000  0  2      G01E05",
            &V3,
            3,
            &table,
        ) {
            Err(EpochError::Fatal(Error::UndefinedSystem('E'))) => {},
            other => panic!("unexpected result {:?}", other),
        }

        // empty epochs are legal
        let record =
            EpochRecord::parse(b"> 2022 03 04 00 00  0.0000000  0  0", &V3, 3, &table).unwrap();
        assert_eq!(record.numsat(), 0);
    }
}
