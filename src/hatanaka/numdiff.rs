//! Y. Hatanaka finite difference (numerical) kernel
use crate::Error;

/// Highest difference order the CRINEX format allows
pub const MAX_ORDER: usize = 5;

/// Clock offsets keep 8 fractional digits in the low part
pub const CLOCK_DIGITS: u32 = 8;

/// Observations keep 5 fractional digits in the low part
pub const OBS_DIGITS: u32 = 5;

/// [FixedPoint] stores a decimal integer as an `(upper, lower)` pair,
/// where lower holds the `D` least significant digits. Both parts always
/// carry the same sign once normalized, which makes the representation unique.
/// This allows integers wider than 64 bits to be accumulated without loss.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FixedPoint<const D: u32> {
    pub upper: i64,
    pub lower: i64,
}

pub type ClockValue = FixedPoint<CLOCK_DIGITS>;
pub type ObsValue = FixedPoint<OBS_DIGITS>;

/// Parsing outcome of a numeric literal
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralError {
    /// Not a decimal integer: the epoch cannot be recovered
    Invalid,
    /// Does not fit in 64 bit storage: decoding cannot go on
    Overflow,
}

impl<const D: u32> FixedPoint<D> {
    const SCALE: i64 = 10_i64.pow(D);

    pub const fn new(upper: i64, lower: i64) -> Self {
        Self { upper, lower }
    }

    /// Splits a decimal literal. Literals with more than `D` digits
    /// are split by position, shorter literals only fill the lower part.
    pub fn parse(literal: &[u8]) -> Result<Self, LiteralError> {
        let (negative, digits) = match literal.split_first() {
            Some((b'-', digits)) => (true, digits),
            _ => (false, literal),
        };
        if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_digit()) {
            return Err(LiteralError::Invalid);
        }
        let sign = if negative { -1 } else { 1 };
        let d = D as usize;
        if digits.len() <= d {
            let lower = parse_digits(digits)?;
            Ok(Self::new(0, sign * lower))
        } else {
            let (upper, lower) = digits.split_at(digits.len() - d);
            let upper = parse_digits(upper)?;
            let lower = parse_digits(lower)?;
            Ok(Self::new(sign * upper, sign * lower))
        }
    }

    /// Builds from a scaled integer, mostly used for testing purposes
    pub fn from_scaled(value: i128) -> Self {
        let scale = Self::SCALE as i128;
        Self::new((value / scale) as i64, (value % scale) as i64)
    }

    /// Returns the scaled integer this value represents
    pub fn scaled(&self) -> i128 {
        self.upper as i128 * Self::SCALE as i128 + self.lower as i128
    }

    /// Carries the lower part excess over to upper part
    fn fold(mut self) -> Option<Self> {
        self.upper = self.upper.checked_add(self.lower / Self::SCALE)?;
        self.lower %= Self::SCALE;
        Some(self)
    }

    /// Makes both parts carry the same sign
    pub fn normalize(mut self) -> Self {
        if self.upper < 0 && self.lower > 0 {
            self.upper += 1;
            self.lower -= Self::SCALE;
        } else if self.upper > 0 && self.lower < 0 {
            self.upper -= 1;
            self.lower += Self::SCALE;
        }
        self
    }

    /// True if this value is negative
    pub fn is_negative(&self) -> bool {
        self.upper < 0 || self.lower < 0
    }

    /// Normalized sum, None when the upper part overflows
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let upper = self.upper.checked_add(rhs.upper)?;
        let lower = self.lower.checked_add(rhs.lower)?;
        Some(Self::new(upper, lower).fold()?.normalize())
    }
}

fn parse_digits(digits: &[u8]) -> Result<i64, LiteralError> {
    digits.iter().try_fold(0_i64, |acc, b| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add((b - b'0') as i64))
            .ok_or(LiteralError::Overflow)
    })
}

/// [NumDiff] recovers one quantity (a clock offset, one observable
/// of one satellite) from its successive differences.
/// The arc opens with a literal value and declares its target order.
/// The working order then grows by one per epoch until it reaches
/// the arc order, after which it remains constant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NumDiff<const D: u32> {
    /// Current working order
    order: usize,
    /// Target order of this arc
    arc_order: usize,
    /// Accumulators, one per difference order
    acc: [FixedPoint<D>; MAX_ORDER + 1],
}

pub type ClockDiff = NumDiff<CLOCK_DIGITS>;
pub type ObsDiff = NumDiff<OBS_DIGITS>;

impl<const D: u32> NumDiff<D> {
    /// Opens a new arc of given order, starting from a literal value
    pub fn new(data: FixedPoint<D>, order: usize) -> Result<Self, Error> {
        if order > MAX_ORDER {
            return Err(Error::OrderTooBig(order, MAX_ORDER));
        }
        let mut acc = [FixedPoint::default(); MAX_ORDER + 1];
        acc[0] = data;
        Ok(Self {
            order: 0,
            arc_order: order,
            acc,
        })
    }

    /// Force kernel reset, opening a new arc
    pub fn force_init(&mut self, data: FixedPoint<D>, order: usize) -> Result<(), Error> {
        *self = Self::new(data, order)?;
        Ok(())
    }

    /// Integrates a new difference. Returns the recovered value.
    /// The kernel is left untouched when an accumulator overflows.
    pub fn decompress(&mut self, data: FixedPoint<D>) -> Result<FixedPoint<D>, Error> {
        let prev = self.acc;
        let (order, shift) = if self.order < self.arc_order {
            (self.order + 1, 0)
        } else {
            (self.order, 1)
        };
        let mut acc = self.acc;
        acc[0] = data;
        for k in 0..order {
            acc[k + 1] = acc[k]
                .checked_add(prev[k + shift])
                .ok_or_else(|| Error::NumericOverflow(data.scaled().to_string()))?;
        }
        self.acc = acc;
        self.order = order;
        Ok(self.value())
    }

    /// Returns the current recovered value
    pub fn value(&self) -> FixedPoint<D> {
        self.acc[self.order].normalize()
    }

    /// Current working order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Target order of current arc
    pub fn arc_order(&self) -> usize {
        self.arc_order
    }
}
