//! Calendar duration parsing
//!
//! Durations are written as concatenated `{count}{unit}` tokens in strictly
//! descending unit order, e.g. `1Y20W30D40H50M`, or as a bare number of
//! minutes.

use crate::error::{Error, Result};

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;
const MINUTES_PER_WEEK: u64 = 7 * MINUTES_PER_DAY;
const MINUTES_PER_YEAR: u64 = 365 * MINUTES_PER_DAY;

/// Unit letters from largest to smallest
const UNITS: [char; 5] = ['Y', 'W', 'D', 'H', 'M'];

/// Decomposition of a duration string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationComponents {
    pub years: u64,
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl DurationComponents {
    /// Total length in minutes, `None` on overflow
    pub fn total_minutes(&self) -> Option<u64> {
        [
            (self.years, MINUTES_PER_YEAR),
            (self.weeks, MINUTES_PER_WEEK),
            (self.days, MINUTES_PER_DAY),
            (self.hours, MINUTES_PER_HOUR),
            (self.minutes, 1),
        ]
        .iter()
        .try_fold(0u64, |total, (count, per_unit)| {
            total.checked_add(count.checked_mul(*per_unit)?)
        })
    }

    fn slot(&mut self, rank: usize) -> &mut u64 {
        match rank {
            0 => &mut self.years,
            1 => &mut self.weeks,
            2 => &mut self.days,
            3 => &mut self.hours,
            _ => &mut self.minutes,
        }
    }
}

/// Split a duration string into its components
pub fn parse_duration_components(text: &str) -> Result<DurationComponents> {
    let s = text.trim();
    if s.is_empty() {
        return Err(Error::UserInput("empty duration string".into()));
    }

    let invalid =
        |reason: &str| Error::UserInput(format!("invalid duration '{}': {}", text, reason));
    let parse_count = |digits: &str| {
        digits
            .parse::<u64>()
            .map_err(|_| Error::UserInput(format!("duration count '{}' is too large", digits)))
    };

    let mut components = DurationComponents::default();

    if s.bytes().all(|b| b.is_ascii_digit()) {
        components.minutes = parse_count(s)?;
        return Ok(components);
    }

    let mut rest = s;
    let mut last_rank: Option<usize> = None;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(invalid("expected a number before each unit"));
        }
        let count = parse_count(&rest[..digits_end])?;

        let unit = rest[digits_end..]
            .chars()
            .next()
            .ok_or_else(|| invalid("trailing number has no unit"))?;
        let rank = UNITS
            .iter()
            .position(|u| *u == unit.to_ascii_uppercase())
            .ok_or_else(|| invalid(&format!("unknown unit '{}'", unit)))?;

        if last_rank.is_some_and(|last| rank <= last) {
            return Err(invalid("units must appear in Y, W, D, H, M order"));
        }
        last_rank = Some(rank);
        *components.slot(rank) = count;

        rest = &rest[digits_end + unit.len_utf8()..];
    }

    Ok(components)
}

/// Parse a duration string into its components and their total in minutes
pub fn parse_duration(text: &str) -> Result<(DurationComponents, u64)> {
    let components = parse_duration_components(text)?;
    let minutes = components
        .total_minutes()
        .ok_or_else(|| Error::UserInput(format!("duration '{}' is too large", text)))?;
    Ok((components, minutes))
}

/// Parse a duration string into a total number of minutes
pub fn parse_duration_minutes(text: &str) -> Result<u64> {
    parse_duration(text).map(|(_, minutes)| minutes)
}
