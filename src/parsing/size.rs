//! Byte-size parsing and formatting
//!
//! Sizes are written as a decimal number followed by an optional magnitude
//! suffix, e.g. `"100"`, `"1.5K"`, `"20 G"`.

use crate::error::{Error, Result};

/// Magnitude suffixes in ascending order; index + 1 is the exponent
const SUFFIXES: [char; 5] = ['K', 'M', 'G', 'T', 'P'];

/// Multiplier between consecutive suffixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeFactor {
    /// Powers of 1024
    #[default]
    Binary,
    /// Powers of 1000
    Decimal,
}

impl SizeFactor {
    pub fn base(&self) -> u64 {
        match self {
            SizeFactor::Binary => 1024,
            SizeFactor::Decimal => 1000,
        }
    }
}

impl TryFrom<u64> for SizeFactor {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            1024 => Ok(SizeFactor::Binary),
            1000 => Ok(SizeFactor::Decimal),
            other => Err(Error::UserInput(format!(
                "size factor must be 1024 or 1000, got {}",
                other
            ))),
        }
    }
}

/// Parse a size string (e.g. `"1K"`, `"1.5 G"`) into a plain number
pub fn parse_size(text: &str, factor: SizeFactor) -> Result<u64> {
    let s = text.trim();
    if s.is_empty() {
        return Err(Error::UserInput("empty size string".into()));
    }

    // Find where the number ends and the suffix begins
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let num_str = &s[..num_end];
    let suffix_str = s[num_end..].trim_start();

    if num_str.is_empty() {
        return Err(Error::UserInput(format!("missing number in size '{}'", text)));
    }

    let exponent = match suffix_str.chars().collect::<Vec<_>>().as_slice() {
        [] => 0,
        [c] => {
            let upper = c.to_ascii_uppercase();
            SUFFIXES
                .iter()
                .position(|s| *s == upper)
                .map(|i| i as u32 + 1)
                .ok_or_else(|| {
                    Error::UserInput(format!("unknown size suffix '{}' in '{}'", suffix_str, text))
                })?
        }
        _ => {
            return Err(Error::UserInput(format!(
                "unknown size suffix '{}' in '{}'",
                suffix_str, text
            )))
        }
    };

    let multiplier = factor.base().pow(exponent);
    let overflow = || Error::UserInput(format!("size '{}' is too large", text));

    if num_str.contains('.') {
        let num: f64 = num_str.parse().map_err(|_| {
            Error::UserInput(format!("invalid number '{}' in size '{}'", num_str, text))
        })?;
        let value = num * multiplier as f64;
        if value >= u64::MAX as f64 {
            return Err(overflow());
        }
        Ok(value as u64)
    } else {
        let num: u64 = num_str.parse().map_err(|_| overflow())?;
        num.checked_mul(multiplier).ok_or_else(overflow)
    }
}

/// Format a number with the largest suffix that keeps the mantissa >= 1
///
/// The suffix slot is always preceded by a space, so `0` renders as `"0 "`
/// and `1024` as `"1 K"`.
pub fn format_size(value: u64, factor: SizeFactor) -> String {
    let base = factor.base() as f64;
    let mut mantissa = value as f64;
    let mut exponent = 0;
    while mantissa >= base && exponent < SUFFIXES.len() {
        mantissa /= base;
        exponent += 1;
    }

    let mut number = format!("{:.2}", mantissa);
    if number.ends_with(".00") {
        number.truncate(number.len() - 3);
    }

    let suffix = match exponent {
        0 => String::new(),
        n => SUFFIXES[n - 1].to_string(),
    };
    format!("{} {}", number, suffix)
}
