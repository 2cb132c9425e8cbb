//! Integer-only conversion of sentence number fields.

use core::fmt::Write;

use chrono::NaiveTime;

use crate::fix::Text;

/// 2^31 / 180, fixed-point units per degree
const FIXED_PER_DEGREE: i64 = 11_930_464;
/// 2^31 / 10800, fixed-point units per minute of arc
const FIXED_PER_MINUTE: i64 = 198_841;
const MINUTE_DECIMALS: usize = 5;
const MINUTE_SCALE: u32 = 100_000;

/// `(d)ddmm.mmmmm` as whole degrees plus minutes in 1e-5 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Coordinate {
    degrees: u32,
    minutes_e5: u32,
}

impl Coordinate {
    /// Parses a latitude (`max_degrees` 90) or longitude (180) field.
    pub(crate) fn parse(field: &[u8], max_degrees: u32) -> Option<Self> {
        let dot = field.iter().position(|&b| b == b'.').unwrap_or(field.len());
        let (whole, rest) = field.split_at(dot);
        if whole.len() < 3 {
            return None;
        }
        let (degree_digits, minute_digits) = whole.split_at(whole.len() - 2);
        let degrees = parse_digits(degree_digits)?;
        let minutes = parse_digits(minute_digits)?;
        let fraction = parse_fraction(rest.get(1..).unwrap_or_default(), MINUTE_DECIMALS)?;

        if minutes >= 60 || degrees > max_degrees {
            return None;
        }
        let minutes_e5 = minutes * MINUTE_SCALE + fraction;
        if degrees == max_degrees && minutes_e5 != 0 {
            return None;
        }
        Some(Self {
            degrees,
            minutes_e5,
        })
    }

    /// Degrees scaled by 2^31/180, negated for the southern/western hemisphere.
    pub(crate) fn to_fixed(self, negative: bool) -> i32 {
        let fixed = i64::from(self.degrees) * FIXED_PER_DEGREE
            + i64::from(self.minutes_e5) * FIXED_PER_MINUTE / i64::from(MINUTE_SCALE);
        // 180 degrees stays below i32::MAX with the truncated constants
        let fixed = i32::try_from(fixed).unwrap_or(i32::MAX);
        if negative {
            -fixed
        } else {
            fixed
        }
    }

    /// `dd.dddddd H`, decimal degrees with the hemisphere letter.
    pub(crate) fn to_text(self, hemisphere: u8) -> Option<Text> {
        // 1e-5 minutes to 1e-6 degrees
        let micro = self.minutes_e5 / 6;
        let mut text = Text::new();
        write!(
            text,
            "{}.{:06} {}",
            self.degrees,
            micro,
            char::from(hemisphere)
        )
        .ok()?;
        Some(text)
    }
}

fn parse_digits(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u32, |acc, &b| {
        if b.is_ascii_digit() {
            acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
        } else {
            None
        }
    })
}

/// Fraction digits as an integer with exactly `decimals` places. Extra
/// digits are dropped, missing ones count as zero.
fn parse_fraction(digits: &[u8], decimals: usize) -> Option<u32> {
    let mut value = 0u32;
    let mut taken = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        if taken < decimals {
            value = value.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
            taken += 1;
        }
    }
    for _ in taken..decimals {
        value = value.checked_mul(10)?;
    }
    Some(value)
}

/// Unsigned decimal as an integer with `decimals` implied decimal places,
/// `"010.2"` with 3 places is `10200`.
pub(crate) fn parse_scaled(field: &[u8], decimals: usize) -> Option<u32> {
    let dot = field.iter().position(|&b| b == b'.').unwrap_or(field.len());
    let (whole, rest) = field.split_at(dot);
    let fraction = rest.get(1..).unwrap_or_default();
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let whole = if whole.is_empty() {
        0
    } else {
        parse_digits(whole)?
    };
    let scale = 10u32.checked_pow(u32::try_from(decimals).ok()?)?;
    whole
        .checked_mul(scale)?
        .checked_add(parse_fraction(fraction, decimals)?)
}

/// Integer part of a signed decimal, `"-12.7"` is `-12`.
pub(crate) fn parse_integer_part(field: &[u8]) -> Option<i32> {
    let (negative, digits) = match field.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, field),
    };
    let dot = digits.iter().position(|&b| b == b'.').unwrap_or(digits.len());
    let (whole, rest) = digits.split_at(dot);
    let fraction = rest.get(1..).unwrap_or_default();
    if fraction.iter().any(|b| !b.is_ascii_digit()) {
        return None;
    }
    let value = if whole.is_empty() {
        if fraction.is_empty() {
            return None;
        }
        0
    } else {
        i32::try_from(parse_digits(whole)?).ok()?
    };
    Some(if negative { -value } else { value })
}

/// Small unsigned count or identifier, e.g. satellite ids.
pub(crate) fn parse_u8(field: &[u8]) -> Option<u8> {
    u8::try_from(parse_digits(field)?).ok()
}

/// `hhmmss(.sss)` as a time of day.
pub(crate) fn parse_time(field: &[u8]) -> Option<NaiveTime> {
    let dot = field.iter().position(|&b| b == b'.').unwrap_or(field.len());
    let (whole, rest) = field.split_at(dot);
    if whole.len() != 6 {
        return None;
    }
    let hour = parse_digits(&whole[0..2])?;
    let min = parse_digits(&whole[2..4])?;
    let sec = parse_digits(&whole[4..6])?;
    let milli = parse_fraction(rest.get(1..).unwrap_or_default(), 3)?;
    NaiveTime::from_hms_milli_opt(hour, min, sec, milli)
}

/// Field text followed by `suffix`, for the display strings.
pub(crate) fn text_with_suffix(field: &[u8], suffix: &str) -> Option<Text> {
    let mut text = Text::new();
    text.push_str(core::str::from_utf8(field).ok()?).ok()?;
    text.push_str(suffix).ok()?;
    Some(text)
}
