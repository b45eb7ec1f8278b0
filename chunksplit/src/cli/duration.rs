use std::fmt;
use std::time::Duration;

/// Parse a chunk length given on the command line or typed in the window.
///
/// # Grammar
///
/// ```text
/// duration   = seconds | component ( separators component )* ;
/// seconds    = number ;
/// component  = number separators? unit ;
/// number     = digits [ "." digits ] ;
/// unit       = "ms" | "s" | "m" | "h" ;
/// separators = { whitespace | "_" } ;
/// ```
///
/// A bare number is a count of seconds, so `180` and `3m` are the same length.
/// Each unit may appear once. The total must be a whole, non-zero number of
/// milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration, DurationParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    if let Some((index, found)) = trimmed.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(DurationParseError::UnexpectedChar { index, found });
    }

    let bytes = trimmed.as_bytes();
    let len = bytes.len();
    let mut index = 0usize;
    let mut seen_units = [false; Unit::COUNT];
    let mut total_ms: u128 = 0;
    let mut components = 0usize;

    while index < len {
        skip_separators(bytes, &mut index);
        if index >= len {
            break;
        }

        let (mantissa, scale, number_len) = parse_number(bytes, index)?;
        index += number_len;

        skip_separators(bytes, &mut index);
        let unit = if index >= len && components == 0 {
            Unit::Second
        } else if index >= len {
            return Err(DurationParseError::ExpectedUnit { index, found: None });
        } else {
            let (unit, unit_len) = parse_unit(trimmed, bytes, index)?;
            index += unit_len;
            unit
        };

        if std::mem::replace(&mut seen_units[unit.index()], true) {
            return Err(DurationParseError::DuplicateUnit { unit });
        }

        total_ms = total_ms
            .checked_add(component_millis(mantissa, scale, unit)?)
            .ok_or(DurationParseError::Overflow)?;
        components += 1;
    }

    if components == 0 {
        return Err(DurationParseError::ExpectedNumber {
            index: 0,
            found: trimmed.bytes().next().map(char::from),
        });
    }

    if total_ms == 0 {
        return Err(DurationParseError::Zero);
    }

    let total_ms = u64::try_from(total_ms).map_err(|_| DurationParseError::TooLarge)?;
    Ok(Duration::from_millis(total_ms))
}

fn component_millis(mantissa: u128, scale: u32, unit: Unit) -> Result<u128, DurationParseError> {
    let max_precision = unit.max_scale();
    let too_precise = DurationParseError::FractionalTooPrecise {
        unit,
        max_precision,
    };
    if scale > max_precision {
        return Err(too_precise);
    }

    let product = mantissa
        .checked_mul(unit.millis())
        .ok_or(DurationParseError::Overflow)?;
    let divisor = 10u128.pow(scale);
    if product % divisor != 0 {
        return Err(too_precise);
    }

    Ok(product / divisor)
}

fn parse_number(bytes: &[u8], mut index: usize) -> Result<(u128, u32, usize), DurationParseError> {
    if index >= bytes.len() {
        return Err(DurationParseError::ExpectedNumber { index, found: None });
    }

    if !bytes[index].is_ascii_digit() {
        return Err(DurationParseError::ExpectedNumber {
            index,
            found: Some(bytes[index] as char),
        });
    }

    let start = index;
    let mut mantissa: u128 = 0;
    let mut scale: u32 = 0;
    let mut decimal_index = None;

    while index < bytes.len() {
        match bytes[index] {
            digit @ b'0'..=b'9' => {
                mantissa = mantissa
                    .checked_mul(10)
                    .and_then(|m| m.checked_add(u128::from(digit - b'0')))
                    .ok_or(DurationParseError::Overflow)?;
                if decimal_index.is_some() {
                    scale += 1;
                }
            }
            b'.' if decimal_index.is_none() => decimal_index = Some(index),
            b'.' => return Err(DurationParseError::UnexpectedChar { index, found: '.' }),
            _ => break,
        }
        index += 1;
    }

    if let (Some(dot), 0) = (decimal_index, scale) {
        return Err(DurationParseError::MissingFractionDigits { index: dot });
    }

    Ok((mantissa, scale, index - start))
}

fn parse_unit(
    original: &str,
    bytes: &[u8],
    index: usize,
) -> Result<(Unit, usize), DurationParseError> {
    let remaining = &bytes[index..];
    if remaining.starts_with(b"ms") {
        return Ok((Unit::Millisecond, 2));
    }
    if remaining.starts_with(b"s") {
        return Ok((Unit::Second, 1));
    }
    if remaining.starts_with(b"m") {
        return Ok((Unit::Minute, 1));
    }
    if remaining.starts_with(b"h") {
        return Ok((Unit::Hour, 1));
    }

    let mut end = index;
    while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }

    if end > index {
        return Err(DurationParseError::UnknownUnit {
            index,
            found: original[index..end].to_string(),
        });
    }

    Err(DurationParseError::ExpectedUnit {
        index,
        found: Some(bytes[index] as char),
    })
}

fn skip_separators(bytes: &[u8], index: &mut usize) {
    while *index < bytes.len() {
        match bytes[*index] {
            b'_' => *index += 1,
            b if b.is_ascii_whitespace() => *index += 1,
            _ => break,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    Empty,
    ExpectedNumber { index: usize, found: Option<char> },
    ExpectedUnit { index: usize, found: Option<char> },
    UnknownUnit { index: usize, found: String },
    DuplicateUnit { unit: Unit },
    MissingFractionDigits { index: usize },
    FractionalTooPrecise { unit: Unit, max_precision: u32 },
    UnexpectedChar { index: usize, found: char },
    Zero,
    Overflow,
    TooLarge,
}

impl std::error::Error for DurationParseError {}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Empty => write!(f, "duration cannot be empty"),
            DurationParseError::ExpectedNumber { index, found } => match found {
                Some(ch) => write!(
                    f,
                    "expected a number at position {} but found '{}'",
                    index + 1,
                    ch
                ),
                None => write!(f, "expected a number at position {}", index + 1),
            },
            DurationParseError::ExpectedUnit { index, found } => match found {
                Some(ch) => write!(
                    f,
                    "expected a unit at position {} but found '{}'",
                    index + 1,
                    ch
                ),
                None => write!(f, "expected a unit at position {}", index + 1),
            },
            DurationParseError::UnknownUnit { index, found } => {
                write!(f, "unknown unit '{}' at position {}", found, index + 1)
            }
            DurationParseError::DuplicateUnit { unit } => write!(
                f,
                "unit '{}' appears multiple times; durations may not repeat units",
                unit.symbol()
            ),
            DurationParseError::MissingFractionDigits { index } => write!(
                f,
                "expected digits after decimal point at position {}",
                index + 1
            ),
            DurationParseError::FractionalTooPrecise {
                unit,
                max_precision,
            } => write!(
                f,
                "fractional precision for '{}' is limited to {} digits",
                unit.symbol(),
                max_precision
            ),
            DurationParseError::UnexpectedChar { index, found } => write!(
                f,
                "unexpected character '{}' at position {}",
                found,
                index + 1
            ),
            DurationParseError::Zero => write!(f, "duration must be at least one millisecond"),
            DurationParseError::Overflow => write!(f, "duration component is too large"),
            DurationParseError::TooLarge => write!(
                f,
                "duration exceeds the maximum of {} milliseconds",
                u64::MAX
            ),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Unit {
    Millisecond = 0,
    Second = 1,
    Minute = 2,
    Hour = 3,
}

impl Unit {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }

    fn millis(self) -> u128 {
        match self {
            Unit::Millisecond => 1,
            Unit::Second => 1_000,
            Unit::Minute => 60_000,
            Unit::Hour => 3_600_000,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Unit::Millisecond => "ms",
            Unit::Second => "s",
            Unit::Minute => "m",
            Unit::Hour => "h",
        }
    }

    /// Fraction digits that still land on a whole millisecond.
    fn max_scale(self) -> u32 {
        let mut value = self.millis();
        let mut zeros = 0u32;
        while value.is_multiple_of(10) {
            value /= 10;
            zeros += 1;
        }
        zeros
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_duration(input: &str, expected: Duration) {
        let actual = parse_duration(input).unwrap();
        assert_eq!(actual, expected, "input: {input}");
    }

    #[test]
    fn bare_numbers_are_seconds() {
        assert_duration("180", Duration::from_secs(180));
        assert_duration(" 90 ", Duration::from_secs(90));
        assert_duration("1.5", Duration::from_millis(1_500));
    }

    #[test]
    fn parses_unit_components() {
        assert_duration("500ms", Duration::from_millis(500));
        assert_duration("3m", Duration::from_secs(180));
        assert_duration("2m30s", Duration::from_secs(150));
        assert_duration("1h 30m", Duration::from_secs(5_400));
        assert_duration("1h_30m", Duration::from_secs(5_400));
        assert_duration("0.5h", Duration::from_secs(1_800));
    }

    #[test]
    fn bare_number_cannot_mix_with_units() {
        assert!(matches!(
            parse_duration("3m 30"),
            Err(DurationParseError::ExpectedUnit { .. })
        ));
        assert!(matches!(
            parse_duration("30 3m"),
            Err(DurationParseError::ExpectedUnit { .. })
        ));
    }

    #[test]
    fn rejects_unknown_and_uppercase_units() {
        assert!(matches!(
            parse_duration("5x"),
            Err(DurationParseError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse_duration("10S"),
            Err(DurationParseError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse_duration("m30"),
            Err(DurationParseError::ExpectedNumber { .. })
        ));
    }

    #[test]
    fn rejects_repeated_units() {
        assert!(matches!(
            parse_duration("1m1m"),
            Err(DurationParseError::DuplicateUnit { unit: Unit::Minute })
        ));
    }

    #[test]
    fn rejects_zero_and_sub_millisecond_values() {
        assert_eq!(parse_duration("0"), Err(DurationParseError::Zero));
        assert_eq!(parse_duration("0ms"), Err(DurationParseError::Zero));
        assert!(matches!(
            parse_duration("0.5ms"),
            Err(DurationParseError::FractionalTooPrecise {
                unit: Unit::Millisecond,
                ..
            })
        ));
        assert!(matches!(
            parse_duration("1.0001s"),
            Err(DurationParseError::FractionalTooPrecise { unit: Unit::Second, .. })
        ));
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert!(matches!(
            parse_duration("1."),
            Err(DurationParseError::MissingFractionDigits { .. })
        ));
        assert!(matches!(
            parse_duration("1.2.3s"),
            Err(DurationParseError::UnexpectedChar { found: '.', .. })
        ));
        assert!(matches!(
            parse_duration("-5"),
            Err(DurationParseError::ExpectedNumber { .. })
        ));
    }

    #[test]
    fn detects_overflow() {
        let overflow = format!("{}ms", u128::from(u64::MAX) + 1);
        assert_eq!(parse_duration(&overflow), Err(DurationParseError::TooLarge));
    }
}
