//! TOML date and time values.
//!
//! TOML distinguishes four shapes of temporal value, and [`Datetime`] keeps
//! them apart instead of coercing everything to an instant:
//!
//! | Text | Variant |
//! |---|---|
//! | `1979-05-27T07:32:00Z`, `1979-05-27 07:32:00-07:00` | [`Datetime::OffsetDateTime`] |
//! | `1979-05-27T07:32:00` | [`Datetime::LocalDateTime`] |
//! | `1979-05-27` | [`Datetime::LocalDate`] |
//! | `07:32:00.999` | [`Datetime::LocalTime`] |
//!
//! ```rust
//! use datafmt::Datetime;
//!
//! let dt: Datetime = "1979-05-27 07:32:00Z".parse().unwrap();
//! assert!(matches!(dt, Datetime::OffsetDateTime(_)));
//! assert_eq!(dt.to_string(), "1979-05-27T07:32:00Z");
//! ```

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Newtype-struct name used to carry a datetime through serde untouched.
pub(crate) const DATETIME_TOKEN: &str = "$__datafmt_private_Datetime";

/// A TOML date, time or date-time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Datetime {
    OffsetDateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
}

/// Why a date/time literal was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DatetimeError {
    #[error("malformed date, expected YYYY-MM-DD")]
    MalformedDate,
    #[error("date does not exist in the calendar")]
    InvalidDate,
    #[error("malformed time, expected HH:MM:SS")]
    MalformedTime,
    #[error("time component out of range")]
    InvalidTime,
    #[error("malformed offset, expected Z or ±HH:MM")]
    MalformedOffset,
    #[error("offset out of range")]
    InvalidOffset,
    #[error("unexpected characters after date-time")]
    TrailingCharacters,
}

impl Datetime {
    /// The calendar date, when the value has one.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Datetime::OffsetDateTime(dt) => Some(dt.date_naive()),
            Datetime::LocalDateTime(dt) => Some(dt.date()),
            Datetime::LocalDate(d) => Some(*d),
            Datetime::LocalTime(_) => None,
        }
    }

    /// The wall-clock time, when the value has one.
    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            Datetime::OffsetDateTime(dt) => Some(dt.time()),
            Datetime::LocalDateTime(dt) => Some(dt.time()),
            Datetime::LocalDate(_) => None,
            Datetime::LocalTime(t) => Some(*t),
        }
    }

    /// The UTC offset of an offset date-time.
    #[must_use]
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Datetime::OffsetDateTime(dt) => Some(*dt.offset()),
            _ => None,
        }
    }
}

impl FromStr for Datetime {
    type Err = DatetimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.as_bytes();
        if b.get(2) == Some(&b':') {
            let (time, end) = parse_time(b, 0)?;
            if end != b.len() {
                return Err(DatetimeError::TrailingCharacters);
            }
            return Ok(Datetime::LocalTime(time));
        }

        let date = parse_date(b)?;
        if b.len() == 10 {
            return Ok(Datetime::LocalDate(date));
        }
        if !matches!(b[10], b'T' | b't' | b' ') {
            return Err(DatetimeError::TrailingCharacters);
        }
        let (time, mut i) = parse_time(b, 11)?;
        let local = NaiveDateTime::new(date, time);
        if i == b.len() {
            return Ok(Datetime::LocalDateTime(local));
        }

        let seconds = match b[i] {
            b'Z' | b'z' => {
                i += 1;
                0
            }
            sign @ (b'+' | b'-') => {
                if b.len() < i + 6 || b[i + 3] != b':' {
                    return Err(DatetimeError::MalformedOffset);
                }
                let hours = two_digits(b, i + 1).ok_or(DatetimeError::MalformedOffset)?;
                let minutes = two_digits(b, i + 4).ok_or(DatetimeError::MalformedOffset)?;
                if hours > 23 || minutes > 59 {
                    return Err(DatetimeError::InvalidOffset);
                }
                i += 6;
                let total = (hours * 3600 + minutes * 60) as i32;
                if sign == b'-' {
                    -total
                } else {
                    total
                }
            }
            _ => return Err(DatetimeError::TrailingCharacters),
        };
        if i != b.len() {
            return Err(DatetimeError::TrailingCharacters);
        }
        let offset = FixedOffset::east_opt(seconds).ok_or(DatetimeError::InvalidOffset)?;
        offset
            .from_local_datetime(&local)
            .single()
            .map(Datetime::OffsetDateTime)
            .ok_or(DatetimeError::InvalidOffset)
    }
}

fn two_digits(b: &[u8], i: usize) -> Option<u32> {
    match (b.get(i), b.get(i + 1)) {
        (Some(x @ b'0'..=b'9'), Some(y @ b'0'..=b'9')) => {
            Some(u32::from(x - b'0') * 10 + u32::from(y - b'0'))
        }
        _ => None,
    }
}

fn parse_date(b: &[u8]) -> Result<NaiveDate, DatetimeError> {
    if b.len() < 10 || b[4] != b'-' || b[7] != b'-' {
        return Err(DatetimeError::MalformedDate);
    }
    let century = two_digits(b, 0).ok_or(DatetimeError::MalformedDate)?;
    let year = two_digits(b, 2).ok_or(DatetimeError::MalformedDate)?;
    let month = two_digits(b, 5).ok_or(DatetimeError::MalformedDate)?;
    let day = two_digits(b, 8).ok_or(DatetimeError::MalformedDate)?;
    NaiveDate::from_ymd_opt((century * 100 + year) as i32, month, day)
        .ok_or(DatetimeError::InvalidDate)
}

/// Parses `HH:MM:SS[.fraction]` at `start`, returning the time and the
/// index just past it.
fn parse_time(b: &[u8], start: usize) -> Result<(NaiveTime, usize), DatetimeError> {
    if b.len() < start + 8 || b[start + 2] != b':' || b[start + 5] != b':' {
        return Err(DatetimeError::MalformedTime);
    }
    let hour = two_digits(b, start).ok_or(DatetimeError::MalformedTime)?;
    let minute = two_digits(b, start + 3).ok_or(DatetimeError::MalformedTime)?;
    let second = two_digits(b, start + 6).ok_or(DatetimeError::MalformedTime)?;
    let mut i = start + 8;

    let mut nanos = 0u32;
    if b.get(i) == Some(&b'.') {
        i += 1;
        let digits_start = i;
        let mut scale = 100_000_000u32;
        while let Some(d @ b'0'..=b'9') = b.get(i) {
            // precision beyond nanoseconds is truncated
            nanos += u32::from(d - b'0') * scale;
            scale /= 10;
            i += 1;
        }
        if i == digits_start {
            return Err(DatetimeError::MalformedTime);
        }
    }

    if hour > 23 || minute > 59 || second > 60 {
        return Err(DatetimeError::InvalidTime);
    }
    // chrono represents a leap second as :59 with an extra second of nanos
    let (second, nanos) = if second == 60 {
        (59, nanos + 1_000_000_000)
    } else {
        (second, nanos)
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
        .map(|t| (t, i))
        .ok_or(DatetimeError::InvalidTime)
}

fn write_time(f: &mut fmt::Formatter<'_>, t: &NaiveTime) -> fmt::Result {
    write!(f, "{}", t.format("%H:%M:%S"))?;
    let nanos = t.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        write!(f, ".{}", frac.trim_end_matches('0'))?;
    }
    Ok(())
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datetime::OffsetDateTime(dt) => {
                write!(f, "{}T", dt.format("%Y-%m-%d"))?;
                write_time(f, &dt.time())?;
                if dt.offset().fix().local_minus_utc() == 0 {
                    f.write_str("Z")
                } else {
                    write!(f, "{}", dt.format("%:z"))
                }
            }
            Datetime::LocalDateTime(dt) => {
                write!(f, "{}T", dt.format("%Y-%m-%d"))?;
                write_time(f, &dt.time())
            }
            Datetime::LocalDate(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Datetime::LocalTime(t) => write_time(f, t),
        }
    }
}

impl From<DateTime<FixedOffset>> for Datetime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Datetime::OffsetDateTime(value)
    }
}

impl From<NaiveDateTime> for Datetime {
    fn from(value: NaiveDateTime) -> Self {
        Datetime::LocalDateTime(value)
    }
}

impl From<NaiveDate> for Datetime {
    fn from(value: NaiveDate) -> Self {
        Datetime::LocalDate(value)
    }
}

impl From<NaiveTime> for Datetime {
    fn from(value: NaiveTime) -> Self {
        Datetime::LocalTime(value)
    }
}

impl Serialize for Datetime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(DATETIME_TOKEN, &self.to_string())
    }
}

impl<'de> Deserialize<'de> for Datetime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DatetimeVisitor;

        impl<'de> de::Visitor<'de> for DatetimeVisitor {
            type Value = Datetime;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a TOML date, time or date-time")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Datetime, E> {
                value.parse().map_err(E::custom)
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Datetime, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_str(self)
            }
        }

        deserializer.deserialize_newtype_struct(DATETIME_TOKEN, DatetimeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Datetime {
        s.parse().unwrap()
    }

    #[test]
    fn test_four_shapes() {
        assert!(matches!(parse("1979-05-27T07:32:00Z"), Datetime::OffsetDateTime(_)));
        assert!(matches!(parse("1979-05-27T07:32:00"), Datetime::LocalDateTime(_)));
        assert!(matches!(parse("1979-05-27"), Datetime::LocalDate(_)));
        assert!(matches!(parse("07:32:00"), Datetime::LocalTime(_)));
    }

    #[test]
    fn test_offsets() {
        let dt = parse("1979-05-27T00:32:00-07:00");
        assert_eq!(dt.offset().map(|o| o.local_minus_utc()), Some(-7 * 3600));
        assert_eq!(dt.to_string(), "1979-05-27T00:32:00-07:00");
        assert_eq!(parse("1979-05-27t07:32:00z").to_string(), "1979-05-27T07:32:00Z");
    }

    #[test]
    fn test_fraction_truncated_to_nanos() {
        let dt = parse("07:32:00.1234567891");
        assert_eq!(dt.time().map(|t| t.nanosecond()), Some(123_456_789));
        assert_eq!(dt.to_string(), "07:32:00.123456789");
        assert_eq!(parse("07:32:00.500").to_string(), "07:32:00.5");
    }

    #[test]
    fn test_leap_second() {
        let dt = parse("1990-12-31T23:59:60Z");
        assert_eq!(dt.to_string(), "1990-12-31T23:59:60Z");
    }

    #[test]
    fn test_rejects() {
        assert_eq!("1979-02-30".parse::<Datetime>(), Err(DatetimeError::InvalidDate));
        assert_eq!("1979-5-27".parse::<Datetime>(), Err(DatetimeError::MalformedDate));
        assert_eq!("24:00:00".parse::<Datetime>(), Err(DatetimeError::InvalidTime));
        assert_eq!("07:32:00.".parse::<Datetime>(), Err(DatetimeError::MalformedTime));
        assert_eq!("07:32".parse::<Datetime>(), Err(DatetimeError::MalformedTime));
        assert_eq!("7:32:00".parse::<Datetime>(), Err(DatetimeError::MalformedDate));
        assert_eq!(
            "1979-05-27T07:32:00+7".parse::<Datetime>(),
            Err(DatetimeError::MalformedOffset)
        );
        assert_eq!(
            "1979-05-27T07:32:00Zx".parse::<Datetime>(),
            Err(DatetimeError::TrailingCharacters)
        );
    }
}
