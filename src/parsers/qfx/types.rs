use crate::errors::StatementParseError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw OFX date-time text, e.g. `20251226120000.000[-5:EST]`.
#[derive(Debug, Clone, Serialize)]
pub struct QfxDate(String);

impl<'de> Deserialize<'de> for QfxDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(QfxDate)
    }
}

impl From<String> for QfxDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QfxDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl QfxDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn digits<T: std::str::FromStr>(s: &str) -> Result<T, StatementParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StatementParseError::QfxDateInvalidFormat);
    }
    s.parse().map_err(|_| StatementParseError::QfxDateInvalidFormat)
}

/// Parses the bracketed zone suffix: `-5:EST`, `0:GMT`, `+5.30:IST`, `-3`.
/// Hours may carry `.MM` minutes; the zone name is ignored.
fn parse_offset(zone: &str) -> Result<FixedOffset, StatementParseError> {
    let offset = zone.split(':').next().unwrap_or_default().trim();
    if offset.is_empty() {
        return FixedOffset::east_opt(0).ok_or(StatementParseError::QfxDateInvalidFormat);
    }

    let (negative, unsigned) = match offset.as_bytes()[0] {
        b'-' => (true, &offset[1..]),
        b'+' => (false, &offset[1..]),
        _ => (false, offset),
    };
    let (hours, minutes) = match unsigned.split_once('.') {
        Some((h, m)) => (digits::<i32>(h)?, digits::<i32>(m)?),
        None => (digits::<i32>(unsigned)?, 0),
    };
    if hours > 23 || minutes > 59 {
        return Err(StatementParseError::QfxDateInvalidFormat);
    }

    let seconds = (hours * 3600 + minutes * 60) * if negative { -1 } else { 1 };
    FixedOffset::east_opt(seconds).ok_or(StatementParseError::QfxDateInvalidFormat)
}

impl TryFrom<QfxDate> for DateTime<FixedOffset> {
    type Error = StatementParseError;

    fn try_from(date_str: QfxDate) -> Result<Self, Self::Error> {
        let raw = date_str.0.trim();

        let (stamp, zone) = match raw.split_once('[') {
            Some((stamp, rest)) => {
                let zone = rest
                    .strip_suffix(']')
                    .ok_or(StatementParseError::QfxDateInvalidFormat)?;
                (stamp.trim(), Some(zone))
            }
            None => (raw, None),
        };
        let (clock, fraction) = match stamp.split_once('.') {
            Some((clock, fraction)) => (clock, Some(fraction)),
            None => (stamp, None),
        };

        if !matches!(clock.len(), 8 | 12 | 14) || !clock.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StatementParseError::QfxDateInvalidFormat);
        }

        let date = NaiveDate::from_ymd_opt(
            digits(&clock[0..4])?,
            digits(&clock[4..6])?,
            digits(&clock[6..8])?,
        )
        .ok_or(StatementParseError::QfxDateInvalidFormat)?;

        let (hour, minute, second) = match clock.len() {
            8 => (0, 0, 0),
            12 => (digits(&clock[8..10])?, digits(&clock[10..12])?, 0),
            _ => (
                digits(&clock[8..10])?,
                digits(&clock[10..12])?,
                digits(&clock[12..14])?,
            ),
        };

        let nanos = match fraction {
            Some(f) if f.len() > 9 => return Err(StatementParseError::QfxDateInvalidFormat),
            Some(f) => digits::<u32>(f)? * 10u32.pow(9 - f.len() as u32),
            None => 0,
        };

        let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
            .ok_or(StatementParseError::QfxDateInvalidFormat)?;
        let offset = parse_offset(zone.unwrap_or_default())?;

        offset
            .from_local_datetime(&NaiveDateTime::new(date, time))
            .single()
            .ok_or(StatementParseError::QfxDateInvalidFormat)
    }
}
