//! Time zones for rendered timestamps
//!
//! A [`Zone`] is either an IANA zone (`Asia/Kolkata`, `America/New_York`)
//! whose offset follows daylight saving time, or a fixed UTC offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use chrono_tz::Tz;

use super::formatter::{FormatError, parse_utc_offset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Zone {
    /// Accepts `UTC`, `Z`, an IANA name or an offset like `+05:30`
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let s = input.trim();
        if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
            return Ok(Zone::Named(Tz::UTC));
        }
        if s.starts_with(['+', '-']) {
            return parse_utc_offset(s).map(Zone::Fixed);
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| FormatError::TimeZone(input.to_string()))
    }

    /// IANA name, or the offset as `+05:30`
    pub fn name(&self) -> String {
        match self {
            Zone::Named(tz) => tz.name().to_string(),
            Zone::Fixed(offset) => offset.to_string(),
        }
    }

    /// Offset in effect at `timestamp`
    pub fn offset_at(&self, timestamp: &DateTime<Utc>) -> FixedOffset {
        match self {
            Zone::Named(tz) => timestamp.with_timezone(tz).offset().fix(),
            Zone::Fixed(offset) => *offset,
        }
    }

    pub fn format(&self, timestamp: &DateTime<Utc>, date_format: &str) -> String {
        match self {
            Zone::Named(tz) => timestamp.with_timezone(tz).format(date_format).to_string(),
            Zone::Fixed(offset) => timestamp.with_timezone(offset).format(date_format).to_string(),
        }
    }
}

impl FromStr for Zone {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::parse(s)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Zone::Fixed(offset)
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_names_and_offsets() {
        assert_eq!(Zone::parse("Asia/Kolkata").unwrap(), Zone::Named(chrono_tz::Asia::Kolkata));
        assert_eq!(Zone::parse("utc").unwrap(), Zone::Named(Tz::UTC));
        assert_eq!(Zone::parse("+05:30").unwrap().name(), "+05:30");
        assert!(matches!(Zone::parse("Mars/Olympus"), Err(FormatError::TimeZone(_))));
        assert!(Zone::parse("+05:75").is_err());
    }

    #[test]
    fn test_dst_zone_offset_follows_date() {
        let zone = Zone::parse("America/New_York").unwrap();
        let january = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let july = Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(zone.offset_at(&january).local_minus_utc(), -5 * 3600);
        assert_eq!(zone.offset_at(&july).local_minus_utc(), -4 * 3600);
        assert_eq!(zone.format(&january, "%H:%M %:z"), "07:00 -05:00");
        assert_eq!(zone.format(&july, "%H:%M %:z"), "08:00 -04:00");
    }

    #[test]
    fn test_fixed_offset_ignores_date() {
        let zone = Zone::from(parse_utc_offset("+05:30").unwrap());
        let january = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let july = Utc.with_ymd_and_hms(2026, 7, 15, 12, 0, 0).unwrap();
        assert_eq!(zone.offset_at(&january), zone.offset_at(&july));
        assert_eq!(zone.format(&july, "%H:%M"), "17:30");
    }
}
