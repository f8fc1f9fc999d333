//! Level-aware formatter
//!
//! A [`LevelFormatter`] maps each [`Level`] to a [`Template`]. Records at a
//! level with no template of their own use the default template. Levels at
//! or above the full-mode threshold (default [`Level::Error`]) render in
//! [`FormatMode::Full`]: context fields the record does not carry show as
//! `<unknown>` instead of disappearing.
//!
//! Date formats are strftime strings. A literal `{zone}` in one is replaced
//! by the zone name (or the local offset when no zone is set).

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Utc};
use thiserror::Error;

use super::record::{Level, LogRecord};
use super::template::{Field, Template};
use super::zone::Zone;

/// Layout used when a level has no template of its own
pub const COMPACT_FORMAT: &str = "{module:<20} {line:<4} :           {msg}";

/// Layout carrying time, level, location and thread
pub const FULL_FORMAT: &str =
    "[{level:<8}] [{time}]   {line:<4} - {module:<20} :           {msg:<100}           [{thread}]";

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format of the full layout
pub const FULL_DATE_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p ({zone})";

/// Stands for the zone name inside a date format
pub const ZONE_TOKEN: &str = "{zone}";

const UNKNOWN: &str = "<unknown>";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A required record field is absent
    #[error("malformed record: missing required field '{field}'")]
    MalformedRecord { field: &'static str },

    /// A template or date format could not be parsed
    #[error("invalid template \"{template}\": {reason}")]
    Template { template: String, reason: String },

    /// A time zone could not be parsed
    #[error("invalid time zone \"{0}\" (expected e.g. Asia/Kolkata, +05:30, -0800 or UTC)")]
    TimeZone(String),
}

/// Rendering mode, derived from the record level only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    Compact,
    Full,
}

/// Formats records with a template chosen by level
#[derive(Debug, Clone)]
pub struct LevelFormatter {
    templates: BTreeMap<Level, Template>,
    default_template: Template,
    time_zone: Option<Zone>,
    date_format: String,
    full_from: Level,
}

impl LevelFormatter {
    pub fn builder() -> LevelFormatterBuilder {
        LevelFormatterBuilder::default()
    }

    /// Compact per-level layout used for terminal output
    pub fn compact(time_zone: Option<Zone>) -> Result<Self, FormatError> {
        with_zone(Self::compact_builder(), time_zone).build()
    }

    /// Full per-level layout used for log files
    pub fn full(time_zone: Option<Zone>) -> Result<Self, FormatError> {
        with_zone(Self::full_builder(), time_zone).build()
    }

    /// Builder preloaded with the compact layout; later templates win
    pub fn compact_builder() -> LevelFormatterBuilder {
        Self::standard_builder(COMPACT_FORMAT, DEFAULT_DATE_FORMAT)
    }

    /// Builder preloaded with the full layout; later templates win
    pub fn full_builder() -> LevelFormatterBuilder {
        Self::standard_builder(FULL_FORMAT, FULL_DATE_FORMAT)
    }

    fn standard_builder(layout: &str, date_format: &str) -> LevelFormatterBuilder {
        Self::builder()
            .template(Level::Trace, format!("~   {}", layout))
            .template(Level::Debug, format!("~   {}", layout))
            .template(Level::Info, format!(">   {}", layout))
            .template(Level::Warning, format!("[!] {}", layout))
            .template(Level::Error, format!("[x] {}", layout))
            .template(Level::Critical, format!("[x] {}", layout))
            .default_template(layout)
            .date_format(date_format)
    }

    /// Mode a record at `level` renders in
    pub fn mode_for(&self, level: Level) -> FormatMode {
        if level >= self.full_from {
            FormatMode::Full
        } else {
            FormatMode::Compact
        }
    }

    /// Template used for `level`
    pub fn template_for(&self, level: Level) -> &Template {
        self.templates.get(&level).unwrap_or(&self.default_template)
    }

    pub fn time_zone(&self) -> Option<Zone> {
        self.time_zone
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Render the timestamp in the configured zone, or local time
    pub fn format_time(&self, timestamp: &DateTime<Utc>) -> String {
        let date_format: Cow<'_, str> = if self.date_format.contains(ZONE_TOKEN) {
            let label = match &self.time_zone {
                Some(zone) => zone.name(),
                None => timestamp.with_timezone(&Local).format("%:z").to_string(),
            };
            Cow::Owned(self.date_format.replace(ZONE_TOKEN, &label))
        } else {
            Cow::Borrowed(&self.date_format)
        };

        match &self.time_zone {
            Some(zone) => zone.format(timestamp, &date_format),
            None => timestamp.with_timezone(&Local).format(&date_format).to_string(),
        }
    }

    pub fn format(&self, record: &LogRecord) -> Result<String, FormatError> {
        let level = record.level.ok_or(FormatError::MalformedRecord { field: "level" })?;
        let message = record
            .message
            .as_deref()
            .ok_or(FormatError::MalformedRecord { field: "message" })?;
        let timestamp = record
            .timestamp
            .as_ref()
            .ok_or(FormatError::MalformedRecord { field: "timestamp" })?;

        let missing = match self.mode_for(level) {
            FormatMode::Compact => "",
            FormatMode::Full => UNKNOWN,
        };
        let template = self.template_for(level);
        let rendered = template.render(|field| match field {
            Field::Message => Cow::Borrowed(message),
            Field::Level => Cow::Borrowed(level.as_str()),
            Field::Time => Cow::Owned(self.format_time(timestamp)),
            Field::Location => match &record.location {
                Some(loc) => Cow::Owned(loc.to_string()),
                None => Cow::Borrowed(missing),
            },
            Field::Line => match &record.location {
                Some(loc) => Cow::Owned(loc.line.to_string()),
                None => Cow::Borrowed(missing),
            },
            Field::File => or_missing(record.location.as_ref().map(|l| l.file.as_str()), missing),
            Field::Module => or_missing(record.module.as_deref().or(record.target.as_deref()), missing),
            Field::Target => or_missing(record.target.as_deref(), missing),
            Field::Thread => or_missing(record.thread.as_deref(), missing),
        });

        Ok(rendered)
    }
}

fn or_missing<'a>(value: Option<&'a str>, missing: &'a str) -> Cow<'a, str> {
    Cow::Borrowed(value.unwrap_or(missing))
}

/// Builder for [`LevelFormatter`]
///
/// Templates are kept as strings until [`build`](Self::build), which parses
/// all of them and reports the first failure.
#[derive(Debug, Clone)]
pub struct LevelFormatterBuilder {
    templates: Vec<(Level, String)>,
    default_template: String,
    time_zone: Option<Zone>,
    date_format: String,
    full_from: Level,
}

impl Default for LevelFormatterBuilder {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            default_template: COMPACT_FORMAT.to_string(),
            time_zone: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            full_from: Level::Error,
        }
    }
}

impl LevelFormatterBuilder {
    pub fn template(mut self, level: Level, template: impl Into<String>) -> Self {
        self.templates.push((level, template.into()));
        self
    }

    pub fn templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = (Level, S)>,
        S: Into<String>,
    {
        self.templates
            .extend(templates.into_iter().map(|(level, t)| (level, t.into())));
        self
    }

    pub fn default_template(mut self, template: impl Into<String>) -> Self {
        self.default_template = template.into();
        self
    }

    pub fn time_zone(mut self, zone: impl Into<Zone>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    pub fn date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Lowest level rendered in full mode
    pub fn full_from(mut self, level: Level) -> Self {
        self.full_from = level;
        self
    }

    pub fn build(self) -> Result<LevelFormatter, FormatError> {
        validate_date_format(&self.date_format)?;

        let mut templates = BTreeMap::new();
        for (level, source) in &self.templates {
            templates.insert(*level, Template::parse(source)?);
        }

        Ok(LevelFormatter {
            templates,
            default_template: Template::parse(&self.default_template)?,
            time_zone: self.time_zone,
            date_format: self.date_format,
            full_from: self.full_from,
        })
    }
}

fn with_zone(builder: LevelFormatterBuilder, time_zone: Option<Zone>) -> LevelFormatterBuilder {
    match time_zone {
        Some(tz) => builder.time_zone(tz),
        None => builder,
    }
}

fn validate_date_format(date_format: &str) -> Result<(), FormatError> {
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::Template {
            template: date_format.to_string(),
            reason: "invalid date format".to_string(),
        });
    }
    Ok(())
}

/// Parse `UTC`, `Z`, `+05:30`, `-0800` or `+03` into an offset
pub fn parse_utc_offset(input: &str) -> Result<FixedOffset, FormatError> {
    let s = input.trim();
    let err = || FormatError::TimeZone(input.to_string());

    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(err);
    }

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => return Err(err()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }

    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().map_err(|_| err())?, 0),
        4 => (
            digits[..2].parse::<i32>().map_err(|_| err())?,
            digits[2..].parse::<i32>().map_err(|_| err())?,
        ),
        _ => return Err(err()),
    };

    if minutes >= 60 {
        return Err(err());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn error_scenario() -> LevelFormatter {
        LevelFormatter::builder()
            .template(Level::Error, "[ERR] {msg} @ {loc}")
            .default_template("{msg}")
            .build()
            .unwrap()
    }

    #[test]
    fn test_error_level_uses_its_template_with_location() {
        let f = error_scenario();
        let record = LogRecord::new(Level::Error, "disk full")
            .at(noon())
            .with_location("src/store.rs", 42);
        assert_eq!(f.format(&record).unwrap(), "[ERR] disk full @ src/store.rs:42");
    }

    #[test]
    fn test_unmapped_level_uses_default_template() {
        let f = error_scenario();
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warning, Level::Critical] {
            let record = LogRecord::new(level, "plain").at(noon()).with_location("a.rs", 1);
            assert_eq!(f.format(&record).unwrap(), "plain");
        }
    }

    #[test]
    fn test_mapped_levels_match_their_templates() {
        let f = LevelFormatter::builder()
            .templates([(Level::Info, "I {msg}"), (Level::Warning, "W {msg}")])
            .default_template("D {msg}")
            .build()
            .unwrap();
        let fmt = |level| f.format(&LogRecord::new(level, "m").at(noon())).unwrap();
        assert_eq!(fmt(Level::Info), "I m");
        assert_eq!(fmt(Level::Warning), "W m");
        assert_eq!(fmt(Level::Debug), "D m");
    }

    #[test]
    fn test_mode_is_function_of_level() {
        let f = error_scenario();
        assert_eq!(f.mode_for(Level::Warning), FormatMode::Compact);
        assert_eq!(f.mode_for(Level::Error), FormatMode::Full);
        assert_eq!(f.mode_for(Level::Critical), FormatMode::Full);

        let lowered = LevelFormatter::builder().full_from(Level::Warning).build().unwrap();
        assert_eq!(lowered.mode_for(Level::Warning), FormatMode::Full);
    }

    #[test]
    fn test_missing_location_depends_on_mode() {
        let f = LevelFormatter::builder()
            .default_template("{msg}|{loc}|{thread}")
            .build()
            .unwrap();
        let mut info = LogRecord::new(Level::Info, "a").at(noon());
        let mut error = LogRecord::new(Level::Error, "b").at(noon());
        info.thread = None;
        error.thread = None;
        assert_eq!(f.format(&info).unwrap(), "a||");
        assert_eq!(f.format(&error).unwrap(), "b|<unknown>|<unknown>");
    }

    #[test]
    fn test_time_zone_changes_only_timestamp() {
        let base = LevelFormatter::builder().default_template("{time} :: {level} {msg}");
        let utc = base.clone().time_zone(parse_utc_offset("UTC").unwrap()).build().unwrap();
        let ist = base.time_zone(parse_utc_offset("+05:30").unwrap()).build().unwrap();

        let record = LogRecord::new(Level::Info, "tick").at(noon());
        let a = utc.format(&record).unwrap();
        let b = ist.format(&record).unwrap();

        assert_eq!(a, "2026-03-14 12:00:00 :: INFO tick");
        assert_eq!(b, "2026-03-14 17:30:00 :: INFO tick");
        assert_eq!(a.split(" :: ").nth(1), b.split(" :: ").nth(1));
    }

    #[test]
    fn test_missing_required_fields() {
        let f = error_scenario();

        let no_level = LogRecord {
            message: Some("m".into()),
            timestamp: Some(noon()),
            ..Default::default()
        };
        assert_eq!(
            f.format(&no_level).unwrap_err(),
            FormatError::MalformedRecord { field: "level" }
        );

        let no_message = LogRecord {
            level: Some(Level::Info),
            timestamp: Some(noon()),
            ..Default::default()
        };
        assert_eq!(
            f.format(&no_message).unwrap_err(),
            FormatError::MalformedRecord { field: "message" }
        );

        let no_time = LogRecord {
            level: Some(Level::Info),
            message: Some("m".into()),
            ..Default::default()
        };
        assert_eq!(
            f.format(&no_time).unwrap_err(),
            FormatError::MalformedRecord { field: "timestamp" }
        );
    }

    #[test]
    fn test_every_level_formats_with_standard_layouts() {
        let compact = LevelFormatter::compact(None).unwrap();
        let full = LevelFormatter::full(Some(parse_utc_offset("+00:00").unwrap().into())).unwrap();
        for level in Level::ALL {
            let record = LogRecord::new(level, "msg").at(noon());
            assert!(compact.format(&record).unwrap().contains("msg"));
            assert!(full.format(&record).unwrap().contains("12:00:00 PM (+00:00)"));
        }
    }

    #[test]
    fn test_standard_prefixes() {
        let compact = LevelFormatter::compact(None).unwrap();
        let line = |level| compact.format(&LogRecord::new(level, "m").at(noon())).unwrap();
        assert!(line(Level::Debug).starts_with("~   "));
        assert!(line(Level::Info).starts_with(">   "));
        assert!(line(Level::Warning).starts_with("[!] "));
        assert!(line(Level::Error).starts_with("[x] "));
    }

    #[test]
    fn test_full_layout_names_the_zone() {
        let full = LevelFormatter::full(Some(Zone::parse("Asia/Kolkata").unwrap())).unwrap();
        let line = full.format(&LogRecord::new(Level::Info, "m").at(noon())).unwrap();
        assert!(line.contains("[2026-03-14 05:30:00 PM (Asia/Kolkata)]"), "{}", line);
    }

    #[test]
    fn test_named_zone_tracks_daylight_saving() {
        let f = LevelFormatter::builder()
            .default_template("{time}")
            .date_format("%H:%M %:z ({zone})")
            .time_zone(Zone::parse("America/New_York").unwrap())
            .build()
            .unwrap();
        let at = |month| LogRecord::new(Level::Info, "m").at(Utc.with_ymd_and_hms(2026, month, 15, 12, 0, 0).unwrap());

        assert_eq!(f.format(&at(1)).unwrap(), "07:00 -05:00 (America/New_York)");
        assert_eq!(f.format(&at(7)).unwrap(), "08:00 -04:00 (America/New_York)");
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let err = LevelFormatter::builder().date_format("%Y-%m-%").build().unwrap_err();
        assert!(matches!(err, FormatError::Template { .. }));
    }

    #[test]
    fn test_invalid_template_rejected() {
        let err = LevelFormatter::builder()
            .template(Level::Info, "{bogus}")
            .build()
            .unwrap_err();
        assert!(matches!(err, FormatError::Template { .. }));
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19800);
        assert_eq!(parse_utc_offset("-0800").unwrap().local_minus_utc(), -28800);
        assert_eq!(parse_utc_offset("+3").unwrap().local_minus_utc(), 10800);
        assert_eq!(parse_utc_offset("z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("Asia/Kolkata").is_err());
        assert!(parse_utc_offset("+05:75").is_err());
        assert!(parse_utc_offset("+99").is_err());
    }

    #[test]
    fn test_formatter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LevelFormatter>();
    }
}
