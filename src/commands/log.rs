use colored::*;
use eyre::{Context, Result};
use std::io::{self, BufRead, Write};

use grabbag::logging::{Level, LevelFormatter, LogRecord, Zone};

use crate::cli::LogAction;
use crate::config::Config;

pub fn run(action: LogAction, config: &Config) -> Result<()> {
    match action {
        LogAction::Format {
            full,
            time_zone,
            templates,
            date_format,
        } => {
            let formatter = build_formatter(full, time_zone.as_deref(), &templates, date_format, config)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            format_lines(&formatter, stdin.lock(), &mut stdout.lock())
        }
    }
}

fn build_formatter(
    full: bool,
    time_zone: Option<&str>,
    templates: &[String],
    date_format: Option<String>,
    config: &Config,
) -> Result<LevelFormatter> {
    let mut builder = if full {
        LevelFormatter::full_builder()
    } else {
        LevelFormatter::compact_builder()
    };

    let tz = match time_zone {
        Some(tz) => Some(Zone::parse(tz)?),
        None => config.time_zone()?,
    };
    if let Some(tz) = tz {
        builder = builder.time_zone(tz);
    }
    if let Some(date_format) = date_format {
        builder = builder.date_format(date_format);
    }
    for spec in templates {
        let (level, template) = parse_template_arg(spec)?;
        builder = builder.template(level, template);
    }

    builder.build().context("Invalid formatter configuration")
}

/// Split `LEVEL=TEMPLATE`
fn parse_template_arg(spec: &str) -> Result<(Level, String)> {
    let (level, template) = spec
        .split_once('=')
        .ok_or_else(|| eyre::eyre!("Expected LEVEL=TEMPLATE, got {:?}", spec))?;
    let level: Level = level.parse().map_err(|e| eyre::eyre!("{}", e))?;
    Ok((level, template.to_string()))
}

/// Format every JSON line; bad lines are reported and skipped
fn format_lines(formatter: &LevelFormatter, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    let mut failed = 0usize;

    for (n, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let rendered = serde_json::from_str::<LogRecord>(&line)
            .map_err(|e| e.to_string())
            .and_then(|record| formatter.format(&record).map_err(|e| e.to_string()));

        match rendered {
            Ok(text) => writeln!(out, "{}", text)?,
            Err(e) => {
                failed += 1;
                eprintln!("{} line {}: {}", "✗".red(), n + 1, e);
            }
        }
    }

    if failed > 0 {
        eyre::bail!("{} record(s) could not be formatted", failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatter(full: bool, templates: &[&str]) -> LevelFormatter {
        let templates: Vec<String> = templates.iter().map(|s| s.to_string()).collect();
        build_formatter(full, Some("UTC"), &templates, None, &Config::default()).unwrap()
    }

    #[test]
    fn test_parse_template_arg() {
        let (level, template) = parse_template_arg("warn={level}: {msg}").unwrap();
        assert_eq!(level, Level::Warning);
        assert_eq!(template, "{level}: {msg}");
        assert!(parse_template_arg("no-equals").is_err());
        assert!(parse_template_arg("loud={msg}").is_err());
    }

    #[test]
    fn test_format_lines_with_override() {
        let f = formatter(false, &["info={level}|{msg}"]);
        let input = "{\"level\":\"info\",\"msg\":\"hello\",\"time\":\"2024-03-01T10:00:00Z\"}\n\n";
        let mut out = Vec::new();
        format_lines(&f, input.as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "INFO|hello\n");
    }

    #[test]
    fn test_format_lines_reports_bad_records() {
        let f = formatter(true, &[]);
        let input = "not json\n{\"level\":\"error\",\"msg\":\"x\"}\n";
        let mut out = Vec::new();
        let err = format_lines(&f, input.as_bytes(), &mut out).unwrap_err();
        assert!(err.to_string().contains("2 record(s)"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_named_time_zone_in_full_layout() {
        let f = build_formatter(true, Some("America/New_York"), &["error={time}".to_string()], None, &Config::default()).unwrap();
        let input = "{\"level\":\"error\",\"msg\":\"x\",\"time\":\"2024-07-01T16:00:00Z\"}\n";
        let mut out = Vec::new();
        format_lines(&f, input.as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2024-07-01 12:00:00 PM (America/New_York)\n");
    }

    #[test]
    fn test_bad_time_zone_rejected() {
        assert!(build_formatter(false, Some("somewhere"), &[], None, &Config::default()).is_err());
    }
}
