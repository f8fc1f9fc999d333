//! Format templates with named placeholders
//!
//! Syntax: `{field}` or `{field:<8}` / `{field:>4}` / `{field:^10}`.
//! `{{` and `}}` produce literal braces. Templates are parsed once, so an
//! unknown field or a malformed placeholder is reported at construction
//! time and rendering itself cannot fail.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::formatter::FormatError;

/// Fields a template can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Message,
    Level,
    Time,
    Location,
    Module,
    Line,
    File,
    Target,
    Thread,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "msg" | "message" => Some(Field::Message),
            "level" | "levelname" => Some(Field::Level),
            "time" | "asctime" => Some(Field::Time),
            "loc" | "location" => Some(Field::Location),
            "module" => Some(Field::Module),
            "line" | "lineno" => Some(Field::Line),
            "file" => Some(Field::File),
            "target" => Some(Field::Target),
            "thread" | "threadName" => Some(Field::Thread),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { field: Field, align: Align, width: usize },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut spec = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        spec.push(c);
                    }
                    if !closed {
                        return Err(template_error(source, "unclosed '{'"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_placeholder(source, &spec)?);
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether any placeholder refers to `field`
    pub fn uses(&self, field: Field) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder { field: f, .. } if *f == field))
    }

    /// Render with `value` supplying each placeholder's text
    pub fn render<'a, F>(&self, mut value: F) -> String
    where
        F: FnMut(Field) -> Cow<'a, str>,
    {
        let mut out = String::with_capacity(self.source.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { field, align, width } => {
                    let text = value(*field);
                    let padded = match align {
                        Align::Left => format!("{:<width$}", text, width = *width),
                        Align::Right => format!("{:>width$}", text, width = *width),
                        Align::Center => format!("{:^width$}", text, width = *width),
                    };
                    out.push_str(&padded);
                }
            }
        }
        out
    }
}

impl FromStr for Template {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_placeholder(source: &str, spec: &str) -> Result<Segment, FormatError> {
    let (name, format) = match spec.split_once(':') {
        Some((name, format)) => (name.trim(), format.trim()),
        None => (spec.trim(), ""),
    };

    let field = Field::from_name(name)
        .ok_or_else(|| template_error(source, &format!("unknown field '{}'", name)))?;

    let (align, digits) = match format.chars().next() {
        Some('<') => (Align::Left, &format[1..]),
        Some('>') => (Align::Right, &format[1..]),
        Some('^') => (Align::Center, &format[1..]),
        _ => (Align::Left, format),
    };

    let width = if digits.is_empty() {
        0
    } else {
        digits
            .parse::<usize>()
            .map_err(|_| template_error(source, &format!("bad width '{}' for '{}'", digits, name)))?
    };

    Ok(Segment::Placeholder { field, align, width })
}

fn template_error(template: &str, reason: &str) -> FormatError {
    FormatError::Template {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(field: Field) -> Cow<'static, str> {
        match field {
            Field::Message => "hello".into(),
            Field::Level => "INFO".into(),
            Field::Line => "7".into(),
            _ => "x".into(),
        }
    }

    #[test]
    fn test_plain_placeholders() {
        let t = Template::parse("[{level}] {msg}").unwrap();
        assert_eq!(t.render(fill), "[INFO] hello");
    }

    #[test]
    fn test_width_and_alignment() {
        let t = Template::parse("{level:<6}|{line:>3}|{msg:^9}|").unwrap();
        assert_eq!(t.render(fill), "INFO  |  7|  hello  |");
    }

    #[test]
    fn test_bare_width_pads_left_aligned() {
        let t = Template::parse("{level:8}|").unwrap();
        assert_eq!(t.render(fill), "INFO    |");
    }

    #[test]
    fn test_escaped_braces() {
        let t = Template::parse("{{{msg}}}").unwrap();
        assert_eq!(t.render(fill), "{hello}");
    }

    #[test]
    fn test_aliases() {
        let t = Template::parse("{levelname} {message} {lineno}").unwrap();
        assert_eq!(t.render(fill), "INFO hello 7");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Template::parse("{nope}").unwrap_err();
        assert!(err.to_string().contains("unknown field 'nope'"));
    }

    #[test]
    fn test_unclosed_brace_rejected() {
        assert!(Template::parse("{msg").is_err());
    }

    #[test]
    fn test_bad_width_rejected() {
        assert!(Template::parse("{msg:<wide}").is_err());
    }

    #[test]
    fn test_uses() {
        let t = Template::parse("{msg} @ {loc}").unwrap();
        assert!(t.uses(Field::Location));
        assert!(!t.uses(Field::Time));
    }
}
