//! Gregorian month helpers

const MONTHS: [(&str, &str); 12] = [
    ("january", "jan"),
    ("february", "feb"),
    ("march", "mar"),
    ("april", "apr"),
    ("may", "may"),
    ("june", "jun"),
    ("july", "jul"),
    ("august", "aug"),
    ("september", "sep"),
    ("october", "oct"),
    ("november", "nov"),
    ("december", "dec"),
];

pub const NOT_APPLICABLE: &str = "not-applicable";

/// Lowercase month name, or `not-applicable` outside `1..=12`
///
/// `capital` title-cases the result.
pub fn month_name(month: u32, full: bool, capital: bool) -> String {
    let name = match month.checked_sub(1).and_then(|i| MONTHS.get(i as usize)) {
        Some((long, short)) => {
            if full {
                long
            } else {
                short
            }
        }
        None => NOT_APPLICABLE,
    };

    if capital {
        title_case(name)
    } else {
        name.to_string()
    }
}

/// Days in `month`, 0 when the month does not exist
pub fn days_in_month(month: u32, leap_year: bool) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap_year => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn is_valid_day(month: u32, day: u32, leap_year: bool) -> bool {
    day >= 1 && day <= days_in_month(month, leap_year)
}

/// Uppercase the first letter of every `-` or space separated word
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        word_start = !c.is_alphanumeric();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1, true, false), "january");
        assert_eq!(month_name(7, false, false), "jul");
        assert_eq!(month_name(12, false, true), "Dec");
        assert_eq!(month_name(0, true, false), "not-applicable");
        assert_eq!(month_name(13, true, true), "Not-Applicable");
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(1, false), 31);
        assert_eq!(days_in_month(4, false), 30);
        assert_eq!(days_in_month(2, false), 28);
        assert_eq!(days_in_month(2, true), 29);
        assert_eq!(days_in_month(13, false), 0);
    }

    #[test]
    fn test_is_valid_day() {
        assert!(is_valid_day(2, 29, true));
        assert!(!is_valid_day(2, 29, false));
        assert!(is_valid_day(12, 31, false));
        assert!(!is_valid_day(11, 31, false));
        assert!(!is_valid_day(5, 0, false));
        assert!(!is_valid_day(0, 1, false));
    }
}
