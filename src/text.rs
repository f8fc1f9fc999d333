//! Small string and list helpers

use lazy_regex::regex;
use regex::Captures;

const BYTE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Uppercase the first character, leave the rest untouched
pub fn first_capital(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human readable size, e.g. `1536.0` -> `1.5 KB`
pub fn format_bytes(size: f64) -> String {
    let mut size = size;
    let mut unit = 0;
    while size >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", size);
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", formatted, BYTE_UNITS[unit])
}

/// Number inside the first `(digits)` group
///
/// `"file(1 ) and file (2).txt"` gives `Some(2)`.
pub fn digit_in_parens(text: &str) -> Option<u64> {
    regex!(r"\((\d+)\)")
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// First character that is not alphabetic and not in `ignored`; a space if none
pub fn first_non_alphabetic(text: &str, ignored: &[char]) -> char {
    text.chars()
        .find(|c| !c.is_alphabetic() && !ignored.contains(c))
        .unwrap_or(' ')
}

/// Append `punc` unless the text already ends with ASCII punctuation
pub fn punctuate(text: &str, punc: &str) -> String {
    if text.ends_with(|c: char| c.is_ascii_punctuation()) {
        text.to_string()
    } else {
        format!("{}{}", text, punc)
    }
}

/// Collapse runs of whitespace on every line and trim the result
///
/// Invisible characters and the `&#32;` entity count as spaces. Line breaks
/// are kept.
pub fn remove_extra_spaces(text: &str) -> String {
    let invisible = regex!(r"[\x00-\x1f\x7f-\x{9f}\x{200b}-\x{200f}\x{2028}-\x{202f}\x{feff}]");

    text.split('\n')
        .map(|line| {
            let line = invisible.replace_all(line, " ").replace("&#32;", " ");
            line.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Replace every HTML tag with `repl`, keeping the tags named in `ignore`
///
/// `ignore = ["b"]` keeps both `<b>` and `</b>` but not `<br>`.
pub fn replace_html_tags(text: &str, repl: &str, ignore: &[&str]) -> String {
    regex!(r"<.*?>")
        .replace_all(text, |caps: &Captures| {
            let tag = &caps[0];
            if is_ignored_tag(tag, ignore) {
                tag.to_string()
            } else {
                repl.to_string()
            }
        })
        .into_owned()
}

fn is_ignored_tag(tag: &str, ignore: &[&str]) -> bool {
    let body = &tag[1..];
    ignore.iter().any(|name| {
        [body, body.strip_prefix('/').unwrap_or(body)].iter().any(|b| {
            b.strip_prefix(name)
                .map(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
                .unwrap_or(false)
        })
    })
}

/// Apply `(old, new)` replacements in order
///
/// `count` limits replacements per pair; `None` replaces all.
pub fn replace_many(text: &str, pairs: &[(&str, &str)], count: Option<usize>) -> String {
    pairs.iter().fold(text.to_string(), |acc, (old, new)| match count {
        Some(n) => acc.replacen(old, new, n),
        None => acc.replace(old, new),
    })
}

/// Group sorted strings sharing a prefix
///
/// The prefix ends at `sep`, or at the first non-alphabetic character when
/// no separator is given.
///
/// `["HE_bro", "SHE_why", "HE_yes"]` gives `[["HE_bro", "HE_yes"], ["SHE_why"]]`.
/// An empty `sep` counts as no separator.
pub fn similarized<I, S>(items: I, sep: Option<&str>) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut sorted: Vec<String> = items.into_iter().map(Into::into).collect();
    sorted.sort();

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut current: Option<String> = None;

    for item in sorted {
        let prefix = match sep.filter(|s| !s.is_empty()) {
            Some(sep) => item.split(sep).next(),
            None => item.split(first_non_alphabetic(&item, &[])).next(),
        }
        .unwrap_or_default()
        .to_string();

        match groups.last_mut() {
            Some(group) if current.as_deref() == Some(prefix.as_str()) => group.push(item),
            _ => {
                current = Some(prefix);
                groups.push(vec![item]);
            }
        }
    }

    groups
}

/// Split into chunks of `n` items; the last chunk may be shorter
pub fn sliced<T: Clone>(items: &[T], n: usize) -> Vec<Vec<T>> {
    items.chunks(n.max(1)).map(<[T]>::to_vec).collect()
}

/// Merge single-item groups into one group appended at the end
///
/// `[["a"], ["b"], ["c", "d"]]` gives `[["c", "d"], ["a", "b"]]`.
pub fn combine_single_items<T>(groups: Vec<Vec<T>>) -> Vec<Vec<T>> {
    let mut combined = Vec::with_capacity(groups.len());
    let mut singles = Vec::new();

    for mut group in groups {
        if group.len() == 1 {
            singles.append(&mut group);
        } else {
            combined.push(group);
        }
    }
    if !singles.is_empty() {
        combined.push(singles);
    }

    combined
}

/// Make a string usable as a file name on every platform
///
/// Reserved and control characters become `_`; trailing dots and spaces are
/// dropped.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_end_matches(['.', ' ']).trim_start();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_capital() {
        assert_eq!(first_capital("hello World"), "Hello World");
        assert_eq!(first_capital("élan"), "Élan");
        assert_eq!(first_capital(""), "");
        assert_eq!(first_capital("1abc"), "1abc");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(1024.0 * 1024.0), "1 MB");
        assert_eq!(format_bytes(1_234_567.0), "1.18 MB");
        assert_eq!(format_bytes(1024f64.powi(9)), "1024 YB");
    }

    #[test]
    fn test_digit_in_parens() {
        assert_eq!(digit_in_parens("file(1 ) and file (2) and  file(3).txt"), Some(2));
        assert_eq!(digit_in_parens("no digits (x)"), None);
        assert_eq!(digit_in_parens("(1.5)"), None);
    }

    #[test]
    fn test_first_non_alphabetic() {
        assert_eq!(first_non_alphabetic("HE_bro", &[]), '_');
        assert_eq!(first_non_alphabetic("ab-c_d", &['-']), '_');
        assert_eq!(first_non_alphabetic("abc", &[]), ' ');
    }

    #[test]
    fn test_punctuate() {
        assert_eq!(punctuate("Hello", "."), "Hello.");
        assert_eq!(punctuate("Hello?", "."), "Hello?");
        assert_eq!(punctuate("Hi", "!"), "Hi!");
    }

    #[test]
    fn test_remove_extra_spaces() {
        assert_eq!(remove_extra_spaces("  a   b \n c\t\td  "), "a b\nc d");
        assert_eq!(remove_extra_spaces("x&#32;&#32;y"), "x y");
        assert_eq!(remove_extra_spaces("zero\u{200b}width\u{feff}"), "zero width");
    }

    #[test]
    fn test_replace_html_tags() {
        assert_eq!(replace_html_tags("<p>Hi <b>there</b></p>", "", &[]), "Hi there");
        assert_eq!(replace_html_tags("<p>Hi <b>x</b><br></p>", "", &["b"]), "Hi <b>x</b>");
        assert_eq!(replace_html_tags("a<i>b</i>", " ", &[]), "a b ");
    }

    #[test]
    fn test_replace_many() {
        assert_eq!(replace_many("a-b-c", &[("-", "+"), ("a", "A")], None), "A+b+c");
        assert_eq!(replace_many("a-b-c", &[("-", "+")], Some(1)), "a+b-c");
    }

    #[test]
    fn test_similarized() {
        let groups = similarized(["HE_bro", "SHE_why", "HE_yes", "SHE_ok"], None);
        assert_eq!(groups, vec![vec!["HE_bro", "HE_yes"], vec!["SHE_ok", "SHE_why"]]);

        let groups = similarized(["a.1", "b.1", "a.2"], Some("."));
        assert_eq!(groups, vec![vec!["a.1", "a.2"], vec!["b.1"]]);

        assert!(similarized(Vec::<String>::new(), None).is_empty());
    }

    #[test]
    fn test_similarized_empty_separator_acts_as_none() {
        let groups = similarized(["HE_bro", "SHE_why", "HE_yes"], Some(""));
        assert_eq!(groups, vec![vec!["HE_bro", "HE_yes"], vec!["SHE_why"]]);
    }

    #[test]
    fn test_sliced() {
        assert_eq!(sliced(&[1, 2, 3, 4, 5], 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(sliced(&[1, 2], 0), vec![vec![1], vec![2]]);
        assert!(sliced::<u8>(&[], 3).is_empty());
    }

    #[test]
    fn test_combine_single_items() {
        let groups = vec![vec!["a"], vec!["b"], vec!["c", "d"]];
        assert_eq!(combine_single_items(groups), vec![vec!["c", "d"], vec!["a", "b"]]);
        assert_eq!(combine_single_items(vec![vec![1, 2]]), vec![vec![1, 2]]);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b:c?.txt"), "a_b_c_.txt");
        assert_eq!(sanitize_file_name("name. "), "name");
        assert_eq!(sanitize_file_name("..."), "_");
    }
}
