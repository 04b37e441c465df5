use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

static OPEN_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(\s*").unwrap());
static CLOSE_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\)\s*").unwrap());

const ZERO_WIDTH: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

/// Leading labels the committee pages put in front of their introduction text.
const INTRO_HEADERS: &[&str] = &["संक्षिप्\u{200d}त परिचय:", "संक्षिप्त परिचय:", "परिचय:", "परिचय"];

/// Tried in order, first match wins.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Collapse whitespace, drop zero-width marks and any trailing `,`/`.` run.
pub fn clean_text(text: &str) -> String {
    let visible: String = text.chars().filter(|c| !ZERO_WIDTH.contains(c)).collect();
    let collapsed = visible.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == ',' || c == '.' || c.is_whitespace())
        .to_string()
}

/// [`clean_text`] that maps an empty result to `None`.
pub fn clean_opt(text: Option<&str>) -> Option<String> {
    text.map(clean_text).filter(|t| !t.is_empty())
}

/// Names and titles: [`clean_text`] plus `"a( b )c"` → `"a (b) c"`.
pub fn normalize_name(name: &str) -> String {
    let cleaned = clean_text(name);
    let opened = OPEN_PAREN_RE.replace_all(&cleaned, " (");
    let closed = CLOSE_PAREN_RE.replace_all(&opened, ") ");
    closed.trim().to_string()
}

pub fn normalize_name_opt(name: Option<&str>) -> Option<String> {
    name.map(normalize_name).filter(|n| !n.is_empty())
}

/// Cleans, then strips every leading introduction header phrase.
pub fn clean_introduction(intro: &str) -> String {
    let cleaned = clean_text(intro);
    let mut rest = cleaned.as_str();
    while let Some(stripped) = strip_intro_header(rest) {
        rest = stripped.trim_start();
    }
    clean_text(rest)
}

fn strip_intro_header(text: &str) -> Option<&str> {
    INTRO_HEADERS.iter().find_map(|header| {
        let stripped = text.strip_prefix(header)?;
        // "परिचय" alone only counts as a header when it is a whole word
        let whole = header.ends_with(':') || stripped.is_empty() || stripped.starts_with(char::is_whitespace);
        whole.then_some(stripped)
    })
}

pub fn clean_introduction_opt(intro: Option<&str>) -> Option<String> {
    intro.map(clean_introduction).filter(|i| !i.is_empty())
}

/// Parse one of the known date spellings. `null`, blanks and anything
/// unrecognised give `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let folded = fold_digits(raw.trim());
    if folded.is_empty() || folded.eq_ignore_ascii_case("null") {
        return None;
    }
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(&folded, fmt)
            .ok()
            .filter(|d| (1000..=9999).contains(&d.year()))
    })
}

pub fn parse_date_opt(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_date)
}

/// Canonical `YYYY-MM-DD` spelling.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Devanagari digits (०-९) to ASCII.
fn fold_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{0966}'..='\u{096f}' => char::from(b'0' + (c as u32 - 0x0966) as u8),
            _ => c,
        })
        .collect()
}

/// Label comparison key: whitespace collapsed, lowercased.
pub fn label_key(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_text_basics() {
        assert_eq!(clean_text("  a \n\t b  "), "a b");
        assert_eq!(clean_text("Finance Committee.,. "), "Finance Committee");
        assert_eq!(clean_text("a\u{200b}b \u{200c} c"), "ab c");
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" ., "), "");
    }

    #[test]
    fn clean_opt_drops_empty() {
        assert_eq!(clean_opt(Some("  \u{200d} ")), None);
        assert_eq!(clean_opt(Some(" x ")), Some("x".into()));
        assert_eq!(clean_opt(None), None);
    }

    #[test]
    fn name_parentheses() {
        assert_eq!(normalize_name("राज्य व्यवस्था( सुशासन )समिति"), "राज्य व्यवस्था (सुशासन) समिति");
        assert_eq!(normalize_name("Committee ( Joint )"), "Committee (Joint)");
        assert_eq!(normalize_name("(NA)"), "(NA)");
    }

    #[test]
    fn introduction_headers() {
        assert_eq!(clean_introduction("परिचय: यो समिति"), "यो समिति");
        assert_eq!(clean_introduction("संक्षिप्\u{200d}त परिचय:  समिति  ।"), "समिति ।");
        assert_eq!(clean_introduction("परिचय यो समिति."), "यो समिति");
        assert_eq!(clean_introduction("परिचयात्मक विवरण"), "परिचयात्मक विवरण");
        assert_eq!(clean_introduction("परिचय: परिचय: दोहोरो"), "दोहोरो");
        assert_eq!(clean_introduction("परिचय:"), "");
    }

    #[test]
    fn every_format_gives_same_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        for raw in ["2024-03-01", "2024/03/01", "2024.03.01", "01/03/2024", "01-03-2024", "01.03.2024", " 2024/3/1 "] {
            assert_eq!(parse_date(raw), Some(expected), "{}", raw);
        }
        assert_eq!(format_date(expected), "2024-03-01");
    }

    #[test]
    fn devanagari_digits() {
        assert_eq!(parse_date("२०८१/०३/१५"), NaiveDate::from_ymd_opt(2081, 3, 15));
    }

    #[test]
    fn unparseable_dates_are_none() {
        for raw in ["", "null", "NULL", "Passed", "2024/13/01", "15/03/12", "2081/03/32", "tomorrow"] {
            assert_eq!(parse_date(raw), None, "{}", raw);
        }
    }

    #[test]
    fn label_keys() {
        assert_eq!(label_key("  Registration   No. "), "registration no.");
        assert_eq!(label_key("दर्ता नं."), "दर्ता नं.");
    }

    proptest! {
        #[test]
        fn clean_text_is_idempotent(s in "\\PC*") {
            let once = clean_text(&s);
            prop_assert_eq!(clean_text(&once), once);
        }

        #[test]
        fn parse_date_never_panics(s in "\\PC*") {
            let _ = parse_date(&s);
        }

        #[test]
        fn parsed_dates_round_trip(y in 1000i32..9999, m in 1u32..=12, d in 1u32..=28) {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            prop_assert_eq!(parse_date(&format_date(date)), Some(date));
        }
    }
}
