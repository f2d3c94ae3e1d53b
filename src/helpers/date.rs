//! Date helper functions

use chrono::{DateTime, Locale, TimeZone};
use std::fmt::Write;

use crate::error::{Error, Result};

/// Format a date using a date-fns style format string in the given locale
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", "pt-BR")? // -> "15 mar 2021"
/// format_date(&date, "dd 'de' MMMM", "pt-BR")? // -> "15 de março"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, language: &str) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = date_fns_to_chrono_format(format);
    let mut out = String::new();
    write!(
        out,
        "{}",
        date.format_localized(&chrono_format, locale_for(language))
    )
    .map_err(|_| Error::Config(format!("invalid date format: {:?}", format)))?;
    Ok(out)
}

/// Format a publication date for display: localized, each word capitalized.
///
/// Returns an empty string when there is no date.
pub fn display_date<Tz: TimeZone>(
    date: Option<&DateTime<Tz>>,
    format: &str,
    language: &str,
) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    match date {
        Some(d) => Ok(capitalize_words(&format_date(d, format, language)?)),
        None => Ok(String::new()),
    }
}

/// Format a date in ISO 8601 for `<time datetime>`
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Map a language tag such as `pt-BR` to a chrono locale
pub fn locale_for(language: &str) -> Locale {
    let name = language.replace('-', "_");
    if let Ok(locale) = Locale::try_from(name.as_str()) {
        return locale;
    }
    if name.contains('_') {
        return Locale::en_US;
    }
    // bare language, e.g. "pt" -> "pt_PT"
    let doubled = format!("{}_{}", name, name.to_uppercase());
    Locale::try_from(doubled.as_str()).unwrap_or(Locale::en_US)
}

/// Uppercase the first letter of every whitespace-separated word
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a date-fns format string to chrono's strftime syntax.
///
/// Letter runs are tokens (`dd`, `MMM`, `yyyy`, ...), text in single quotes
/// is literal and `''` is a quote. Anything chrono cannot express is
/// emitted as literal text, with `%` escaped.
fn date_fns_to_chrono_format(format: &str) -> String {
    let mut result = String::new();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    result.push('\'');
                    continue;
                }
                while let Some(c) = chars.next() {
                    if c != '\'' {
                        push_literal(&mut result, c);
                    } else if chars.peek() == Some(&'\'') {
                        chars.next();
                        result.push('\'');
                    } else {
                        break;
                    }
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut len = 1;
                while chars.peek() == Some(&c) {
                    chars.next();
                    len += 1;
                }
                match chrono_token(c, len) {
                    Some(token) => result.push_str(token),
                    None => (0..len).for_each(|_| push_literal(&mut result, c)),
                }
            }
            c => push_literal(&mut result, c),
        }
    }

    result
}

fn chrono_token(letter: char, len: usize) -> Option<&'static str> {
    let token = match (letter, len) {
        // Year
        ('y', 4) => "%Y",
        ('y', 2) => "%y",
        // Month
        ('M', 4) => "%B",
        ('M', 3) => "%b",
        ('M', 2) => "%m",
        ('M', 1) => "%-m",
        // Day of week
        ('E', 4) => "%A",
        ('E', 1..=3) => "%a",
        // Day of month
        ('d', 2) => "%d",
        ('d', 1) => "%-d",
        // Hour
        ('H', 2) => "%H",
        ('H', 1) => "%-H",
        ('h', 2) => "%I",
        ('h', 1) => "%-I",
        // Minute
        ('m', 2) => "%M",
        // Second
        ('s', 2) => "%S",
        _ => return None,
    };
    Some(token)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
