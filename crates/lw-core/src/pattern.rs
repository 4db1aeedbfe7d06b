//! Timestamp pattern compilation and strict parsing.
//!
//! Two syntaxes are accepted:
//!
//! - chrono strftime, chosen whenever the pattern contains `%`
//!   (e.g. `%Y-%m-%d %H:%M:%S,%3f`);
//! - date-format letter patterns (e.g. `yyyy-MM-dd HH:mm:ss,SSS`), translated
//!   to strftime before compiling. Text inside single quotes is literal and
//!   `''` is a single quote.
//!
//! Parsing is always strict: every character of the candidate must be consumed
//! and out-of-range fields (month 13, Feb 30) fail instead of rolling over.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::format::{Fixed, Item, Numeric, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use regex::Regex;

use crate::error::{MergeError, MergeResult};

/// Pattern used when a source does not name one.
pub const DEFAULT_PATTERN: &str = "yyyy-MM-dd HH:mm:ss,SSS";

// Quoted literal | letter run | other literal run | unterminated quote
static RE_LETTER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'((?:[^']|'')*)'|[A-Za-z]+|[^A-Za-z']+|'").unwrap());

/// How parsed fields are turned into an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Date, time and UTC offset present.
    Zoned,
    /// Date and time, interpreted as UTC.
    DateTime,
    /// Date only, at midnight UTC.
    DateOnly,
    /// Time only, on 1970-01-01 UTC.
    TimeOnly,
}

/// A compiled, immutable timestamp pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    pattern: String,
    strftime: String,
    width: usize,
    resolution: Resolution,
    leading_space: bool,
    trailing_space: bool,
}

impl TimestampFormat {
    /// Compile a pattern in either supported syntax.
    pub fn compile(pattern: &str) -> MergeResult<Self> {
        if pattern.trim().is_empty() {
            return Err(pattern_error(pattern, "pattern is empty"));
        }

        let strftime = if pattern.contains('%') {
            pattern.to_string()
        } else {
            letters_to_strftime(pattern)?
        };

        let items: Vec<Item<'_>> = StrftimeItems::new(&strftime).collect();
        let resolution = classify(pattern, &items)?;

        let reference = reference_instant()
            .ok_or_else(|| pattern_error(pattern, "reference instant out of range"))?;
        let mut rendered = String::new();
        write!(rendered, "{}", reference.format_with_items(items.iter()))
            .map_err(|_| pattern_error(pattern, "pattern cannot be rendered"))?;

        Ok(Self {
            pattern: pattern.to_string(),
            width: rendered.chars().count(),
            leading_space: rendered.starts_with(char::is_whitespace),
            trailing_space: rendered.ends_with(char::is_whitespace),
            strftime,
            resolution,
        })
    }

    /// The pattern as supplied by the caller.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The equivalent chrono strftime pattern.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Character count of a timestamp rendered with this pattern.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Strictly parse `text` into milliseconds since the Unix epoch.
    ///
    /// Returns `None` on any mismatch; a failed parse is never an error.
    pub fn parse_millis(&self, text: &str) -> Option<i64> {
        // chrono skips whitespace ahead of numeric fields, which would make
        // " 2016-05-16" match a pattern that never renders a leading blank.
        if (!self.leading_space && text.starts_with(char::is_whitespace))
            || (!self.trailing_space && text.ends_with(char::is_whitespace))
        {
            return None;
        }

        let fmt = self.strftime.as_str();
        // chrono accepts second 60 as a leap second and rolls it into the
        // next minute; a strict parse rejects it instead.
        match self.resolution {
            Resolution::Zoned => DateTime::parse_from_str(text, fmt)
                .ok()
                .filter(|dt| !is_leap_second(dt.nanosecond()))
                .map(|dt| dt.timestamp_millis()),
            Resolution::DateTime => NaiveDateTime::parse_from_str(text, fmt)
                .ok()
                .filter(|ndt| !is_leap_second(ndt.nanosecond()))
                .map(|ndt| ndt.and_utc().timestamp_millis()),
            Resolution::DateOnly => NaiveDate::parse_from_str(text, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc().timestamp_millis()),
            Resolution::TimeOnly => {
                let time = NaiveTime::parse_from_str(text, fmt)
                    .ok()
                    .filter(|t| !is_leap_second(t.nanosecond()))?;
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
                Some(epoch.and_time(time).and_utc().timestamp_millis())
            }
        }
    }
}

fn is_leap_second(nanosecond: u32) -> bool {
    nanosecond >= 1_000_000_000
}

impl std::fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn pattern_error(pattern: &str, message: impl Into<String>) -> MergeError {
    MergeError::Pattern {
        pattern: pattern.to_string(),
        message: message.into(),
    }
}

/// 2000-10-10 10:10:10.100 UTC: every numeric field renders at full width.
fn reference_instant() -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(2000, 10, 10)?
        .and_hms_milli_opt(10, 10, 10, 100)
        .map(|ndt| ndt.and_utc())
}

fn classify(pattern: &str, items: &[Item<'_>]) -> MergeResult<Resolution> {
    let (mut date, mut time, mut zone) = (false, false, false);
    let (mut hour12, mut am_pm) = (false, false);

    for item in items {
        match item {
            Item::Error => return Err(pattern_error(pattern, "unsupported strftime specifier")),
            Item::Numeric(numeric, _) => match numeric {
                Numeric::Year
                | Numeric::YearDiv100
                | Numeric::YearMod100
                | Numeric::IsoYear
                | Numeric::IsoYearDiv100
                | Numeric::IsoYearMod100
                | Numeric::Month
                | Numeric::Day
                | Numeric::Ordinal
                | Numeric::IsoWeek
                | Numeric::WeekFromSun
                | Numeric::WeekFromMon => date = true,
                Numeric::Hour12 => {
                    time = true;
                    hour12 = true;
                }
                Numeric::Hour
                | Numeric::Minute
                | Numeric::Second
                | Numeric::Nanosecond => time = true,
                Numeric::Timestamp => {
                    date = true;
                    time = true;
                }
                _ => {}
            },
            Item::Fixed(fixed) => match fixed {
                Fixed::ShortMonthName | Fixed::LongMonthName => date = true,
                Fixed::LowerAmPm | Fixed::UpperAmPm => am_pm = true,
                Fixed::Nanosecond
                | Fixed::Nanosecond3
                | Fixed::Nanosecond6
                | Fixed::Nanosecond9 => time = true,
                Fixed::TimezoneOffset
                | Fixed::TimezoneOffsetColon
                | Fixed::TimezoneOffsetDoubleColon
                | Fixed::TimezoneOffsetTripleColon
                | Fixed::TimezoneOffsetColonZ
                | Fixed::TimezoneOffsetZ => zone = true,
                Fixed::RFC2822 | Fixed::RFC3339 => {
                    date = true;
                    time = true;
                    zone = true;
                }
                Fixed::TimezoneName => {
                    return Err(pattern_error(pattern, "time zone names cannot be parsed"));
                }
                _ => {}
            },
            _ => {}
        }
    }

    if hour12 && !am_pm {
        return Err(pattern_error(
            pattern,
            "a 12-hour field needs an AM/PM marker",
        ));
    }

    match (date, time, zone) {
        (true, true, true) => Ok(Resolution::Zoned),
        (_, _, true) => Err(pattern_error(
            pattern,
            "a UTC offset needs both a date and a time",
        )),
        (true, true, false) => Ok(Resolution::DateTime),
        (true, false, false) => Ok(Resolution::DateOnly),
        (false, true, false) => Ok(Resolution::TimeOnly),
        (false, false, false) => Err(pattern_error(pattern, "pattern has no date or time fields")),
    }
}

/// Translate a letter pattern (`yyyy-MM-dd HH:mm:ss,SSS`) to strftime.
fn letters_to_strftime(pattern: &str) -> MergeResult<String> {
    let mut out = String::with_capacity(pattern.len() * 2);

    for caps in RE_LETTER_TOKEN.captures_iter(pattern) {
        let token = &caps[0];

        if let Some(quoted) = caps.get(1) {
            if quoted.as_str().is_empty() {
                out.push('\'');
            } else {
                out.push_str(&quoted.as_str().replace("''", "'"));
            }
            continue;
        }
        if token == "'" {
            return Err(pattern_error(pattern, "unterminated quoted literal"));
        }
        if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.push_str(token);
            continue;
        }

        let mut chars = token.chars().peekable();
        while let Some(letter) = chars.next() {
            let mut run = 1;
            while chars.peek() == Some(&letter) {
                chars.next();
                run += 1;
            }
            let field = letter_field(letter, run).ok_or_else(|| {
                pattern_error(
                    pattern,
                    format!("unsupported field '{}'", letter.to_string().repeat(run)),
                )
            })?;
            out.push_str(field);
        }
    }

    Ok(out)
}

fn letter_field(letter: char, run: usize) -> Option<&'static str> {
    let field = match (letter, run) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1 | 2) => "%m",
        ('M', 3) => "%b",
        ('M', _) => "%B",
        ('d', _) => "%d",
        ('D', _) => "%j",
        ('H', _) => "%H",
        ('h', _) => "%I",
        ('m', _) => "%M",
        ('s', _) => "%S",
        ('S', 3) => "%3f",
        ('S', 6) => "%6f",
        ('S', 9) => "%9f",
        ('a', _) => "%p",
        ('E', 1..=3) => "%a",
        ('E', _) => "%A",
        ('Z', _) => "%z",
        ('X', _) => "%:z",
        _ => return None,
    };
    Some(field)
}
