//! Date, time and time-of-day text helpers backing the temporal field variants.

use std::fmt::Write;

use chrono::{
    NaiveDate, NaiveDateTime,
    format::{Item, StrftimeItems},
};

/// Returns `true` when chrono understands every directive in `format`.
pub(crate) fn is_strftime_format(format: &str) -> bool {
    !format.is_empty() && StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Returns `true` when a date can be both parsed and written with `format`,
/// which rules out time-of-day and time zone directives.
pub(crate) fn is_date_format(format: &str) -> bool {
    is_strftime_format(format)
        && write!(String::new(), "{}", NaiveDate::default().format(format)).is_ok()
}

/// Returns `true` when a zone-less date and time can be written with `format`.
pub(crate) fn is_datetime_format(format: &str) -> bool {
    is_strftime_format(format)
        && write!(String::new(), "{}", NaiveDateTime::default().format(format)).is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockPart {
    Literal(char),
    Space,
    Int { width: usize, zero_pad: bool },
}

/// Widest `%d` conversion accepted; an i64 never needs more digits.
const MAX_CLOCK_WIDTH: usize = 19;

/// Compiles a scanf-like clock format such as `%d:%d:%d` or `%02d%02d`.
///
/// Supports `%d` with an optional zero flag and width, `%%`, whitespace and
/// literal characters. One to three integer conversions are required.
fn compile_clock(format: &str) -> Option<Vec<ClockPart>> {
    let mut parts = Vec::new();
    let mut chars = format.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '%' => {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    parts.push(ClockPart::Literal('%'));
                    continue;
                }
                let zero_pad = chars.next_if_eq(&'0').is_some();
                let mut width = 0usize;
                while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                    width = width
                        .checked_mul(10)?
                        .checked_add(digit.to_digit(10)? as usize)?;
                }
                if width > MAX_CLOCK_WIDTH {
                    return None;
                }
                if chars.next()? != 'd' {
                    return None;
                }
                parts.push(ClockPart::Int { width, zero_pad });
            }
            c if c.is_whitespace() => parts.push(ClockPart::Space),
            c => parts.push(ClockPart::Literal(c)),
        }
    }
    let conversions = parts
        .iter()
        .filter(|part| matches!(part, ClockPart::Int { .. }))
        .count();
    (1..=3).contains(&conversions).then_some(parts)
}

pub(crate) fn is_clock_format(format: &str) -> bool {
    compile_clock(format).is_some()
}

/// Scans integers out of `text` the way scanf does: stops quietly at the
/// first mismatch and returns whatever was converted up to that point.
fn scan_clock(text: &str, parts: &[ClockPart]) -> Vec<i64> {
    let mut values = Vec::new();
    let mut chars = text.chars().peekable();
    for part in parts {
        match *part {
            ClockPart::Space => while chars.next_if(|c| c.is_whitespace()).is_some() {},
            ClockPart::Literal(expected) => {
                if chars.next_if_eq(&expected).is_none() {
                    break;
                }
            }
            ClockPart::Int { width, .. } => {
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
                let limit = if width == 0 { usize::MAX } else { width };
                let mut digits = String::new();
                if let Some(sign) = chars.next_if(|c| *c == '-' || *c == '+') {
                    digits.push(sign);
                }
                while digits.len() < limit {
                    match chars.next_if(char::is_ascii_digit) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                match digits.parse::<i64>() {
                    Ok(value) => values.push(value),
                    Err(_) => break,
                }
            }
        }
    }
    values
}

/// Parses `text` into seconds since midnight, `None` if nothing converted or
/// the total does not fit an i64.
pub(crate) fn seconds_from_clock(text: &str, format: &str) -> Option<i64> {
    let parts = compile_clock(format)?;
    let values = scan_clock(text, &parts);
    if values.is_empty() {
        return None;
    }
    values
        .iter()
        .zip([3600i64, 60, 1])
        .try_fold(0i64, |seconds, (value, scale)| {
            seconds.checked_add(value.checked_mul(scale)?)
        })
}

/// Renders seconds since midnight. The first bare `%d` prints as is and later
/// ones print two digits wide, so `%d:%d:%d` yields clock text like `3:04:05`.
pub(crate) fn seconds_to_clock(seconds: i64, format: &str) -> Option<String> {
    let parts = compile_clock(format)?;
    let hours = seconds / 3600;
    let minutes = (seconds - hours * 3600) / 60;
    let secs = seconds - hours * 3600 - minutes * 60;
    let mut values = [hours, minutes, secs].into_iter();

    let mut out = String::new();
    let mut index = 0;
    for part in parts {
        match part {
            ClockPart::Literal(c) => out.push(c),
            ClockPart::Space => out.push(' '),
            ClockPart::Int { width, zero_pad } => {
                let value = values.next().unwrap_or(0);
                let (width, zero_pad) = match (width, index) {
                    (0, 0) => (0, false),
                    (0, _) => (2, true),
                    explicit => (explicit.0, zero_pad),
                };
                let written = if zero_pad {
                    write!(out, "{value:0width$}")
                } else {
                    write!(out, "{value:width$}")
                };
                written.ok()?;
                index += 1;
            }
        }
    }
    Some(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateOrder {
    Ymd,
    Dmy,
    Mdy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateLayout {
    Compact { order: DateOrder, long_year: bool },
    Separated { order: DateOrder, separator: char },
}

fn date_layout(format: &str) -> Option<DateLayout> {
    use DateOrder::{Dmy, Mdy, Ymd};

    let compact = |order, long_year| Some(DateLayout::Compact { order, long_year });
    let separated = |order, separator| Some(DateLayout::Separated { order, separator });
    match format {
        "%Y%m%d" => compact(Ymd, true),
        "%d%m%Y" => compact(Dmy, true),
        "%m%d%Y" => compact(Mdy, true),
        "%y%m%d" => compact(Ymd, false),
        "%d%m%y" => compact(Dmy, false),
        "%m%d%y" => compact(Mdy, false),
        _ => {
            let spec: Vec<char> = format.chars().collect();
            // separated layouts are exactly "%a<sep>%b<sep>%c"
            if spec.len() != 8 || spec[0] != '%' || spec[3] != '%' || spec[6] != '%' {
                return None;
            }
            let separator = spec[2];
            if spec[5] != separator || !matches!(separator, '-' | '/' | ':') {
                return None;
            }
            match (spec[1], spec[4], spec[7]) {
                ('Y' | 'y', 'm', 'd') => separated(Ymd, separator),
                ('d', 'm', 'Y' | 'y') => separated(Dmy, separator),
                ('m', 'd', 'Y' | 'y') => separated(Mdy, separator),
                _ => None,
            }
        }
    }
}

pub(crate) fn is_yyyymmdd_format(format: &str) -> bool {
    date_layout(format).is_some()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn pad_year(year: &str) -> Option<String> {
    if !all_digits(year) {
        return None;
    }
    match year.len() {
        1 => Some(format!("200{year}")),
        2 if year < "50" => Some(format!("20{year}")),
        2 => Some(format!("19{year}")),
        4 => Some(year.to_string()),
        _ => None,
    }
}

fn pad2(part: &str) -> Option<String> {
    if !all_digits(part) {
        return None;
    }
    match part.len() {
        1 => Some(format!("0{part}")),
        2 => Some(part.to_string()),
        _ => None,
    }
}

/// Normalises date text laid out per `format` into `YYYYMMDD`.
pub(crate) fn normalize_yyyymmdd(text: &str, format: &str) -> Option<String> {
    let (y, m, d) = match date_layout(format)? {
        DateLayout::Compact { order, long_year } => {
            let year_len = if long_year { 4 } else { 2 };
            if text.len() != year_len + 4 || !all_digits(text) {
                return None;
            }
            match order {
                DateOrder::Ymd => (
                    &text[..year_len],
                    &text[year_len..year_len + 2],
                    &text[year_len + 2..],
                ),
                DateOrder::Dmy => (&text[4..], &text[2..4], &text[..2]),
                DateOrder::Mdy => (&text[4..], &text[..2], &text[2..4]),
            }
        }
        DateLayout::Separated { order, separator } => {
            let parts: Vec<&str> = text.split(separator).collect();
            let [a, b, c] = parts.as_slice() else {
                return None;
            };
            match order {
                DateOrder::Ymd => (*a, *b, *c),
                DateOrder::Dmy => (*c, *b, *a),
                DateOrder::Mdy => (*c, *a, *b),
            }
        }
    };
    Some(format!("{}{}{}", pad_year(y)?, pad2(m)?, pad2(d)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockLayout {
    Compact,
    Padded(char),
    Unpadded(char),
}

fn clock_layout(format: &str) -> Option<ClockLayout> {
    match format {
        "%H%M%S" => Some(ClockLayout::Compact),
        "%H:%M:%S" => Some(ClockLayout::Padded(':')),
        "%H-%M-%S" => Some(ClockLayout::Padded('-')),
        "%H/%M/%S" => Some(ClockLayout::Padded('/')),
        "%h:%m:%s" => Some(ClockLayout::Unpadded(':')),
        "%h-%m-%s" => Some(ClockLayout::Unpadded('-')),
        "%h/%m/%s" => Some(ClockLayout::Unpadded('/')),
        _ => None,
    }
}

pub(crate) fn is_hhmmss_format(format: &str) -> bool {
    clock_layout(format).is_some()
}

/// Normalises clock text laid out per `format` into `HHMMSS`.
pub(crate) fn normalize_hhmmss(text: &str, format: &str) -> Option<String> {
    let normalized = match clock_layout(format)? {
        ClockLayout::Compact => text.to_string(),
        ClockLayout::Padded(separator) => text.replace(separator, ""),
        ClockLayout::Unpadded(separator) => {
            let parts: Vec<&str> = text.split(separator).collect();
            let [h, m, s] = parts.as_slice() else {
                return None;
            };
            format!("{}{}{}", pad2(h)?, pad2(m)?, pad2(s)?)
        }
    };
    (normalized.len() == 6 && all_digits(&normalized)).then_some(normalized)
}
