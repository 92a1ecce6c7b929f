//! Typed column descriptors.
//!
//! A [`Field`] knows how to pull one textual value off a [`CharStream`] and
//! how to convert between that text and a typed [`Value`]. Fields are built
//! once when a schema is declared and only read afterwards, so one field can
//! serve any number of parses, including parses running on other threads.
//!
//! # Examples
//!
//! ```
//! use typed_csv::core::stream::CharReader;
//! use typed_csv::field::{Field, Value};
//!
//! let prices = Field::array("prices", Field::integer("price"));
//! let mut stream = CharReader::from_text("'1,2,3',next");
//!
//! let value = prices.read_csv(&mut stream).unwrap();
//! assert_eq!(
//!     value,
//!     Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
//! );
//! assert_eq!(prices.value_to_s(&value).unwrap(), "'1,2,3'");
//! ```

use std::{fmt::Write, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{
    core::stream::{CharReader, CharStream},
    error::{CsvError, Result},
    reader::soak_eol,
};

mod temporal;
mod types;
mod value;

pub use types::{FieldOptions, FieldType};
pub use value::{Symbol, Value};

pub const COMMA: char = ',';
pub const LF: char = '\n';
pub const CR: char = '\r';

pub const DEFAULT_PRECISION: u32 = 6;
pub const DEFAULT_DATE_FORMAT: &str = "%Y%m%d";
pub const DEFAULT_TIME_FORMAT: &str = "%Y%m%d%H%M%S";
pub const DEFAULT_CLOCK_FORMAT: &str = "%d:%d:%d";
pub const DEFAULT_HHMMSS_FORMAT: &str = "%H:%M:%S";

/// Quote character wrapped around a serialized value.
///
/// Quotes toggle an "inside quotes" flag while tokenizing; there is no escape,
/// so a quote character can never appear inside the value it delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

/// Variant-specific configuration of a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Occupies a column but never carries data.
    Null,
    /// `T` is true, any other text is false.
    Boolean,
    Integer,
    Float { precision: u32 },
    /// Exact decimal arithmetic, rounded to `precision` places when written.
    Decimal { precision: u32 },
    String,
    Symbol,
    Date { format: String },
    Time { format: String },
    /// Seconds since midnight, scanned with a scanf-like format.
    TimeOfDay { format: String },
    /// Date text normalised to a `YYYYMMDD` string.
    Yyyymmdd { format: String },
    /// Clock text normalised to an `HHMMSS` string.
    Hhmmss { format: String },
    Array { value: Box<Field> },
    Hash { key: Box<Field>, value: Box<Field> },
}

/// Type descriptor for one CSV column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    sym: String,
    name: String,
    quote: Option<Quote>,
    kind: FieldKind,
}

impl Field {
    /// Creates a field of the given kind. Array and hash fields are single
    /// quoted, everything else starts unquoted.
    pub fn with_kind(name: impl Into<String>, kind: FieldKind) -> Field {
        let name = name.into();
        let quote = match kind {
            FieldKind::Array { .. } | FieldKind::Hash { .. } => Some(Quote::Single),
            _ => None,
        };
        Field {
            sym: snake_case(&name),
            name,
            quote,
            kind,
        }
    }

    pub fn null(name: impl Into<String>) -> Field {
        Field::with_kind(name, FieldKind::Null)
    }

    pub fn boolean(name: impl Into<String>) -> Field {
        Field::with_kind(name, FieldKind::Boolean)
    }

    pub fn integer(name: impl Into<String>) -> Field {
        Field::with_kind(name, FieldKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Field {
        Field::with_kind(
            name,
            FieldKind::Float {
                precision: DEFAULT_PRECISION,
            },
        )
    }

    pub fn decimal(name: impl Into<String>) -> Field {
        Field::with_kind(
            name,
            FieldKind::Decimal {
                precision: DEFAULT_PRECISION,
            },
        )
    }

    pub fn string(name: impl Into<String>) -> Field {
        Field::with_kind(name, FieldKind::String)
    }

    pub fn symbol(name: impl Into<String>) -> Field {
        Field::with_kind(name, FieldKind::Symbol)
    }

    pub fn date(name: impl Into<String>) -> Field {
        Field::with_kind(
            name,
            FieldKind::Date {
                format: DEFAULT_DATE_FORMAT.to_string(),
            },
        )
    }

    pub fn time(name: impl Into<String>) -> Field {
        Field::with_kind(
            name,
            FieldKind::Time {
                format: DEFAULT_TIME_FORMAT.to_string(),
            },
        )
    }

    pub fn time_of_day(name: impl Into<String>) -> Field {
        Field::with_kind(
            name,
            FieldKind::TimeOfDay {
                format: DEFAULT_CLOCK_FORMAT.to_string(),
            },
        )
    }

    pub fn yyyymmdd(name: impl Into<String>) -> Field {
        Field::with_kind(
            name,
            FieldKind::Yyyymmdd {
                format: DEFAULT_DATE_FORMAT.to_string(),
            },
        )
    }

    pub fn hhmmss(name: impl Into<String>) -> Field {
        Field::with_kind(
            name,
            FieldKind::Hhmmss {
                format: DEFAULT_HHMMSS_FORMAT.to_string(),
            },
        )
    }

    pub fn array(name: impl Into<String>, value: Field) -> Field {
        Field::with_kind(
            name,
            FieldKind::Array {
                value: Box::new(value),
            },
        )
    }

    pub fn hash(name: impl Into<String>, key: Field, value: Field) -> Field {
        Field::with_kind(
            name,
            FieldKind::Hash {
                key: Box::new(key),
                value: Box::new(value),
            },
        )
    }

    pub fn with_sym(mut self, sym: impl Into<String>) -> Field {
        self.sym = sym.into();
        self
    }

    pub fn with_quote(mut self, quote: Option<Quote>) -> Field {
        self.quote = quote;
        self
    }

    pub fn single_quoted(self) -> Field {
        self.with_quote(Some(Quote::Single))
    }

    pub fn double_quoted(self) -> Field {
        self.with_quote(Some(Quote::Double))
    }

    /// Sets the format string of a date, time or time-of-day field.
    /// Has no effect on other kinds.
    pub fn with_format(mut self, format: impl Into<String>) -> Field {
        match &mut self.kind {
            FieldKind::Date { format: current }
            | FieldKind::Time { format: current }
            | FieldKind::TimeOfDay { format: current }
            | FieldKind::Yyyymmdd { format: current }
            | FieldKind::Hhmmss { format: current } => *current = format.into(),
            _ => {}
        }
        self
    }

    /// Sets the precision of a float or decimal field. Has no effect on other kinds.
    pub fn with_precision(mut self, precision: u32) -> Field {
        if let FieldKind::Float { precision: current } | FieldKind::Decimal { precision: current } =
            &mut self.kind
        {
            *current = precision;
        }
        self
    }

    /// Symbolic name, used as the record attribute key.
    pub fn sym(&self) -> &str {
        &self.sym
    }

    /// Display label, written in header lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quote(&self) -> Option<Quote> {
        self.quote
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn field_type(&self) -> FieldType {
        match self.kind {
            FieldKind::Null => FieldType::Null,
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Integer => FieldType::Integer,
            FieldKind::Float { .. } => FieldType::Float,
            FieldKind::Decimal { .. } => FieldType::Decimal,
            FieldKind::String => FieldType::String,
            FieldKind::Symbol => FieldType::Symbol,
            FieldKind::Date { .. } => FieldType::Date,
            FieldKind::Time { .. } => FieldType::Time,
            FieldKind::TimeOfDay { .. } => FieldType::TimeOfDay,
            FieldKind::Yyyymmdd { .. } => FieldType::Yyyymmdd,
            FieldKind::Hhmmss { .. } => FieldType::Hhmmss,
            FieldKind::Array { .. } => FieldType::Array,
            FieldKind::Hash { .. } => FieldType::Hash,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Date { format }
            | FieldKind::Time { format }
            | FieldKind::TimeOfDay { format }
            | FieldKind::Yyyymmdd { format }
            | FieldKind::Hhmmss { format } => Some(format),
            _ => None,
        }
    }

    pub fn precision(&self) -> Option<u32> {
        match self.kind {
            FieldKind::Float { precision } | FieldKind::Decimal { precision } => Some(precision),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, FieldKind::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, FieldKind::Boolean)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Integer | FieldKind::Float { .. } | FieldKind::Decimal { .. }
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, FieldKind::String)
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self.kind, FieldKind::Symbol)
    }

    pub fn is_date(&self) -> bool {
        matches!(self.kind, FieldKind::Date { .. })
    }

    pub fn is_time(&self) -> bool {
        matches!(self.kind, FieldKind::Time { .. })
    }

    pub fn is_time_of_day(&self) -> bool {
        matches!(self.kind, FieldKind::TimeOfDay { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, FieldKind::Array { .. })
    }

    pub fn is_hash(&self) -> bool {
        matches!(self.kind, FieldKind::Hash { .. })
    }

    /// Checks that every format string this field (and any nested field)
    /// carries is one the codec supports.
    pub fn validate(&self) -> Result<()> {
        let supported = match &self.kind {
            FieldKind::Date { format } => temporal::is_date_format(format),
            FieldKind::Time { format } => temporal::is_datetime_format(format),
            FieldKind::TimeOfDay { format } => temporal::is_clock_format(format),
            FieldKind::Yyyymmdd { format } => temporal::is_yyyymmdd_format(format),
            FieldKind::Hhmmss { format } => temporal::is_hhmmss_format(format),
            FieldKind::Array { value } => return value.validate(),
            FieldKind::Hash { key, value } => {
                key.validate()?;
                return value.validate();
            }
            _ => true,
        };
        if supported {
            Ok(())
        } else {
            Err(CsvError::schema(format!(
                "field '{}': unsupported {} format '{}'",
                self.name,
                self.field_type(),
                self.format().unwrap_or_default()
            )))
        }
    }

    /// Reads the next field off `stream` and converts it.
    ///
    /// Characters are accumulated up to an unquoted comma, CR or LF, or the
    /// end of the stream. A terminating comma is consumed; a terminating CR or
    /// LF is pushed back for the end-of-line soak. The configured quote
    /// character toggles quoting and is never part of the text. Empty text
    /// yields [`Value::Absent`].
    pub fn read_csv<S: CharStream + ?Sized>(&self, stream: &mut S) -> Result<Value> {
        let quote = self.quote.map(Quote::as_char);
        let mut quoted = false;
        let mut text = String::new();
        while let Some(ch) = stream.next_char()? {
            match ch {
                _ if Some(ch) == quote => quoted = !quoted,
                COMMA if !quoted => break,
                CR | LF if !quoted => {
                    stream.unget(ch);
                    break;
                }
                _ => text.push(ch),
            }
        }
        if text.is_empty() {
            Ok(Value::Absent)
        } else {
            self.value_from_s(&text)
        }
    }

    /// Converts text (already stripped of quotes) into a value.
    pub fn value_from_s(&self, text: &str) -> Result<Value> {
        match &self.kind {
            FieldKind::Null => Ok(Value::Absent),
            FieldKind::Boolean => Ok(Value::Boolean(text == "T")),
            FieldKind::Integer => text
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| self.format_error(text, "an integer")),
            FieldKind::Float { .. } => text
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.format_error(text, "a float")),
            FieldKind::Decimal { .. } => Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map(Value::Decimal)
                .map_err(|_| self.format_error(text, "a decimal")),
            FieldKind::String => Ok(Value::String(text.to_string())),
            FieldKind::Symbol => Ok(Value::Symbol(Symbol::intern(text))),
            FieldKind::Date { format } => NaiveDate::parse_from_str(text, format)
                .map(Value::Date)
                .map_err(|_| self.format_error(text, format!("a date formatted '{format}'"))),
            FieldKind::Time { format } => NaiveDateTime::parse_from_str(text, format)
                .map(Value::Time)
                .map_err(|_| self.format_error(text, format!("a time formatted '{format}'"))),
            FieldKind::TimeOfDay { format } => temporal::seconds_from_clock(text, format)
                .map(Value::Integer)
                .ok_or_else(|| self.format_error(text, format!("a time of day '{format}'"))),
            FieldKind::Yyyymmdd { format } => temporal::normalize_yyyymmdd(text, format)
                .map(Value::String)
                .ok_or_else(|| self.format_error(text, format!("a date formatted '{format}'"))),
            FieldKind::Hhmmss { format } => temporal::normalize_hhmmss(text, format)
                .map(Value::String)
                .ok_or_else(|| self.format_error(text, format!("a clock formatted '{format}'"))),
            FieldKind::Array { value } => {
                let mut stream = CharReader::from_text(text);
                let mut items = Vec::new();
                while !stream.is_eof()? {
                    let item = value.read_csv(&mut stream)?;
                    soak_eol(&mut stream)?;
                    if !item.is_absent() {
                        items.push(item);
                    }
                }
                Ok(Value::Array(items))
            }
            FieldKind::Hash { key, value } => {
                let mut stream = CharReader::from_text(text);
                let mut map = IndexMap::new();
                while !stream.is_eof()? {
                    let k = key.read_csv(&mut stream)?;
                    let v = if stream.is_eof()? {
                        Value::Absent
                    } else {
                        value.read_csv(&mut stream)?
                    };
                    soak_eol(&mut stream)?;
                    map.insert(k, v);
                }
                Ok(Value::Hash(map))
            }
        }
    }

    /// Converts a value into text, wrapped in the field's quote if one is set.
    /// An absent value is written as empty text.
    pub fn value_to_s(&self, value: &Value) -> Result<String> {
        if value.is_absent() || self.is_null() {
            return Ok(String::new());
        }
        let mut out = String::new();
        if let Some(quote) = self.quote {
            out.push(quote.as_char());
        }
        self.write_body(value, &mut out)?;
        if let Some(quote) = self.quote {
            out.push(quote.as_char());
        }
        Ok(out)
    }

    fn write_body(&self, value: &Value, out: &mut String) -> Result<()> {
        let written = match (&self.kind, value) {
            (FieldKind::Boolean, Value::Boolean(b)) => {
                out.push(if *b { 'T' } else { 'F' });
                Ok(())
            }
            (FieldKind::Integer, Value::Integer(i)) => write!(out, "{i}"),
            (FieldKind::Float { precision }, Value::Float(_) | Value::Integer(_)) => {
                let precision = *precision as usize;
                let x = value.as_f64().unwrap_or_default();
                write!(out, "{x:.precision$}")
            }
            (FieldKind::Decimal { precision }, _) => {
                let d = match value {
                    Value::Decimal(d) => *d,
                    Value::Integer(i) => Decimal::from(*i),
                    Value::Float(f) => Decimal::try_from(*f).map_err(|_| self.mismatch(value))?,
                    _ => return Err(self.mismatch(value)),
                };
                let rounded = d.round_dp(*precision);
                let precision = *precision as usize;
                write!(out, "{rounded:.precision$}")
            }
            (FieldKind::String | FieldKind::Symbol, Value::String(_) | Value::Symbol(_)) => {
                out.push_str(value.as_str().unwrap_or_default());
                Ok(())
            }
            (FieldKind::Date { format }, Value::Date(d)) => write!(out, "{}", d.format(format)),
            (FieldKind::Time { format }, Value::Time(t)) => write!(out, "{}", t.format(format)),
            (FieldKind::TimeOfDay { format }, Value::Integer(seconds)) => {
                let clock = temporal::seconds_to_clock(*seconds, format).ok_or_else(|| {
                    CsvError::schema(format!("field '{}': unsupported format", self.name))
                })?;
                out.push_str(&clock);
                Ok(())
            }
            (FieldKind::Yyyymmdd { .. } | FieldKind::Hhmmss { .. }, Value::String(s)) => {
                out.push_str(s);
                Ok(())
            }
            (FieldKind::Array { value: element }, Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(COMMA);
                    }
                    out.push_str(&element.value_to_s(item)?);
                }
                Ok(())
            }
            (FieldKind::Hash { key, value: field }, Value::Hash(map)) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(COMMA);
                    }
                    out.push_str(&key.value_to_s(k)?);
                    out.push(COMMA);
                    out.push_str(&field.value_to_s(v)?);
                }
                Ok(())
            }
            _ => return Err(self.mismatch(value)),
        };
        written.map_err(|_| {
            CsvError::schema(format!(
                "field '{}': cannot render with format '{}'",
                self.name,
                self.format().unwrap_or_default()
            ))
        })
    }

    fn format_error(&self, text: &str, expected: impl Into<String>) -> CsvError {
        CsvError::format(&self.name, text, expected)
    }

    fn mismatch(&self, value: &Value) -> CsvError {
        CsvError::schema(format!(
            "field '{}' of type {} cannot write a {} value",
            self.name,
            self.field_type(),
            value.kind_name()
        ))
    }
}

/// Converts a display name such as `Close Price` or `closePrice` into an
/// identifier such as `close_price`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous: Option<char> = None;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase()
                && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
            {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        previous = Some(ch);
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn read_one(field: &Field, text: &str) -> Value {
        field
            .read_csv(&mut CharReader::from_text(text))
            .expect("field should parse")
    }

    #[test]
    fn tokenizer_stops_at_comma_and_consumes_it() {
        let field = Field::string("s");
        let mut stream = CharReader::from_text("a,b,c\n");
        assert_eq!(field.read_csv(&mut stream).unwrap(), Value::from("a"));
        assert_eq!(field.read_csv(&mut stream).unwrap(), Value::from("b"));
        assert_eq!(field.read_csv(&mut stream).unwrap(), Value::from("c"));
        assert_eq!(stream.next_char().unwrap(), Some('\n'));
    }

    #[test]
    fn tokenizer_leaves_line_terminator_in_place() {
        let field = Field::string("s");
        let mut stream = CharReader::from_text("a\r\nb");
        assert_eq!(field.read_csv(&mut stream).unwrap(), Value::from("a"));
        assert!(field.read_csv(&mut stream).unwrap().is_absent());
        assert_eq!(stream.next_char().unwrap(), Some('\r'));
    }

    #[test]
    fn quote_toggling_hides_commas() {
        let field = Field::string("s").single_quoted();
        assert_eq!(read_one(&field, "'a,b'"), Value::from("a,b"));
        assert_eq!(read_one(&field, "x'a,b'y,z"), Value::from("xa,by"));
    }

    #[test]
    fn empty_text_is_absent() {
        assert!(read_one(&Field::integer("i"), ",5").is_absent());
        assert!(read_one(&Field::string("s").double_quoted(), "\"\"").is_absent());
    }

    #[test]
    fn null_field_consumes_but_never_carries_data() {
        let field = Field::null("skip");
        let mut stream = CharReader::from_text("junk,5");
        assert!(field.read_csv(&mut stream).unwrap().is_absent());
        assert_eq!(
            Field::integer("i").read_csv(&mut stream).unwrap(),
            Value::Integer(5)
        );
    }

    #[test]
    fn boolean_encoding_is_exact() {
        let field = Field::boolean("b");
        assert_eq!(field.value_from_s("T").unwrap(), Value::Boolean(true));
        assert_eq!(field.value_from_s("F").unwrap(), Value::Boolean(false));
        assert_eq!(field.value_from_s("t").unwrap(), Value::Boolean(false));
        assert_eq!(field.value_from_s("anything else").unwrap(), Value::Boolean(false));
        assert_eq!(field.value_to_s(&Value::Boolean(true)).unwrap(), "T");
        assert_eq!(field.value_to_s(&Value::Boolean(false)).unwrap(), "F");
    }

    #[test]
    fn bad_numbers_are_format_errors() {
        let err = Field::integer("qty").value_from_s("12x").unwrap_err();
        match err {
            CsvError::Format { field, text, .. } => {
                assert_eq!(field, "qty");
                assert_eq!(text, "12x");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(Field::float("f").value_from_s("abc").is_err());
        assert!(Field::decimal("d").value_from_s("1.2.3").is_err());
    }

    #[test]
    fn float_is_written_at_precision() {
        let field = Field::float("f");
        assert_eq!(field.value_to_s(&Value::Float(12.5)).unwrap(), "12.500000");
        let field = Field::float("f").with_precision(2);
        assert_eq!(field.value_to_s(&Value::Float(1.005_1)).unwrap(), "1.01");
        assert_eq!(field.value_to_s(&Value::Integer(3)).unwrap(), "3.00");
    }

    #[test]
    fn decimal_rounds_exactly() {
        let field = Field::decimal("d").with_precision(2);
        let value = field.value_from_s("2.675").unwrap();
        assert_eq!(value, Value::Decimal(Decimal::new(2675, 3)));
        assert_eq!(field.value_to_s(&value).unwrap(), "2.68");
        assert_eq!(
            field.value_from_s("1e3").unwrap(),
            Value::Decimal(Decimal::from(1000))
        );
    }

    #[test]
    fn symbols_are_interned() {
        let field = Field::symbol("s");
        let a = field.value_from_s("AAA").unwrap();
        let b = field.value_from_s("AAA").unwrap();
        match (&a, &b) {
            (Value::Symbol(x), Value::Symbol(y)) => assert!(x.ptr_eq(y)),
            _ => panic!("expected symbols"),
        }
        assert_eq!(field.value_to_s(&a).unwrap(), "AAA");
    }

    #[test]
    fn dates_and_times_use_their_format() {
        let date = Field::date("d").with_format("%Y-%m-%d");
        let value = date.value_from_s("2024-02-29").unwrap();
        assert_eq!(value, Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert_eq!(date.value_to_s(&value).unwrap(), "2024-02-29");
        assert!(date.value_from_s("2023-02-29").is_err());

        let time = Field::time("t");
        let value = time.value_from_s("20240101093005").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap();
        assert_eq!(value, Value::Time(expected));
        assert_eq!(time.value_to_s(&value).unwrap(), "20240101093005");
    }

    #[test]
    fn time_of_day_is_seconds_since_midnight() {
        let field = Field::time_of_day("tod");
        assert_eq!(field.value_from_s("3:04:05").unwrap(), Value::Integer(11045));
        assert_eq!(field.value_to_s(&Value::Integer(11045)).unwrap(), "3:04:05");
        assert!(field.value_from_s("later").is_err());
    }

    #[test]
    fn overflowing_time_of_day_is_format_error() {
        let field = Field::time_of_day("tod");
        let error = field.value_from_s("999999999999999999:0:0").unwrap_err();
        assert!(matches!(error, CsvError::Format { .. }));

        let mut stream = CharReader::from_text("999999999999999999:0:0,next");
        assert!(matches!(field.read_csv(&mut stream), Err(CsvError::Format { .. })));

        let wide = Field::from_tag(
            "tod",
            "time_of_day",
            FieldOptions {
                format: Some("%99999999999999999999999d".to_string()),
                ..FieldOptions::default()
            },
        );
        assert!(wide.is_err());
    }

    #[test]
    fn string_normalising_variants() {
        let date = Field::yyyymmdd("d").with_format("%d/%m/%Y");
        assert_eq!(date.value_from_s("5/1/2024").unwrap(), Value::from("20240105"));
        let clock = Field::hhmmss("t");
        assert_eq!(clock.value_from_s("09:30:00").unwrap(), Value::from("093000"));
        assert!(clock.value_from_s("9:30").is_err());
    }

    #[test]
    fn array_of_integers() {
        let field = Field::array("a", Field::integer("i"));
        let value = read_one(&field, "'1,2,3'");
        assert_eq!(
            value,
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
        assert_eq!(field.value_to_s(&value).unwrap(), "'1,2,3'");
        assert_eq!(read_one(&field, "'1,,3'").as_array().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn hash_preserves_insertion_order() {
        let field = Field::hash("h", Field::symbol("k"), Field::integer("v"));
        let value = read_one(&field, "'a,1,b,2'");
        let map = value.as_hash().unwrap();
        let keys: Vec<_> = map.keys().map(|k| k.as_str().unwrap()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(map[&Value::Symbol(Symbol::intern("b"))], Value::Integer(2));
        assert_eq!(field.value_to_s(&value).unwrap(), "'a,1,b,2'");
    }

    #[test]
    fn hash_duplicate_key_last_write_wins() {
        let field = Field::hash("h", Field::string("k"), Field::integer("v"));
        let value = read_one(&field, "'a,1,b,2,a,3'");
        let map = value.as_hash().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_index(0).unwrap().1, &Value::Integer(3));
    }

    #[test]
    fn hash_with_dangling_key_gets_absent_value() {
        let field = Field::hash("h", Field::string("k"), Field::integer("v"));
        let value = read_one(&field, "'a,1,b'");
        assert!(value.as_hash().unwrap()[&Value::from("b")].is_absent());
    }

    #[test]
    fn quotes_wrap_scalars() {
        let field = Field::string("s").double_quoted();
        assert_eq!(field.value_to_s(&Value::from("x,y")).unwrap(), "\"x,y\"");
        assert_eq!(field.value_to_s(&Value::Absent).unwrap(), "");
    }

    #[test]
    fn wrong_value_variant_is_rejected() {
        let result = Field::integer("i").value_to_s(&Value::from("x"));
        assert!(matches!(result, Err(CsvError::SchemaConfiguration(_))));
    }

    #[test]
    fn scalar_round_trips() {
        let cases = [
            (Field::boolean("b"), Value::Boolean(true)),
            (Field::integer("i"), Value::Integer(-42)),
            (Field::float("f"), Value::Float(0.125)),
            (Field::decimal("d"), Value::Decimal(Decimal::new(-31415, 4))),
            (Field::string("s"), Value::from("hello world")),
            (Field::symbol("y"), Value::Symbol(Symbol::intern("ibm"))),
            (
                Field::date("dt"),
                Value::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()),
            ),
            (Field::time_of_day("tod"), Value::Integer(86399)),
        ];
        for (field, value) in cases {
            let text = field.value_to_s(&value).unwrap();
            assert_eq!(field.value_from_s(&text).unwrap(), value, "{text}");
        }
    }

    #[test]
    fn format_validation() {
        assert!(Field::date("d").with_format("%Y-%Q").validate().is_err());
        assert!(Field::time_of_day("t").with_format("%H").validate().is_err());
        let nested = Field::array("a", Field::hhmmss("t").with_format("bad"));
        assert!(nested.validate().is_err());
        assert!(Field::date("d").validate().is_ok());
    }

    #[test]
    fn date_format_with_time_directives_is_rejected() {
        let date = Field::date("d").with_format("%Y%m%d%H");
        assert!(matches!(date.validate(), Err(CsvError::SchemaConfiguration(_))));
        assert!(Field::time("t").with_format("%Y%m%d %z").validate().is_err());
        assert!(Field::time("t").with_format("%Y-%m-%dT%H:%M:%S").validate().is_ok());
    }

    #[test]
    fn names_become_snake_case_syms() {
        assert_eq!(snake_case("Close Price"), "close_price");
        assert_eq!(snake_case("closePrice"), "close_price");
        assert_eq!(snake_case("volume"), "volume");
        assert_eq!(snake_case("P/E ratio"), "p_e_ratio");
        assert_eq!(Field::integer("Open Interest").sym(), "open_interest");
    }
}
