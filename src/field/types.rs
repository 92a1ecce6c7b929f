use std::{fmt, str::FromStr};

use crate::error::{CsvError, Result};

use super::{
    DEFAULT_CLOCK_FORMAT, DEFAULT_DATE_FORMAT, DEFAULT_HHMMSS_FORMAT, DEFAULT_PRECISION,
    DEFAULT_TIME_FORMAT, Field, FieldKind, Quote,
};

/// Tag naming one field variant, as written in schema declarations.
///
/// ```
/// use typed_csv::field::FieldType;
///
/// let tag: FieldType = "time_of_day".parse().unwrap();
/// assert_eq!(tag, FieldType::TimeOfDay);
/// assert_eq!(tag.to_string(), "time_of_day");
/// assert!("money".parse::<FieldType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Null,
    Boolean,
    Integer,
    Float,
    Decimal,
    String,
    Symbol,
    Date,
    Time,
    TimeOfDay,
    Yyyymmdd,
    Hhmmss,
    Array,
    Hash,
}

impl FieldType {
    pub const ALL: [FieldType; 14] = [
        FieldType::Null,
        FieldType::Boolean,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Decimal,
        FieldType::String,
        FieldType::Symbol,
        FieldType::Date,
        FieldType::Time,
        FieldType::TimeOfDay,
        FieldType::Yyyymmdd,
        FieldType::Hhmmss,
        FieldType::Array,
        FieldType::Hash,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Decimal => "decimal",
            FieldType::String => "string",
            FieldType::Symbol => "symbol",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::TimeOfDay => "time_of_day",
            FieldType::Yyyymmdd => "yyyymmdd",
            FieldType::Hhmmss => "hhmmss",
            FieldType::Array => "array",
            FieldType::Hash => "hash",
        }
    }

    fn constructor(self) -> Constructor {
        REGISTRY
            .iter()
            .find(|(field_type, _)| *field_type == self)
            .map(|(_, constructor)| *constructor)
            .unwrap_or(construct_null)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FieldType {
    type Err = CsvError;

    fn from_str(tag: &str) -> Result<Self> {
        FieldType::ALL
            .into_iter()
            .find(|field_type| field_type.tag() == tag)
            .ok_or_else(|| CsvError::schema(format!("unknown field type '{tag}'")))
    }
}

/// Optional settings for [`Field::new`]. Settings that do not apply to the
/// chosen variant are ignored.
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    pub sym: Option<String>,
    pub quote: Option<Quote>,
    pub format: Option<String>,
    pub precision: Option<u32>,
    /// Key field of a hash.
    pub key: Option<Field>,
    /// Element field of an array, value field of a hash.
    pub value: Option<Field>,
}

type Constructor = fn(&mut FieldOptions) -> Result<FieldKind>;

static REGISTRY: [(FieldType, Constructor); 14] = [
    (FieldType::Null, construct_null),
    (FieldType::Boolean, construct_boolean),
    (FieldType::Integer, construct_integer),
    (FieldType::Float, construct_float),
    (FieldType::Decimal, construct_decimal),
    (FieldType::String, construct_string),
    (FieldType::Symbol, construct_symbol),
    (FieldType::Date, construct_date),
    (FieldType::Time, construct_time),
    (FieldType::TimeOfDay, construct_time_of_day),
    (FieldType::Yyyymmdd, construct_yyyymmdd),
    (FieldType::Hhmmss, construct_hhmmss),
    (FieldType::Array, construct_array),
    (FieldType::Hash, construct_hash),
];

fn construct_null(_: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Null)
}

fn construct_boolean(_: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Boolean)
}

fn construct_integer(_: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Integer)
}

fn construct_float(opts: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Float {
        precision: opts.precision.unwrap_or(DEFAULT_PRECISION),
    })
}

fn construct_decimal(opts: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Decimal {
        precision: opts.precision.unwrap_or(DEFAULT_PRECISION),
    })
}

fn construct_string(_: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::String)
}

fn construct_symbol(_: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Symbol)
}

fn construct_date(opts: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Date {
        format: take_format(opts, DEFAULT_DATE_FORMAT),
    })
}

fn construct_time(opts: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Time {
        format: take_format(opts, DEFAULT_TIME_FORMAT),
    })
}

fn construct_time_of_day(opts: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::TimeOfDay {
        format: take_format(opts, DEFAULT_CLOCK_FORMAT),
    })
}

fn construct_yyyymmdd(opts: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Yyyymmdd {
        format: take_format(opts, DEFAULT_DATE_FORMAT),
    })
}

fn construct_hhmmss(opts: &mut FieldOptions) -> Result<FieldKind> {
    Ok(FieldKind::Hhmmss {
        format: take_format(opts, DEFAULT_HHMMSS_FORMAT),
    })
}

fn construct_array(opts: &mut FieldOptions) -> Result<FieldKind> {
    let value = opts
        .value
        .take()
        .ok_or_else(|| CsvError::schema("array field requires an element field"))?;
    Ok(FieldKind::Array {
        value: Box::new(value),
    })
}

fn construct_hash(opts: &mut FieldOptions) -> Result<FieldKind> {
    let key = opts
        .key
        .take()
        .ok_or_else(|| CsvError::schema("hash field requires a key field"))?;
    let value = opts
        .value
        .take()
        .ok_or_else(|| CsvError::schema("hash field requires a value field"))?;
    Ok(FieldKind::Hash {
        key: Box::new(key),
        value: Box::new(value),
    })
}

fn take_format(opts: &mut FieldOptions, default: &str) -> String {
    opts.format.take().unwrap_or_else(|| default.to_string())
}

impl Field {
    /// Builds a field from a type tag and options, then validates it.
    ///
    /// ```
    /// use typed_csv::field::{Field, FieldOptions, FieldType};
    ///
    /// let field = Field::new(
    ///     "Trade Date",
    ///     FieldType::Date,
    ///     FieldOptions { format: Some("%Y-%m-%d".into()), ..Default::default() },
    /// )
    /// .unwrap();
    /// assert_eq!(field.sym(), "trade_date");
    /// assert_eq!(field.format(), Some("%Y-%m-%d"));
    /// ```
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        mut options: FieldOptions,
    ) -> Result<Field> {
        let kind = (field_type.constructor())(&mut options)?;
        let mut field = Field::with_kind(name, kind);
        if let Some(quote) = options.quote {
            field = field.with_quote(Some(quote));
        }
        if let Some(sym) = options.sym {
            field = field.with_sym(sym);
        }
        field.validate()?;
        Ok(field)
    }

    /// Same as [`Field::new`] with the type given by its tag.
    pub fn from_tag(name: impl Into<String>, tag: &str, options: FieldOptions) -> Result<Field> {
        Field::new(name, tag.parse()?, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.tag().parse::<FieldType>().unwrap(), field_type);
        }
    }

    #[test]
    fn registry_covers_every_type() {
        for field_type in FieldType::ALL {
            assert!(REGISTRY.iter().any(|(t, _)| *t == field_type));
        }
    }

    #[test]
    fn registry_builds_the_matching_variant() {
        let options = || FieldOptions {
            key: Some(Field::symbol("k")),
            value: Some(Field::integer("v")),
            ..Default::default()
        };
        for field_type in FieldType::ALL {
            let field = Field::new("x", field_type, options()).unwrap();
            assert_eq!(field.field_type(), field_type);
        }
    }

    #[test]
    fn unknown_tag_is_a_schema_error() {
        let result = Field::from_tag("x", "currency", FieldOptions::default());
        assert!(matches!(result, Err(CsvError::SchemaConfiguration(_))));
    }

    #[test]
    fn array_without_element_is_a_schema_error() {
        let result = Field::new("x", FieldType::Array, FieldOptions::default());
        assert!(matches!(result, Err(CsvError::SchemaConfiguration(_))));
    }

    #[test]
    fn unsupported_format_fails_at_construction() {
        let options = FieldOptions {
            format: Some("%Y.%m.%d".into()),
            ..Default::default()
        };
        let result = Field::new("d", FieldType::Yyyymmdd, options);
        assert!(matches!(result, Err(CsvError::SchemaConfiguration(_))));
    }

    #[test]
    fn options_carry_quote_precision_and_sym() {
        let options = FieldOptions {
            sym: Some("px".into()),
            quote: Some(Quote::Double),
            precision: Some(2),
            ..Default::default()
        };
        let field = Field::new("Price", FieldType::Float, options).unwrap();
        assert_eq!(field.sym(), "px");
        assert_eq!(field.quote(), Some(Quote::Double));
        assert_eq!(field.precision(), Some(2));
    }
}
