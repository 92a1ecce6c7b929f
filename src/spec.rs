//! Declarative schemas.
//!
//! A [`Spec`] is an ordered list of named, typed fields plus header-row and
//! column-mapping configuration. It is assembled once with a [`SpecBuilder`]
//! and then threaded into every read made against it.
//!
//! # Examples
//!
//! ```
//! use typed_csv::field::{Field, Value};
//! use typed_csv::spec::{GenericModel, SpecBuilder};
//!
//! let spec = SpecBuilder::new()
//!     .field(Field::symbol("Symbol"))
//!     .field(Field::date("Date").with_format("%Y-%m-%d"))
//!     .field(Field::time_of_day("Time"))
//!     .field(Field::float("Close"))
//!     .field(Field::integer("Volume"))
//!     .build()
//!     .unwrap();
//!
//! let csv = "symbol,date,time,close,volume\nIBM,2024-03-01,9:30:00,185.25,1200\n";
//! let ticks: Vec<GenericModel> = spec.models_from_string(csv, None).unwrap();
//!
//! assert_eq!(ticks[0].get("time"), Some(&Value::Integer(34200)));
//! assert_eq!(ticks[0].get("volume"), Some(&Value::Integer(1200)));
//! ```

use std::{collections::HashMap, io, path::Path};

use csv::{Terminator, WriterBuilder};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    core::stream::CharStream,
    error::{CsvError, Result},
    field::{Field, Value},
    reader::{self, ReadOptions, Row, RowLayout},
};

/// Header rows skipped by a spec unless configured otherwise.
pub const DEFAULT_HEADER_ROWS: usize = 1;

/// Attribute name to value, in column order.
pub type Attributes = IndexMap<String, Value>;

/// A record type that can be built from named attributes.
pub trait Model: Sized {
    fn from_attributes(attributes: Attributes) -> Result<Self>;
}

/// Record holding whatever attributes its spec produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenericModel {
    attributes: Attributes,
}

impl GenericModel {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl Model for GenericModel {
    fn from_attributes(attributes: Attributes) -> Result<Self> {
        Ok(GenericModel { attributes })
    }
}

/// An immutable schema. Build one with [`SpecBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    fields: Vec<Field>,
    header_rows: usize,
    field_mappings: Option<Vec<i32>>,
    model_map: Option<HashMap<String, String>>,
}

impl Spec {
    pub fn builder() -> SpecBuilder {
        SpecBuilder::new()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    /// Position of the field whose symbolic name is `sym`.
    pub fn field_index(&self, sym: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.sym() == sym)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    pub fn field_mappings(&self) -> Option<&[i32]> {
        self.field_mappings.as_deref()
    }

    /// Header line listing the field names, without a line terminator.
    ///
    /// Names containing commas or quotes are quoted the usual CSV way.
    pub fn csv_head(&self) -> Result<String> {
        header_line(self.field_names())
    }

    pub fn read_options(&self) -> ReadOptions<'_> {
        let options = ReadOptions::new()
            .fields(&self.fields)
            .header_rows(self.header_rows);
        match &self.field_mappings {
            Some(mappings) => options.field_mappings(mappings),
            None => options,
        }
    }

    pub fn rows_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<Row>> {
        reader::read_file(path, self.read_options())
    }

    pub fn rows_from_string(&self, text: &str) -> Result<Vec<Row>> {
        reader::read_string(text, self.read_options())
    }

    pub fn rows_from_stream<S: CharStream + ?Sized>(&self, stream: &mut S) -> Result<Vec<Row>> {
        reader::read_stream(stream, self.read_options())
    }

    /// Attribute name for each column, `None` for Null fields.
    ///
    /// `map` (or, when it is `None`, the spec's own model map) renames
    /// selected field syms; unmapped fields keep their sym.
    pub fn model_attributes(&self, map: Option<&HashMap<String, String>>) -> Vec<Option<String>> {
        let map = map.or(self.model_map.as_ref());
        self.fields
            .iter()
            .map(|field| {
                if field.is_null() {
                    return None;
                }
                let sym = field.sym();
                let attribute = map.and_then(|m| m.get(sym)).map_or(sym, String::as_str);
                Some(attribute.to_string())
            })
            .collect()
    }

    /// Attribute name for each row slot. With field mappings, each mapped
    /// field's attribute moves to its destination slot.
    fn slot_attributes(&self, map: Option<&HashMap<String, String>>) -> Vec<Option<String>> {
        let attributes = self.model_attributes(map);
        let Some(mappings) = self.field_mappings.as_deref() else {
            return attributes;
        };
        let width = mappings.iter().filter(|m| **m >= 0).count();
        let mut slots = vec![None; width];
        for (attribute, &mapped) in attributes.into_iter().zip(mappings) {
            let slot = usize::try_from(mapped).ok().and_then(|i| slots.get_mut(i));
            if let Some(slot) = slot {
                *slot = attribute;
            }
        }
        slots
    }

    /// Builds one record per row through the record's keyed constructor.
    ///
    /// Rows are expected in slot order, as the spec's own reads return them.
    pub fn models_from_rows<M: Model>(
        &self,
        rows: Vec<Row>,
        map: Option<&HashMap<String, String>>,
    ) -> Result<Vec<M>> {
        let attributes = self.slot_attributes(map);
        rows.into_iter()
            .map(|row| {
                let args: Attributes = row
                    .into_iter()
                    .zip(attributes.iter())
                    .filter_map(|(value, attribute)| Some((attribute.clone()?, value)))
                    .collect();
                M::from_attributes(args)
            })
            .collect()
    }

    pub fn models_from_file<M: Model>(
        &self,
        path: impl AsRef<Path>,
        map: Option<&HashMap<String, String>>,
    ) -> Result<Vec<M>> {
        let rows = self.rows_from_file(path)?;
        self.models_from_rows(rows, map)
    }

    pub fn models_from_string<M: Model>(
        &self,
        text: &str,
        map: Option<&HashMap<String, String>>,
    ) -> Result<Vec<M>> {
        let rows = self.rows_from_string(text)?;
        self.models_from_rows(rows, map)
    }

    pub fn models_from_stream<M: Model, S: CharStream + ?Sized>(
        &self,
        stream: &mut S,
        map: Option<&HashMap<String, String>>,
    ) -> Result<Vec<M>> {
        let rows = self.rows_from_stream(stream)?;
        self.models_from_rows(rows, map)
    }
}

/// Joins header names into one line, without a terminator. Names containing
/// commas or quotes are quoted the usual CSV way.
pub fn header_line<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(names).map_err(io::Error::from)?;
    let bytes = wtr
        .into_inner()
        .map_err(|error| io::Error::new(error.error().kind(), error.to_string()))?;
    let head = String::from_utf8(bytes)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    Ok(head.trim_end_matches('\n').to_string())
}

/// Collects fields and configuration for a [`Spec`].
///
/// # Default Configuration
///
/// - Header rows: 1
/// - Field mappings: none (identity)
/// - Model map: none
#[derive(Debug, Clone)]
pub struct SpecBuilder {
    fields: Vec<Field>,
    header_rows: usize,
    field_mappings: Option<Vec<i32>>,
    model_map: Option<HashMap<String, String>>,
}

impl Default for SpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecBuilder {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            header_rows: DEFAULT_HEADER_ROWS,
            field_mappings: None,
            model_map: None,
        }
    }

    /// Appends a field; columns keep declaration order.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn field_mappings(mut self, field_mappings: Vec<i32>) -> Self {
        self.field_mappings = Some(field_mappings);
        self
    }

    /// Renames field syms to record attribute names. Only fields whose names
    /// differ need an entry.
    pub fn model_map<K, V>(mut self, map: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.model_map = Some(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Validates every field format and the mappings, then freezes the spec.
    pub fn build(self) -> Result<Spec> {
        for field in &self.fields {
            field.validate()?;
        }
        if self.field_mappings.is_some() {
            RowLayout::new(&self.fields, self.field_mappings.as_deref())?;
        }
        if let Some(map) = &self.model_map {
            let known = |sym: &str| self.fields.iter().any(|f| f.sym() == sym);
            if let Some(unknown) = map.keys().find(|sym| !known(sym.as_str())) {
                return Err(CsvError::schema(format!(
                    "model map names unknown field '{unknown}'"
                )));
            }
        }
        Ok(Spec {
            fields: self.fields,
            header_rows: self.header_rows,
            field_mappings: self.field_mappings,
            model_map: self.model_map,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::core::stream::CharReader;

    fn price_spec() -> Spec {
        SpecBuilder::new()
            .field(Field::string("sym"))
            .field(Field::date("date").with_format("%Y%m%d"))
            .field(Field::float("price").with_precision(6))
            .build()
            .unwrap()
    }

    #[test]
    fn rows_from_string_skips_one_header_by_default() {
        let rows = price_spec()
            .rows_from_string("sym,date,price\nAAA,20240101,12.500000\n")
            .unwrap();
        assert_eq!(
            rows,
            vec![vec![
                Value::from("AAA"),
                Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                Value::Float(12.5),
            ]]
        );
    }

    #[test]
    fn rows_from_stream_uses_spec_configuration() {
        let spec = SpecBuilder::new()
            .fields([Field::string("a"), Field::string("b"), Field::string("c")])
            .header_rows(2)
            .field_mappings(vec![1, -1, 0])
            .build()
            .unwrap();
        let mut stream = CharReader::from_text("h\nh\nx,y,z\n");
        let rows = spec.rows_from_stream(&mut stream).unwrap();
        assert_eq!(rows, vec![vec![Value::from("z"), Value::from("x")]]);
    }

    #[test]
    fn field_lookups() {
        let spec = SpecBuilder::new()
            .field(Field::string("Ticker Symbol"))
            .field(Field::integer("Volume"))
            .build()
            .unwrap();
        assert_eq!(spec.field_names(), ["Ticker Symbol", "Volume"]);
        assert_eq!(spec.field_index("volume"), Some(1));
        assert_eq!(spec.field_index("ticker_symbol"), Some(0));
        assert_eq!(spec.field_index("close"), None);
        assert_eq!(spec.field_count(), 2);
    }

    #[test]
    fn csv_head_quotes_awkward_names() {
        let spec = SpecBuilder::new()
            .field(Field::string("name"))
            .field(Field::string("high, low"))
            .build()
            .unwrap();
        assert_eq!(spec.csv_head().unwrap(), "name,\"high, low\"");
    }

    #[test]
    fn model_attributes_skip_null_fields_and_apply_map() {
        let spec = SpecBuilder::new()
            .field(Field::string("sym"))
            .field(Field::null("ignored"))
            .field(Field::float("px"))
            .model_map([("px", "price")])
            .build()
            .unwrap();
        assert_eq!(
            spec.model_attributes(None),
            vec![Some("sym".to_string()), None, Some("price".to_string())]
        );
        let override_map = HashMap::from([("sym".to_string(), "ticker".to_string())]);
        assert_eq!(
            spec.model_attributes(Some(&override_map)),
            vec![Some("ticker".to_string()), None, Some("px".to_string())]
        );
    }

    #[test]
    fn models_from_rows_builds_generic_models() {
        let spec = SpecBuilder::new()
            .field(Field::string("sym"))
            .field(Field::null("skip"))
            .field(Field::integer("qty"))
            .build()
            .unwrap();
        let models: Vec<GenericModel> = spec
            .models_from_string("h\nAAA,zzz,3\nBBB,,4\n", None)
            .unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].get("sym"), Some(&Value::from("BBB")));
        assert_eq!(models[1].get("qty"), Some(&Value::Integer(4)));
        assert_eq!(models[0].get("skip"), None);
        assert_eq!(models[0].attributes().len(), 2);
    }

    #[test]
    fn mapped_models_pair_attributes_with_their_slots() {
        let spec = SpecBuilder::new()
            .field(Field::string("sym"))
            .field(Field::string("note"))
            .field(Field::integer("qty"))
            .field_mappings(vec![1, -1, 0])
            .header_rows(0)
            .build()
            .unwrap();
        let models: Vec<GenericModel> = spec.models_from_string("IBM,x,5
", None).unwrap();
        let attributes = models[0].attributes();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes.get_index(0), Some((&"qty".to_string(), &Value::Integer(5))));
        assert_eq!(models[0].get("sym"), Some(&Value::from("IBM")));
        assert_eq!(models[0].get("note"), None);
    }

    #[derive(Debug, PartialEq)]
    struct Position {
        ticker: String,
        quantity: i64,
    }

    impl Model for Position {
        fn from_attributes(attributes: Attributes) -> Result<Self> {
            let ticker = attributes
                .get("ticker")
                .and_then(Value::as_str)
                .ok_or_else(|| CsvError::schema("ticker missing"))?;
            let quantity = attributes
                .get("quantity")
                .and_then(Value::as_i64)
                .unwrap_or_default();
            Ok(Position {
                ticker: ticker.to_string(),
                quantity,
            })
        }
    }

    #[test]
    fn models_from_rows_builds_bespoke_records() {
        let spec = SpecBuilder::new()
            .field(Field::string("sym"))
            .field(Field::integer("qty"))
            .header_rows(0)
            .model_map([("sym", "ticker"), ("qty", "quantity")])
            .build()
            .unwrap();
        let positions: Vec<Position> = spec.models_from_string("IBM,10\nAAPL,\n", None).unwrap();
        assert_eq!(
            positions,
            vec![
                Position {
                    ticker: "IBM".into(),
                    quantity: 10
                },
                Position {
                    ticker: "AAPL".into(),
                    quantity: 0
                },
            ]
        );
    }

    #[test]
    fn build_rejects_bad_configuration() {
        let bad_mapping = SpecBuilder::new()
            .field(Field::string("a"))
            .field_mappings(vec![0, 1])
            .build();
        assert!(matches!(bad_mapping, Err(CsvError::SchemaConfiguration(_))));

        let bad_format = SpecBuilder::new()
            .field(Field::time_of_day("t").with_format("%H:%M"))
            .build();
        assert!(matches!(bad_format, Err(CsvError::SchemaConfiguration(_))));

        let bad_map = SpecBuilder::new()
            .field(Field::string("a"))
            .model_map([("b", "c")])
            .build();
        assert!(matches!(bad_map, Err(CsvError::SchemaConfiguration(_))));
    }
}
