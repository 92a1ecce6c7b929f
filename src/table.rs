//! In-memory tables of typed rows.
//!
//! A [`Table`] couples a field list and its read configuration with the rows
//! read so far. Every read appends, so several sources can be merged into one
//! table.

use std::{io::Write, ops::Index, path::Path, slice};

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::{
    core::stream::CharStream,
    error::Result,
    field::{COMMA, Field, Value},
    reader::{self, ReadOptions, Row},
    spec::{DEFAULT_HEADER_ROWS, Spec, header_line},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    fields: Vec<Field>,
    header_row_count: usize,
    field_mappings: Option<Vec<i32>>,
    rows: Vec<Row>,
}

impl Table {
    /// Empty table skipping one header row, with no field mappings.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            header_row_count: DEFAULT_HEADER_ROWS,
            field_mappings: None,
            rows: Vec::new(),
        }
    }

    /// Empty table configured like `spec`.
    pub fn from_spec(name: impl Into<String>, spec: &Spec) -> Self {
        Self {
            name: name.into(),
            fields: spec.fields().to_vec(),
            header_row_count: spec.header_rows(),
            field_mappings: spec.field_mappings().map(<[i32]>::to_vec),
            rows: Vec::new(),
        }
    }

    pub fn with_header_row_count(mut self, header_row_count: usize) -> Self {
        self.header_row_count = header_row_count;
        self
    }

    pub fn with_field_mappings(mut self, field_mappings: Vec<i32>) -> Self {
        self.field_mappings = Some(field_mappings);
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header_row_count(&self) -> usize {
        self.header_row_count
    }

    pub fn field_mappings(&self) -> Option<&[i32]> {
        self.field_mappings.as_deref()
    }

    fn read_options(&self) -> ReadOptions<'_> {
        let options = ReadOptions::new()
            .fields(&self.fields)
            .header_rows(self.header_row_count);
        match &self.field_mappings {
            Some(mappings) => options.field_mappings(mappings),
            None => options,
        }
    }

    fn append(&mut self, rows: Vec<Row>) -> usize {
        let count = rows.len();
        self.rows.extend(rows);
        debug!("table {}: appended {count} rows", self.name);
        count
    }

    /// Appends the rows of a file and returns how many were read.
    pub fn read_csv_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let rows = reader::read_file(path, self.read_options())?;
        Ok(self.append(rows))
    }

    pub fn read_csv_string(&mut self, text: &str) -> Result<usize> {
        let rows = reader::read_string(text, self.read_options())?;
        Ok(self.append(rows))
    }

    pub fn read_csv_stream<S: CharStream + ?Sized>(&mut self, stream: &mut S) -> Result<usize> {
        let rows = reader::read_stream(stream, self.read_options())?;
        Ok(self.append(rows))
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Values of one column, [`Value::Absent`] where a row is too short.
    pub fn column(&self, index: usize) -> Vec<Value> {
        self.rows.iter().map(|row| cell(row, index)).collect()
    }

    /// Distinct values of one column, in first-seen order.
    pub fn column_to_set(&self, index: usize) -> IndexSet<Value> {
        self.rows.iter().map(|row| cell(row, index)).collect()
    }

    /// Rows keyed by one column. Later rows replace earlier rows with the same key.
    pub fn hash_keyed_by_column(&self, index: usize) -> IndexMap<Value, &Row> {
        self.rows.iter().map(|row| (cell(row, index), row)).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Writes a header line of field names, then every row with each value
    /// serialised by the field at the same position.
    pub fn write_csv<W: Write>(&self, sink: &mut W) -> Result<()> {
        let header = header_line(self.fields.iter().map(Field::name))?;
        writeln!(sink, "{header}")?;
        for row in &self.rows {
            let mut line = String::new();
            for (index, (field, value)) in self.fields.iter().zip(row).enumerate() {
                if index > 0 {
                    line.push(COMMA);
                }
                line.push_str(&field.value_to_s(value)?);
            }
            writeln!(sink, "{line}")?;
        }
        Ok(())
    }
}

fn cell(row: &Row, index: usize) -> Value {
    row.get(index).cloned().unwrap_or_default()
}

impl Index<usize> for Table {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for Table {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
