//! Stream tokenizer turning characters into rows.
//!
//! Rows are read one line at a time. With a field list, every source column
//! is read through its [`Field`] and placed at its mapped destination slot;
//! without one, the line is split naively on commas into strings.
//!
//! # Examples
//!
//! ```
//! use typed_csv::field::{Field, Value};
//! use typed_csv::reader::{self, ReadOptions};
//!
//! let fields = [Field::string("x"), Field::string("y"), Field::string("z")];
//! let mappings = [1, -1, 0];
//! let rows = reader::read_string(
//!     "x,y,z\n",
//!     ReadOptions::new().fields(&fields).field_mappings(&mappings),
//! )
//! .unwrap();
//!
//! assert_eq!(rows, vec![vec![Value::from("z"), Value::from("x")]]);
//! ```

use std::{borrow::Cow, fs::File, io::BufReader, path::Path};

use log::{debug, info, trace};

use crate::{
    core::stream::{CharReader, CharStream},
    error::{CsvError, Result},
    field::{COMMA, CR, Field, LF, Value},
};

/// One parsed line, positionally aligned with the destination slots.
pub type Row = Vec<Value>;

/// Per-call reading configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions<'a> {
    fields: Option<&'a [Field]>,
    header_rows: usize,
    field_mappings: Option<&'a [i32]>,
}

impl<'a> ReadOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed fields, one per source column. Without fields, lines are split naively.
    pub fn fields(mut self, fields: &'a [Field]) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Number of leading lines discarded before data rows begin.
    pub fn header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    /// Source column index to destination slot; negative entries skip the column.
    pub fn field_mappings(mut self, field_mappings: &'a [i32]) -> Self {
        self.field_mappings = Some(field_mappings);
        self
    }

    pub fn get_fields(&self) -> Option<&'a [Field]> {
        self.fields
    }

    pub fn get_header_rows(&self) -> usize {
        self.header_rows
    }

    pub fn get_field_mappings(&self) -> Option<&'a [i32]> {
        self.field_mappings
    }
}

/// Validated pairing of a field list with its column mappings.
#[derive(Debug, Clone)]
pub struct RowLayout<'a> {
    fields: &'a [Field],
    mappings: Cow<'a, [i32]>,
    num_fields: usize,
}

impl<'a> RowLayout<'a> {
    /// Pairs `fields` with `mappings` (identity when `None`).
    ///
    /// Fails when the mapping length differs from the field count or when a
    /// mapping points past the last destination slot.
    pub fn new(fields: &'a [Field], mappings: Option<&'a [i32]>) -> Result<Self> {
        let mappings = match mappings {
            Some(mappings) => Cow::Borrowed(mappings),
            None => Cow::Owned((0..fields.len()).map(|i| i as i32).collect()),
        };
        if mappings.len() != fields.len() {
            return Err(CsvError::schema(format!(
                "{} field mappings given for {} fields",
                mappings.len(),
                fields.len()
            )));
        }
        let num_fields = mappings.iter().filter(|m| **m >= 0).count();
        if let Some(bad) = mappings.iter().find(|m| **m >= 0 && (**m as usize) >= num_fields) {
            return Err(CsvError::schema(format!(
                "mapped field index {bad} >= number of fields {num_fields}"
            )));
        }
        Ok(RowLayout {
            fields,
            mappings,
            num_fields,
        })
    }

    /// Number of destination slots in each row.
    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    pub fn fields(&self) -> &'a [Field] {
        self.fields
    }
}

pub fn read_file(path: impl AsRef<Path>, options: ReadOptions<'_>) -> Result<Vec<Row>> {
    let path = path.as_ref();
    info!("reading {}", path.display());
    let file = File::open(path)?;
    read_stream(&mut CharReader::new(BufReader::new(file)), options)
}

pub fn read_string(text: &str, options: ReadOptions<'_>) -> Result<Vec<Row>> {
    read_stream(&mut CharReader::from_text(text), options)
}

/// Reads every remaining row of `stream`.
///
/// Header rows are soaked first, unparsed. When the field mappings leave no
/// destination slot, nothing is consumed and no rows are returned. Any
/// conversion failure aborts the whole read.
pub fn read_stream<S: CharStream + ?Sized>(
    stream: &mut S,
    options: ReadOptions<'_>,
) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    match options.fields {
        Some(fields) => {
            let layout = RowLayout::new(fields, options.field_mappings)?;
            if layout.num_fields() == 0 {
                debug!("no mapped fields, nothing to read");
                return Ok(rows);
            }
            soak_header_rows(stream, options.header_rows)?;
            while !stream.is_eof()? {
                rows.push(read_row(stream, &layout)?);
                log_progress(rows.len());
            }
        }
        None => {
            soak_header_rows(stream, options.header_rows)?;
            while !stream.is_eof()? {
                rows.push(read_raw_row(stream)?);
                log_progress(rows.len());
            }
        }
    }
    debug!("read {} rows", rows.len());
    Ok(rows)
}

fn log_progress(count: usize) {
    if count % 100 == 0 {
        trace!("read row {count}");
    }
}

/// Reads one line through `layout` into a full-width row.
///
/// Slots the line did not reach stay [`Value::Absent`].
pub fn read_row<S: CharStream + ?Sized>(stream: &mut S, layout: &RowLayout<'_>) -> Result<Row> {
    let mut row = vec![Value::Absent; layout.num_fields];
    for (field, &mapped) in layout.fields.iter().zip(layout.mappings.iter()) {
        if stream.is_eof()? {
            break;
        }
        // read even when unmapped so the cursor stays on the next column
        let value = field.read_csv(stream)?;
        if let Ok(slot) = usize::try_from(mapped) {
            row[slot] = value;
        }
    }
    soak_eol(stream)?;
    Ok(row)
}

/// Reads one line and splits it on commas. Trailing empty columns are dropped.
pub fn read_raw_row<S: CharStream + ?Sized>(stream: &mut S) -> Result<Row> {
    let mut line = String::new();
    soak_line(stream, Some(&mut line))?;
    let mut parts: Vec<&str> = if line.is_empty() {
        Vec::new()
    } else {
        line.split(COMMA).collect()
    };
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    Ok(parts.into_iter().map(Value::from).collect())
}

/// Reads the next line field by field, calling `on_value` with each value,
/// its field and the field's index.
///
/// Stops quietly if the stream runs out before every field is read, so a
/// short final line yields fewer calls. Line terminators are soaked
/// afterwards when `soak_trailing_eol` is set.
pub fn read_line<S, F>(
    stream: &mut S,
    fields: &[Field],
    soak_trailing_eol: bool,
    mut on_value: F,
) -> Result<()>
where
    S: CharStream + ?Sized,
    F: FnMut(Value, &Field, usize) -> Result<()>,
{
    for (index, field) in fields.iter().enumerate() {
        if stream.is_eof()? {
            break;
        }
        on_value(read_field(stream, field)?, field, index)?;
    }
    if soak_trailing_eol {
        soak_eol(stream)?;
    }
    Ok(())
}

/// Returns the converted value of the next field.
pub fn read_field<S: CharStream + ?Sized>(stream: &mut S, field: &Field) -> Result<Value> {
    field.read_csv(stream)
}

/// Consumes any run of CR and LF characters, stopping before the first other
/// character.
pub fn soak_eol<S: CharStream + ?Sized>(stream: &mut S) -> Result<()> {
    while let Some(ch) = stream.next_char()? {
        if ch != LF && ch != CR {
            stream.unget(ch);
            break;
        }
    }
    Ok(())
}

/// Consumes one line and its terminators, appending its content to `out` if given.
pub fn soak_line<S: CharStream + ?Sized>(
    stream: &mut S,
    mut out: Option<&mut String>,
) -> Result<()> {
    while let Some(ch) = stream.next_char()? {
        if ch == LF || ch == CR {
            return soak_eol(stream);
        }
        if let Some(buf) = &mut out {
            buf.push(ch);
        }
    }
    Ok(())
}

pub fn soak_header_rows<S: CharStream + ?Sized>(
    stream: &mut S,
    header_rows: usize,
) -> Result<()> {
    for _ in 0..header_rows {
        soak_line(stream, None)?;
    }
    if header_rows > 0 {
        debug!("skipped {header_rows} header rows");
    }
    Ok(())
}
