//! Bidirectional mapping between record types and CSV lines.
//!
//! Any type that lists its fields and can get and set a value by field index
//! implements [`CsvRecord`] and gains line, stream and file conversions.
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use typed_csv::core::stream::CharReader;
//! use typed_csv::error::{CsvError, Result};
//! use typed_csv::field::{Field, Value};
//! use typed_csv::row::CsvRecord;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Fill {
//!     symbol: String,
//!     quantity: i64,
//! }
//!
//! static FIELDS: LazyLock<Vec<Field>> =
//!     LazyLock::new(|| vec![Field::string("symbol"), Field::integer("quantity")]);
//!
//! impl CsvRecord for Fill {
//!     fn csv_fields() -> &'static [Field] {
//!         &FIELDS
//!     }
//!
//!     fn get_field(&self, index: usize) -> Result<Value> {
//!         match index {
//!             0 => Ok(Value::from(self.symbol.as_str())),
//!             1 => Ok(Value::Integer(self.quantity)),
//!             _ => Err(CsvError::schema(format!("no field {index}"))),
//!         }
//!     }
//!
//!     fn set_field(&mut self, index: usize, value: Value) -> Result<()> {
//!         match (index, value) {
//!             (0, Value::String(s)) => self.symbol = s,
//!             (1, Value::Integer(q)) => self.quantity = q,
//!             (_, Value::Absent) => {}
//!             (i, v) => return Err(CsvError::schema(format!("field {i} cannot take {v:?}"))),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let fill = Fill { symbol: "IBM".into(), quantity: 100 };
//! assert_eq!(fill.to_csv_line().unwrap(), "IBM,100");
//!
//! let fills = Fill::from_csv_lines(&mut CharReader::from_text("IBM,100\nMSFT,5\n")).unwrap();
//! assert_eq!(fills[0], fill);
//! assert_eq!(Fill::csv_header().unwrap(), "symbol,quantity");
//! ```

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::{debug, info};

use crate::{
    core::stream::{CharReader, CharStream},
    error::Result,
    field::{COMMA, Field, LF, Value},
    reader::{read_line, soak_eol, soak_header_rows},
    spec::{Attributes, Model, header_line},
};

/// A record that serializes to and populates from one CSV line.
///
/// Implementors list their fields once and expose get/set by field index;
/// every conversion below is derived from those three items.
pub trait CsvRecord {
    /// Fields in column order, shared by every instance.
    fn csv_fields() -> &'static [Field];

    /// Value of the field at `index`.
    fn get_field(&self, index: usize) -> Result<Value>;

    /// Stores `value` into the field at `index`.
    fn set_field(&mut self, index: usize, value: Value) -> Result<()>;

    /// Renders the record as one line, without a terminator.
    fn to_csv_line(&self) -> Result<String> {
        let mut line = String::new();
        for (index, field) in Self::csv_fields().iter().enumerate() {
            if index > 0 {
                line.push(COMMA);
            }
            line.push_str(&field.value_to_s(&self.get_field(index)?)?);
        }
        Ok(line)
    }

    /// Populates the record from the next line of `stream`.
    ///
    /// Fields past the end of the stream are left untouched.
    fn from_csv_line<S: CharStream + ?Sized>(&mut self, stream: &mut S) -> Result<()>
    where
        Self: Sized,
    {
        read_line(stream, Self::csv_fields(), true, |value, _, index| {
            self.set_field(index, value)
        })
    }

    /// Reads the next line into attributes keyed by field sym.
    fn hash_from_csv_line<S: CharStream + ?Sized>(stream: &mut S) -> Result<Attributes>
    where
        Self: Sized,
    {
        let mut attributes = Attributes::new();
        read_line(stream, Self::csv_fields(), true, |value, field, _| {
            attributes.insert(field.sym().to_string(), value);
            Ok(())
        })?;
        Ok(attributes)
    }

    /// Builds a fresh record from the next line through its setters.
    fn read_csv_line<S: CharStream + ?Sized>(stream: &mut S) -> Result<Self>
    where
        Self: Sized + Default,
    {
        let mut record = Self::default();
        record.from_csv_line(stream)?;
        Ok(record)
    }

    /// Builds a fresh record from the next line through its keyed constructor.
    fn keyed_from_csv_line<S: CharStream + ?Sized>(stream: &mut S) -> Result<Self>
    where
        Self: Sized + Model,
    {
        Self::from_attributes(Self::hash_from_csv_line(stream)?)
    }

    /// Reads every remaining line of `stream`.
    fn from_csv_lines<S: CharStream + ?Sized>(stream: &mut S) -> Result<Vec<Self>>
    where
        Self: Sized + Default,
    {
        let mut records = Vec::new();
        while !stream.is_eof()? {
            records.push(Self::read_csv_line(stream)?);
            soak_eol(stream)?;
        }
        Ok(records)
    }

    /// Reads every record of a file, skipping its single header line.
    fn from_csv_file(path: impl AsRef<Path>) -> Result<Vec<Self>>
    where
        Self: Sized + Default,
    {
        let path = path.as_ref();
        info!("reading {}", path.display());
        let mut stream = CharReader::new(BufReader::new(File::open(path)?));
        soak_header_rows(&mut stream, 1)?;
        let records = Self::from_csv_lines(&mut stream)?;
        debug!("read {} records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Header line of field names, without a terminator. Names containing
    /// commas or quotes are quoted.
    fn csv_header() -> Result<String> {
        header_line(Self::csv_fields().iter().map(Field::name))
    }

    /// Writes the header line and one line per record to `sink`.
    fn write_csv<W: Write>(sink: &mut W, records: &[Self]) -> Result<()>
    where
        Self: Sized,
    {
        writeln!(sink, "{}", Self::csv_header()?)?;
        for record in records {
            writeln!(sink, "{}", record.to_csv_line()?)?;
        }
        Ok(())
    }

    /// Writes `records` to `path`, creating parent directories and replacing
    /// any existing file.
    fn to_csv_file(path: impl AsRef<Path>, records: &[Self]) -> Result<()>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        info!("writing {}", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut sink = BufWriter::new(File::create(path)?);
        Self::write_csv(&mut sink, records)?;
        sink.flush()?;
        Ok(())
    }

    /// Concatenates the lines of `records`, each followed by a line feed.
    fn to_csv_str(records: &[Self]) -> Result<String>
    where
        Self: Sized,
    {
        let mut out = String::new();
        for record in records {
            out.push_str(&record.to_csv_line()?);
            out.push(LF);
        }
        Ok(out)
    }
}
