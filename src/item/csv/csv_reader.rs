use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufRead, BufReader},
    marker::PhantomData,
    path::Path,
};

use log::{debug, info};

use crate::{
    core::{
        item::{ItemReader, ItemReaderResult},
        stream::{CharReader, CharStream},
    },
    error::{CsvError, Result},
    reader::{Row, RowLayout, read_row, soak_eol, soak_header_rows},
    row::CsvRecord,
    spec::Spec,
};

/// Streams typed rows described by a [`Spec`], one row per [`ItemReader::read`].
///
/// Header rows are skipped on the first read. Unlike [`Spec::rows_from_stream`]
/// the whole source is never held in memory.
///
/// # Examples
///
/// ```
/// use typed_csv::core::item::ItemReader;
/// use typed_csv::field::{Field, Value};
/// use typed_csv::item::csv::csv_reader::SpecItemReaderBuilder;
/// use typed_csv::spec::Spec;
///
/// let spec = Spec::builder()
///     .field(Field::string("city"))
///     .field(Field::integer("pop"))
///     .build()
///     .unwrap();
///
/// let reader = SpecItemReaderBuilder::new(spec)
///     .from_reader("city,pop\nBoston,4628910\nConcord,42695\n".as_bytes());
///
/// let row = reader.read().unwrap().unwrap();
/// assert_eq!(row, vec![Value::from("Boston"), Value::Integer(4628910)]);
/// assert!(reader.read().unwrap().is_some());
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct SpecItemReader<R> {
    spec: Spec,
    header_rows: usize,
    stream: RefCell<CharReader<R>>,
    header_pending: Cell<bool>,
}

impl<R: BufRead> SpecItemReader<R> {
    fn next_row(&self) -> Result<Option<Row>> {
        let layout = RowLayout::new(self.spec.fields(), self.spec.field_mappings())?;
        if layout.num_fields() == 0 {
            return Ok(None);
        }
        let mut stream = self.stream.borrow_mut();
        if self.header_pending.replace(false) {
            soak_header_rows(&mut *stream, self.header_rows)?;
        }
        if stream.is_eof()? {
            return Ok(None);
        }
        read_row(&mut *stream, &layout).map(Some)
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }
}

impl<R: BufRead> ItemReader<Row> for SpecItemReader<R> {
    /// Reads the next row.
    ///
    /// # Returns
    /// - `Ok(Some(row))` if a row is read
    /// - `Ok(None)` once the source is drained
    /// - `Err(CsvError::ItemReader(_))` if the text cannot be read or converted
    fn read(&self) -> ItemReaderResult<Row> {
        self.next_row()
            .map_err(|error| CsvError::ItemReader(error.to_string()))
    }
}

pub struct SpecItemReaderBuilder {
    spec: Spec,
    header_rows: Option<usize>,
}

impl SpecItemReaderBuilder {
    pub fn new(spec: Spec) -> Self {
        Self {
            spec,
            header_rows: None,
        }
    }

    /// Overrides the number of header rows the spec declares.
    pub fn header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = Some(header_rows);
        self
    }

    pub fn from_reader<R: BufRead>(self, rdr: R) -> SpecItemReader<R> {
        let header_rows = self.header_rows.unwrap_or(self.spec.header_rows());
        SpecItemReader {
            spec: self.spec,
            header_rows,
            stream: RefCell::new(CharReader::new(rdr)),
            header_pending: Cell::new(true),
        }
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<SpecItemReader<BufReader<File>>> {
        let path = path.as_ref();
        info!("reading {}", path.display());
        let file = File::open(path)?;
        Ok(self.from_reader(BufReader::new(file)))
    }
}

/// Streams [`CsvRecord`]s, one per [`ItemReader::read`].
///
/// ```
/// use std::sync::LazyLock;
///
/// use typed_csv::core::item::ItemReader;
/// use typed_csv::error::{CsvError, Result};
/// use typed_csv::field::{Field, Value};
/// use typed_csv::item::csv::csv_reader::RecordItemReaderBuilder;
/// use typed_csv::row::CsvRecord;
///
/// #[derive(Debug, Default)]
/// struct Count(i64);
///
/// static FIELDS: LazyLock<Vec<Field>> = LazyLock::new(|| vec![Field::integer("count")]);
///
/// impl CsvRecord for Count {
///     fn csv_fields() -> &'static [Field] {
///         &FIELDS
///     }
///     fn get_field(&self, _: usize) -> Result<Value> {
///         Ok(Value::Integer(self.0))
///     }
///     fn set_field(&mut self, _: usize, value: Value) -> Result<()> {
///         self.0 = value.as_i64().ok_or_else(|| CsvError::schema("count"))?;
///         Ok(())
///     }
/// }
///
/// let reader = RecordItemReaderBuilder::new()
///     .has_headers(true)
///     .from_reader("count\n3\n4\n".as_bytes());
/// let first: Count = reader.read().unwrap().unwrap();
/// assert_eq!(first.0, 3);
/// ```
pub struct RecordItemReader<R, T> {
    stream: RefCell<CharReader<R>>,
    header_pending: Cell<bool>,
    marker: PhantomData<T>,
}

impl<R: BufRead, T: CsvRecord + Default> RecordItemReader<R, T> {
    fn next_record(&self) -> Result<Option<T>> {
        let mut stream = self.stream.borrow_mut();
        if self.header_pending.replace(false) {
            soak_header_rows(&mut *stream, 1)?;
        }
        if stream.is_eof()? {
            debug!("record source drained");
            return Ok(None);
        }
        let record = T::read_csv_line(&mut *stream)?;
        soak_eol(&mut *stream)?;
        Ok(Some(record))
    }
}

impl<R: BufRead, T: CsvRecord + Default> ItemReader<T> for RecordItemReader<R, T> {
    fn read(&self) -> ItemReaderResult<T> {
        self.next_record()
            .map_err(|error| CsvError::ItemReader(error.to_string()))
    }
}

#[derive(Default)]
pub struct RecordItemReaderBuilder {
    has_headers: bool,
}

impl RecordItemReaderBuilder {
    pub fn new() -> Self {
        Self { has_headers: false }
    }

    /// Skips one header line before the first record.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    pub fn from_reader<R: BufRead, T>(self, rdr: R) -> RecordItemReader<R, T> {
        RecordItemReader {
            stream: RefCell::new(CharReader::new(rdr)),
            header_pending: Cell::new(self.has_headers),
            marker: PhantomData,
        }
    }

    pub fn from_path<P: AsRef<Path>, T>(
        self,
        path: P,
    ) -> Result<RecordItemReader<BufReader<File>, T>> {
        let path = path.as_ref();
        info!("reading {}", path.display());
        let file = File::open(path)?;
        Ok(self.from_reader(BufReader::new(file)))
    }
}
