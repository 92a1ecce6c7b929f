use std::{
    cell::{Cell, RefCell},
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::{CsvError, Result},
    row::CsvRecord,
};

/// Writes [`CsvRecord`]s as CSV lines, preceded by the header line when enabled.
///
/// The header is written once, before the first batch.
pub struct RecordItemWriter<W: Write> {
    sink: RefCell<W>,
    has_headers: bool,
    header_written: Cell<bool>,
}

impl<W: Write, T: CsvRecord> ItemWriter<T> for RecordItemWriter<W> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        let mut sink = self.sink.borrow_mut();
        if self.has_headers && !self.header_written.get() {
            let header =
                T::csv_header().map_err(|error| CsvError::ItemWriter(error.to_string()))?;
            writeln!(sink, "{header}").map_err(|error| CsvError::ItemWriter(error.to_string()))?;
            self.header_written.set(true);
        }
        for item in items {
            let line = item
                .to_csv_line()
                .map_err(|error| CsvError::ItemWriter(error.to_string()))?;
            writeln!(sink, "{line}").map_err(|error| CsvError::ItemWriter(error.to_string()))?;
        }
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        let result = self.sink.borrow_mut().flush();
        match result {
            Ok(()) => Ok(()),
            Err(error) => Err(CsvError::ItemWriter(error.to_string())),
        }
    }
}

impl<W: Write> RecordItemWriter<W> {
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

#[derive(Default)]
pub struct RecordItemWriterBuilder {
    has_headers: bool,
}

impl RecordItemWriterBuilder {
    pub fn new() -> RecordItemWriterBuilder {
        RecordItemWriterBuilder { has_headers: false }
    }

    pub fn has_headers(mut self, yes: bool) -> RecordItemWriterBuilder {
        self.has_headers = yes;
        self
    }

    /// Creates (or truncates) `path`, creating missing parent directories.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<RecordItemWriter<BufWriter<File>>> {
        let path = path.as_ref();
        info!("writing {}", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(self.from_writer(BufWriter::new(file)))
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> RecordItemWriter<W> {
        RecordItemWriter {
            sink: RefCell::new(wtr),
            has_headers: self.has_headers,
            header_written: Cell::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, sync::LazyLock};

    use rust_decimal::Decimal;
    use tempfile::tempdir;

    use super::*;
    use crate::field::{Field, Value};

    struct Quote<'a> {
        symbol: &'a str,
        price: Decimal,
    }

    static QUOTE_FIELDS: LazyLock<Vec<Field>> = LazyLock::new(|| {
        vec![
            Field::string("Symbol").double_quoted(),
            Field::decimal("Price").with_precision(2),
        ]
    });

    impl CsvRecord for Quote<'_> {
        fn csv_fields() -> &'static [Field] {
            &QUOTE_FIELDS
        }

        fn get_field(&self, index: usize) -> Result<Value> {
            match index {
                0 => Ok(Value::from(self.symbol)),
                1 => Ok(Value::Decimal(self.price)),
                _ => Err(CsvError::schema(format!("quote has no field {index}"))),
            }
        }

        fn set_field(&mut self, _: usize, _: Value) -> Result<()> {
            Err(CsvError::schema("quotes are write only"))
        }
    }

    #[test]
    fn header_is_written_once() -> std::result::Result<(), Box<dyn Error>> {
        let wtr = RecordItemWriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);

        wtr.write(&[Quote {
            symbol: "IBM",
            price: Decimal::new(13125, 2),
        }])?;
        wtr.write(&[Quote {
            symbol: "MSFT",
            price: Decimal::new(4205, 1),
        }])?;

        let data = String::from_utf8(wtr.into_inner())?;
        assert_eq!(
            data,
            "Symbol,Price
\"IBM\",131.25
\"MSFT\",420.50
"
        );
        Ok(())
    }

    #[test]
    fn records_are_written_to_path() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("quotes.csv");
        let wtr = RecordItemWriterBuilder::new().from_path(&path)?;
        wtr.write(&[Quote {
            symbol: "IBM",
            price: Decimal::new(1, 0),
        }])?;
        ItemWriter::<Quote>::flush(&wtr)?;
        drop(wtr);

        assert_eq!(fs::read_to_string(&path)?, "\"IBM\",1.00\n");
        Ok(())
    }
}
