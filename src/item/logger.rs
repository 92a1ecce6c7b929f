use log::{Level, log};

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    row::CsvRecord,
};

/// Logs each record as its CSV line instead of writing it anywhere.
pub struct LoggerWriter {
    level: Level,
}

impl LoggerWriter {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for LoggerWriter {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl<T: CsvRecord> ItemWriter<T> for LoggerWriter {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        for item in items {
            log!(self.level, "Record:{}", item.to_csv_line()?);
        }
        Ok(())
    }
}
