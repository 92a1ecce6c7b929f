use crate::error::CsvError;

/// Result of a single [`ItemReader::read`] call: `Ok(None)` once the source is drained.
pub type ItemReaderResult<T> = Result<Option<T>, CsvError>;

pub type ItemWriterResult = Result<(), CsvError>;

pub trait ItemReader<T> {
    fn read(&self) -> ItemReaderResult<T>;
}

pub trait ItemWriter<T> {
    fn write(&self, items: &[T]) -> ItemWriterResult;
    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }
}
