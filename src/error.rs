use thiserror::Error;

#[derive(Error, Debug)]
/// Codec error
pub enum CsvError {
    /// Text does not match the lexical shape a field expects.
    #[error("field '{field}': cannot read '{text}' as {expected}")]
    Format {
        field: String,
        text: String,
        expected: String,
    },

    /// Schema was declared or used inconsistently. Not recoverable per row.
    #[error("schema configuration: {0}")]
    SchemaConfiguration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),
}

impl CsvError {
    pub fn format(
        field: impl Into<String>,
        text: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        CsvError::Format {
            field: field.into(),
            text: text.into(),
            expected: expected.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        CsvError::SchemaConfiguration(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CsvError>;
