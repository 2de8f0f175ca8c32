//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur during catalog loading and parsing.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV record couldn't be read or deserialized
    #[error("CSV error in {file} at record {record}: {source}")]
    Csv {
        file: String,
        record: usize,
        #[source]
        source: csv::Error,
    },

    /// A field had a value outside its allowed range
    #[error("Invalid value for {field} in {file} at record {record}: {value}")]
    InvalidValue {
        file: String,
        record: usize,
        field: String,
        value: String,
    },

    /// A required field was empty
    #[error("Missing {field} in {file} at record {record}")]
    MissingField {
        file: String,
        record: usize,
        field: String,
    },
}

/// Convenience type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, DataLoadError>;
