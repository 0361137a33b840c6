use thiserror::Error;

/// Problems found while reading a launch records file.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: negative payload mass {value}")]
    NegativePayload { row: usize, value: f64 },
}

impl DatasetError {
    pub fn invalid(row: usize, column: &str, value: impl ToString) -> Self {
        DatasetError::InvalidValue {
            row,
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}
