use model::{core::value::Value, records::row::RowData};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Column '{column}' contains a NUL character, which cannot be stored as text")]
    NulCharacter { column: String },

    #[error("Column '{column}' holds text that is not valid UTF-8")]
    InvalidUtf8 { column: String },

    #[error("Invalid field delimiter {0:?}")]
    InvalidDelimiter(char),
}

/// Provides database-specific CSV encoding for COPY/LOAD style ingestion.
pub trait CopyValueEncoder {
    /// Encodes a concrete value into the backend's CSV representation.
    fn encode_value(&self, column: &str, value: &Value) -> Result<String, EncodeError>;

    /// Encodes a SQL NULL into its CSV literal form (e.g. `\N`).
    fn encode_null(&self) -> String;

    /// Field separator placed between encoded values.
    fn delimiter(&self) -> char;

    /// Encodes one row into one newline-terminated record, header-less.
    fn encode_row(&self, row: &RowData) -> Result<String, EncodeError> {
        let mut line = String::new();
        for (i, field) in row.field_values.iter().enumerate() {
            if i > 0 {
                line.push(self.delimiter());
            }
            let encoded = match &field.value {
                Value::Null => self.encode_null(),
                value => self.encode_value(&field.name, value)?,
            };
            line.push_str(&encoded);
        }
        line.push('\n');
        Ok(line)
    }
}
