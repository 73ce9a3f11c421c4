use crate::sql::base::encoder::{CopyValueEncoder, EncodeError};
use model::core::{
    utils::{encode_bytea, escape_csv_string},
    value::Value,
};

/// Encodes values for `COPY ... FROM STDIN WITH (FORMAT csv, NULL '\N')`.
///
/// Textual values are always quoted, so a delimiter, quote or line break inside
/// them never splits a field. Numeric values are emitted bare.
pub struct PgCopyValueEncoder {
    delimiter: char,
}

impl PgCopyValueEncoder {
    pub fn new(delimiter: char) -> Result<Self, EncodeError> {
        validate_delimiter(delimiter)?;
        Ok(Self { delimiter })
    }

    fn quoted_text(column: &str, text: &str) -> Result<String, EncodeError> {
        if text.contains('\0') {
            return Err(EncodeError::NulCharacter {
                column: column.to_string(),
            });
        }
        Ok(escape_csv_string(text))
    }

    fn encode_float(v: f64) -> String {
        if v.is_nan() {
            "NaN".to_string()
        } else if v.is_infinite() {
            if v.is_sign_positive() {
                "Infinity".to_string()
            } else {
                "-Infinity".to_string()
            }
        } else {
            ryu::Buffer::new().format_finite(v).to_string()
        }
    }
}

/// Rejects delimiters that Postgres refuses in CSV mode or that could appear
/// unquoted inside a bare numeric or bytea field.
pub fn validate_delimiter(delimiter: char) -> Result<(), EncodeError> {
    let allowed = delimiter.is_ascii_punctuation() || matches!(delimiter, ' ' | '\t');
    if !allowed || matches!(delimiter, '"' | '\\' | '.' | '-' | '+') {
        return Err(EncodeError::InvalidDelimiter(delimiter));
    }
    Ok(())
}

impl CopyValueEncoder for PgCopyValueEncoder {
    fn encode_value(&self, column: &str, value: &Value) -> Result<String, EncodeError> {
        let encoded = match value {
            Value::Null => self.encode_null(),
            Value::String(s) => Self::quoted_text(column, s)?,
            Value::Json(v) => Self::quoted_text(column, &v.to_string())?,
            Value::Date(d) => escape_csv_string(&d.format("%Y-%m-%d").to_string()),
            Value::Timestamp(ts) => {
                escape_csv_string(&ts.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            Value::Bytes(bytes) => encode_bytea(bytes),
            Value::MalformedText(_) => {
                return Err(EncodeError::InvalidUtf8 {
                    column: column.to_string(),
                });
            }
            Value::Boolean(v) => if *v { "t" } else { "f" }.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Uint(v) => v.to_string(),
            Value::Decimal(v) => v.to_plain_string(),
            Value::Float(v) => Self::encode_float(*v),
        };
        Ok(encoded)
    }

    fn encode_null(&self) -> String {
        "\\N".to_string()
    }

    fn delimiter(&self) -> char {
        self.delimiter
    }
}
