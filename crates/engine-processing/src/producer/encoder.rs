use connectors::sql::{
    base::encoder::{CopyValueEncoder, EncodeError},
    postgres::encoder::PgCopyValueEncoder,
};
use model::records::row::RowData;

/// Turns one source row into one header-less COPY record.
pub struct RowEncoder {
    inner: PgCopyValueEncoder,
}

impl RowEncoder {
    pub fn new(delimiter: char) -> Result<Self, EncodeError> {
        Ok(Self {
            inner: PgCopyValueEncoder::new(delimiter)?,
        })
    }

    pub fn delimiter(&self) -> char {
        self.inner.delimiter()
    }

    pub fn encode(&self, row: &RowData) -> Result<String, EncodeError> {
        self.inner.encode_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::{FieldValue, Value};

    #[test]
    fn encodes_one_record_per_row() {
        let encoder = RowEncoder::new(';').unwrap();
        let row = RowData::new(
            "orders",
            vec![
                FieldValue::new("id", Value::Int(1)),
                FieldValue::new("note", Value::String("a;b\nc".into())),
                FieldValue::new("shipped", Value::Null),
            ],
        );
        assert_eq!(encoder.encode(&row).unwrap(), "1;\"a;b\nc\";\\N\n");
    }

    #[test]
    fn nul_in_text_fails_the_row() {
        let encoder = RowEncoder::new(',').unwrap();
        let row = RowData::new(
            "orders",
            vec![FieldValue::new("note", Value::String("bad\0".into()))],
        );
        assert_eq!(
            encoder.encode(&row),
            Err(EncodeError::NulCharacter {
                column: "note".into()
            })
        );
    }
}
