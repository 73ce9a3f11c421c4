use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use mysql_async::{Column, Row as MySqlRow, Value as MySqlValue, consts::ColumnType};
use std::str::FromStr;
use tracing::{trace, warn};

/// Collation id MySQL reports for binary strings and blobs.
const BINARY_CHARSET: u16 = 63;

/// Converts a MySQL result row into `RowData`, keeping column order.
pub fn mysql_row_to_data(row: MySqlRow, entity: &str) -> RowData {
    let columns = row.columns();
    let values = row.unwrap_raw();

    let field_values = columns
        .iter()
        .zip(values)
        .map(|(column, raw)| {
            let value = raw.map_or(Value::Null, |v| convert_value(column, v));
            FieldValue::new(column.name_str().into_owned(), value)
        })
        .collect();

    RowData::new(entity, field_values)
}

fn convert_value(column: &Column, value: MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(v) => Value::Int(v),
        MySqlValue::UInt(v) => Value::Uint(v),
        MySqlValue::Float(v) => Value::Float(v as f64),
        MySqlValue::Double(v) => Value::Float(v),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            let time = date.and_then(|d| {
                d.and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros)
            });
            match (column.column_type(), date, time) {
                (ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE, Some(d), _) => {
                    Value::Date(d)
                }
                (_, _, Some(ts)) => Value::Timestamp(ts),
                // Zero dates have no chrono form; let the target decide.
                _ => Value::String(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                )),
            }
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = days * 24 + hours as u32;
            let sign = if negative { "-" } else { "" };
            Value::String(format!(
                "{sign}{total_hours:02}:{minutes:02}:{seconds:02}.{micros:06}"
            ))
        }
        MySqlValue::Bytes(bytes) => from_text_protocol(column, bytes),
    }
}

/// The text protocol hands every non-NULL value over as bytes; the column
/// type decides how to read them back.
fn from_text_protocol(column: &Column, bytes: Vec<u8>) -> Value {
    use ColumnType::*;

    let ty = column.column_type();
    let parsed = match ty {
        MYSQL_TYPE_TINY | MYSQL_TYPE_SHORT | MYSQL_TYPE_LONG | MYSQL_TYPE_INT24
        | MYSQL_TYPE_LONGLONG | MYSQL_TYPE_YEAR => text(&bytes).and_then(|s| {
            s.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| s.parse::<u64>().map(Value::Uint))
                .ok()
        }),
        MYSQL_TYPE_DECIMAL | MYSQL_TYPE_NEWDECIMAL => text(&bytes)
            .and_then(|s| BigDecimal::from_str(s).ok())
            .map(Value::Decimal),
        MYSQL_TYPE_FLOAT | MYSQL_TYPE_DOUBLE => text(&bytes)
            .and_then(|s| s.parse::<f64>().ok())
            .map(Value::Float),
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => text(&bytes)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(Value::Date),
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_DATETIME2 | MYSQL_TYPE_TIMESTAMP
        | MYSQL_TYPE_TIMESTAMP2 => text(&bytes)
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
            .map(Value::Timestamp),
        MYSQL_TYPE_JSON => serde_json::from_slice(&bytes).ok().map(Value::Json),
        MYSQL_TYPE_BIT | MYSQL_TYPE_GEOMETRY => Some(Value::Bytes(bytes.clone())),
        _ if column.character_set() == BINARY_CHARSET => Some(Value::Bytes(bytes.clone())),
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        trace!(column = %column.name_str(), column_type = ?ty, "Keeping value as text");
        match String::from_utf8(bytes) {
            Ok(s) => Value::String(s),
            Err(e) => {
                warn!(column = %column.name_str(), "Text column holds invalid UTF-8");
                Value::MalformedText(e.into_bytes())
            }
        }
    })
}

fn text(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes).ok()
}
