//! Dynamic values crossing the DAL boundary.
//!
//! Callers hand statements a positional `SqlParam` list and get result rows
//! back as JSON cells, so no caller ever splices a value into SQL text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// A positional statement parameter. Always bound server-side, never
/// interpolated into the statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for SqlParam {
    fn from(v: u32) -> Self {
        Self::UInt(v.into())
    }
}

impl From<u64> for SqlParam {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for SqlParam {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for SqlParam {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

/// `None` binds as SQL NULL.
impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Binds every parameter to the prepared statement in order.
pub(crate) fn bind_params(
    mut query: Query<'_, MySql, MySqlArguments>,
    params: Vec<SqlParam>,
) -> Query<'_, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(Option::<String>::None),
            SqlParam::Bool(v) => query.bind(v),
            SqlParam::Int(v) => query.bind(v),
            SqlParam::UInt(v) => query.bind(v),
            SqlParam::Float(v) => query.bind(v),
            SqlParam::Decimal(v) => query.bind(v),
            SqlParam::Text(v) => query.bind(v),
            SqlParam::Date(v) => query.bind(v),
            SqlParam::DateTime(v) => query.bind(v),
        };
    }
    query
}

/// A tabular result set: column names in SELECT order plus one JSON value
/// per cell. Statement-agnostic, so `SELECT *` against tables the program
/// has never heard of still comes back fully typed for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&JsonValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// First cell of the first row, for single-value queries like `SELECT COUNT(*)`.
    pub fn single_value(&self) -> Option<&JsonValue> {
        self.rows.first()?.first()
    }

    pub(crate) fn from_rows(rows: &[MySqlRow]) -> Result<Self, sqlx::Error> {
        let Some(first) = rows.first() else {
            return Ok(Self::default());
        };
        let columns = first
            .columns()
            .iter()
            .map(|c| c.name().to_owned())
            .collect();
        let mut decoded = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for idx in 0..row.len() {
                cells.push(decode_cell(row, idx)?);
            }
            decoded.push(cells);
        }
        Ok(Self {
            columns,
            rows: decoded,
        })
    }
}

/// Decodes one cell into JSON based on the column type MySQL reports.
///
/// Numbers stay numbers, DECIMAL becomes its exact decimal string (no float
/// round-trip), temporal types render in MySQL's own literal format, and
/// binary payloads are base64. Types this never anticipated fall back to
/// text, then bytes.
fn decode_cell(row: &MySqlRow, idx: usize) -> Result<JsonValue, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(JsonValue::Null);
    }
    let type_name = row.column(idx).type_info().name();
    let value = match type_name {
        "BOOLEAN" => JsonValue::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            JsonValue::Number(row.try_get::<i64, _>(idx)?.into())
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => JsonValue::Number(row.try_get::<u64, _>(idx)?.into()),
        "YEAR" => JsonValue::Number(u64::from(row.try_get::<u16, _>(idx)?).into()),
        "FLOAT" => float_to_json(row.try_get::<f32, _>(idx)?.into()),
        "DOUBLE" => float_to_json(row.try_get::<f64, _>(idx)?),
        "DECIMAL" => JsonValue::String(row.try_get::<Decimal, _>(idx)?.to_string()),
        "DATE" => JsonValue::String(
            row.try_get::<NaiveDate, _>(idx)?
                .format("%Y-%m-%d")
                .to_string(),
        ),
        "TIME" => match row.try_get::<NaiveTime, _>(idx) {
            Ok(t) => JsonValue::String(t.format("%H:%M:%S").to_string()),
            // MySQL TIME also holds durations outside 00:00:00..24:00:00,
            // which chrono cannot represent.
            Err(_) => JsonValue::String(row.try_get::<String, _>(idx)?),
        },
        "DATETIME" => JsonValue::String(
            row.try_get::<NaiveDateTime, _>(idx)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        "TIMESTAMP" => JsonValue::String(
            row.try_get::<DateTime<Utc>, _>(idx)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            JsonValue::String(row.try_get::<String, _>(idx)?)
        }
        "JSON" => {
            let raw = row.try_get::<String, _>(idx)?;
            serde_json::from_str(&raw).unwrap_or(JsonValue::String(raw))
        }
        "BIT" => match row.try_get::<u64, _>(idx) {
            Ok(v) => JsonValue::Number(v.into()),
            Err(_) => bytes_to_json(row.try_get::<Vec<u8>, _>(idx)?),
        },
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "GEOMETRY" => {
            bytes_to_json(row.try_get::<Vec<u8>, _>(idx)?)
        }
        _ => match row.try_get::<String, _>(idx) {
            Ok(s) => JsonValue::String(s),
            Err(_) => bytes_to_json(row.try_get::<Vec<u8>, _>(idx)?),
        },
    };
    Ok(value)
}

fn float_to_json(v: f64) -> JsonValue {
    Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}

fn bytes_to_json(bytes: Vec<u8>) -> JsonValue {
    JsonValue::String(BASE64.encode(bytes))
}
