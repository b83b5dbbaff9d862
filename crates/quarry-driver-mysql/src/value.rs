use chrono::NaiveDate;
use mysql_async::prelude::ToValue;
use quarry_core::stmt::{Row, Value as CoreValue};

/// Bind-side adapter: renders a core value as a MySQL parameter.
///
/// Timestamps and JSON documents bind as formatted text, which the server
/// accepts for DATETIME and JSON columns alike.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a CoreValue);

impl ToValue for Param<'_> {
    fn to_value(&self) -> mysql_async::Value {
        match self.0 {
            CoreValue::Bool(value) => value.to_value(),
            CoreValue::Bytes(value) => value.to_value(),
            CoreValue::F64(value) => value.to_value(),
            CoreValue::I64(value) => value.to_value(),
            CoreValue::Json(value) => value.to_string().to_value(),
            CoreValue::Null => mysql_async::Value::NULL,
            CoreValue::String(value) => value.to_value(),
            CoreValue::Timestamp(value) => {
                value.format("%Y-%m-%d %H:%M:%S%.f").to_string().to_value()
            }
            CoreValue::U64(value) => value.to_value(),
        }
    }
}

/// Result-side adapter: converts one fetched row by value shape.
///
/// Text arrives from the wire as bytes; valid UTF-8 becomes a string and
/// anything else stays raw bytes. Finer typing happens in the entity layer.
pub(crate) fn row_from_sql(row: mysql_async::Row) -> Row {
    let columns = row.columns();
    let values = row.unwrap();

    let mut out = Row::new();
    for (column, value) in columns.iter().zip(values) {
        out.insert(column.name_str().to_string(), from_sql(value));
    }
    out
}

fn from_sql(value: mysql_async::Value) -> CoreValue {
    match value {
        mysql_async::Value::NULL => CoreValue::Null,
        mysql_async::Value::Int(v) => CoreValue::I64(v),
        mysql_async::Value::UInt(v) => CoreValue::U64(v),
        mysql_async::Value::Float(v) => CoreValue::F64(f64::from(v)),
        mysql_async::Value::Double(v) => CoreValue::F64(v),
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => CoreValue::String(text),
            Err(err) => CoreValue::Bytes(err.into_bytes()),
        },
        mysql_async::Value::Date(year, month, day, hour, minute, second, micros) => {
            let ts = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
                .and_then(|date| {
                    date.and_hms_micro_opt(
                        u32::from(hour),
                        u32::from(minute),
                        u32::from(second),
                        micros,
                    )
                });
            match ts {
                Some(ts) => CoreValue::Timestamp(ts),
                // Zero dates have no chrono form.
                None => CoreValue::Null,
            }
        }
        mysql_async::Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if negative { "-" } else { "" },
                u32::from(hours) + days * 24,
                minutes,
                seconds
            );
            if micros > 0 {
                text.push_str(&format!(".{micros:06}"));
            }
            CoreValue::String(text)
        }
    }
}
