#![allow(dead_code)]

pub mod mocks;

use std::sync::LazyLock;

use chrono::NaiveDate;
pub use mocks::{MockFile, failing_file};
use typed_csv::{
    CsvError, Result,
    field::{Field, Value},
    row::CsvRecord,
    spec::{Attributes, Model},
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One daily bar of a traded instrument.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Bar {
    pub symbol: String,
    pub date: Option<NaiveDate>,
    pub open_time: i64,
    pub close: f64,
    pub volume: i64,
}

static BAR_FIELDS: LazyLock<Vec<Field>> = LazyLock::new(|| {
    vec![
        Field::string("Symbol"),
        Field::date("Date").with_format("%Y-%m-%d"),
        Field::time_of_day("Open Time"),
        Field::float("Close").with_precision(2),
        Field::integer("Volume"),
    ]
});

impl CsvRecord for Bar {
    fn csv_fields() -> &'static [Field] {
        &BAR_FIELDS
    }

    fn get_field(&self, index: usize) -> Result<Value> {
        Ok(match index {
            0 => Value::from(self.symbol.as_str()),
            1 => Value::from(self.date),
            2 => Value::Integer(self.open_time),
            3 => Value::Float(self.close),
            4 => Value::Integer(self.volume),
            _ => return Err(CsvError::schema(format!("bar has no field {index}"))),
        })
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<()> {
        match (index, value) {
            (_, Value::Absent) => {}
            (0, Value::String(s)) => self.symbol = s,
            (1, Value::Date(d)) => self.date = Some(d),
            (2, Value::Integer(t)) => self.open_time = t,
            (3, Value::Float(c)) => self.close = c,
            (4, Value::Integer(v)) => self.volume = v,
            (i, v) => {
                return Err(CsvError::schema(format!(
                    "bar field {i} cannot hold a {} value",
                    v.kind_name()
                )));
            }
        }
        Ok(())
    }
}

impl Model for Bar {
    fn from_attributes(attributes: Attributes) -> Result<Self> {
        let symbol = attributes
            .get("symbol")
            .and_then(Value::as_str)
            .ok_or_else(|| CsvError::schema("bar needs a symbol"))?;
        Ok(Bar {
            symbol: symbol.to_string(),
            date: attributes.get("date").and_then(Value::as_date),
            open_time: attributes
                .get("open_time")
                .and_then(Value::as_i64)
                .unwrap_or_default(),
            close: attributes
                .get("close")
                .and_then(Value::as_f64)
                .unwrap_or_default(),
            volume: attributes
                .get("volume")
                .and_then(Value::as_i64)
                .unwrap_or_default(),
        })
    }
}

pub fn bar(symbol: &str, day: u32, open_time: i64, close: f64, volume: i64) -> Bar {
    Bar {
        symbol: symbol.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, day),
        open_time,
        close,
        volume,
    }
}
