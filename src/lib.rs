#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Typed CSV

 A schema-driven CSV codec. A CSV source is described as an ordered list of
 typed fields; each field converts its column text into a typed [`Value`]
 and back again. Rows can be read as raw value vectors, as records built from
 named attributes, or straight into your own types.

 ## Core Concepts

- **Field:** a named, typed column. Fourteen types are provided, from `boolean`
  and `integer` to `date`, `time_of_day` and the nested `array` and `hash`.
  A field may be wrapped in single or double quotes, which toggle comma
  splitting and are stripped on read.
- **Spec:** an ordered list of fields plus the number of header rows to skip and
  an optional column mapping that routes, reorders or drops columns.
- **Reader:** turns a file, string or character stream into typed rows.
- **CsvRecord:** a type that lists its fields and exposes get/set by field index,
  gaining conversions to and from CSV lines and files.
- **Table:** an in-memory table of rows with column, set and keyed lookups.
- **ItemReader / ItemWriter:** item-at-a-time adapters for streaming.

 ## Features

| **Feature**   | **Description**                                               |
|---------------|---------------------------------------------------------------|
| logger        | Enables a logger `ItemWriter`, useful for debugging purposes  |
| full          | Enables all available features                                |

 ## Getting Started

```rust
# use typed_csv::{
#     field::{Field, Value},
#     spec::Spec,
# };
# fn main() -> Result<(), typed_csv::CsvError> {
let spec = Spec::builder()
    .field(Field::string("City"))
    .field(Field::integer("Population"))
    .field(Field::array("Zips", Field::integer("zip")))
    .build()?;

let rows = spec.rows_from_string("City,Population,Zips\nConcord,42695,'01742,01719'\n")?;

assert_eq!(
    rows[0],
    vec![
        Value::from("Concord"),
        Value::Integer(42695),
        Value::Array(vec![Value::Integer(1742), Value::Integer(1719)]),
    ]
);
# Ok(())
# }
```

 ## License
 Licensed under either of Apache License, Version 2.0 or MIT license at your option.
 */

/// Core traits shared by the readers and writers
pub mod core;

/// Error types for the codec
pub mod error;

pub use error::*;

/// Typed fields and the values they produce
pub mod field;

pub use field::{Field, Value};

/// Low-level row reading over character streams
pub mod reader;

/// Declarative schemas and record construction
pub mod spec;

/// Mapping between record types and CSV lines
pub mod row;

/// In-memory tables of rows
pub mod table;

/// Item readers and writers (for example: typed csv reader and writer)
pub mod item;
