//! Item-at-a-time access to typed CSV data.
//!
//! These adapters implement the [`ItemReader`](crate::core::item::ItemReader) and
//! [`ItemWriter`](crate::core::item::ItemWriter) traits on top of the field codec,
//! so a consumer can stream rows or records without holding a whole file in memory.
//!
//! 1. **SpecItemReader**: yields one typed [`Row`](crate::reader::Row) per call,
//!    laid out by a [`Spec`](crate::spec::Spec) (fields, header rows, mappings).
//!
//! 2. **RecordItemReader**: yields one [`CsvRecord`](crate::row::CsvRecord) per call.
//!
//! 3. **RecordItemWriter**: writes records as CSV lines, with an optional header.
//!
//! Both readers and the writer follow the builder pattern.
//!
//! # Ownership and Borrowing Considerations
//!
//! Writers own their destination. Call `into_inner` to get a buffer back after
//! writing to it.
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use typed_csv::core::item::{ItemReader, ItemWriter};
//! use typed_csv::error::{CsvError, Result};
//! use typed_csv::field::{Field, Value};
//! use typed_csv::item::csv::csv_reader::RecordItemReaderBuilder;
//! use typed_csv::item::csv::csv_writer::RecordItemWriterBuilder;
//! use typed_csv::row::CsvRecord;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! static FIELDS: LazyLock<Vec<Field>> =
//!     LazyLock::new(|| vec![Field::string("name"), Field::integer("age")]);
//!
//! impl CsvRecord for Person {
//!     fn csv_fields() -> &'static [Field] {
//!         &FIELDS
//!     }
//!
//!     fn get_field(&self, index: usize) -> Result<Value> {
//!         match index {
//!             0 => Ok(Value::from(self.name.as_str())),
//!             1 => Ok(Value::Integer(self.age)),
//!             _ => Err(CsvError::schema("person has two fields")),
//!         }
//!     }
//!
//!     fn set_field(&mut self, index: usize, value: Value) -> Result<()> {
//!         match (index, value) {
//!             (0, Value::String(name)) => self.name = name,
//!             (1, Value::Integer(age)) => self.age = age,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let people = vec![
//!     Person { name: "Alice".to_string(), age: 28 },
//!     Person { name: "Bob".to_string(), age: 35 },
//! ];
//!
//! let writer = RecordItemWriterBuilder::new()
//!     .has_headers(true)
//!     .from_writer(Vec::new());
//! writer.write(&people).unwrap();
//! let buffer = writer.into_inner();
//! assert_eq!(String::from_utf8_lossy(&buffer), "name,age\nAlice,28\nBob,35\n");
//!
//! let reader = RecordItemReaderBuilder::new()
//!     .has_headers(true)
//!     .from_reader(buffer.as_slice());
//! let mut back: Vec<Person> = Vec::new();
//! while let Some(person) = reader.read().unwrap() {
//!     back.push(person);
//! }
//! assert_eq!(back, people);
//! ```

/// A module providing facilities for reading typed CSV rows and records.
pub mod csv_reader;

/// A module providing facilities for writing typed CSV records.
pub mod csv_writer;
