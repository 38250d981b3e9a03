//! CSV rendering of document store query results.
//!
//! Pipeline: [`aggregation`] expands multi-value metrics, [`header`] derives
//! the column list, [`stringify`] turns values into cell text and
//! [`serializer`] delimits and escapes. [`CsvResultCodec`] runs all of them.

pub mod aggregation;
pub mod codec;
pub mod header;
pub mod parser;
pub mod serializer;
pub mod stringify;

pub use codec::{to_csv, CsvResultCodec};
pub use header::Header;
pub use parser::{parse_fields, CsvTable};
pub use serializer::{DelimitedWriter, FIELD_SEPARATOR, LINE_TERMINATOR};
pub use stringify::{stringify, Cell, Flattening};
