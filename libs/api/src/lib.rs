pub mod config;
pub mod error;
pub mod metric;
pub mod record;
pub mod response;
pub mod util;
pub mod value;

pub use config::{FormatOptions, MetaColumn};
pub use error::{ErrorKind, FormatError};
pub use metric::{MetricShape, MetricSpec, DEFAULT_PERCENTS};
pub use record::{ResultSet, Row, RowMeta};
pub use response::result_set_from_json;
pub use value::{Fields, Value};
