pub mod batch;
pub mod builder;
pub mod columns;
pub mod csv;
pub mod error;
pub mod row;

pub use batch::{make_unique_handle, normalize_rows};
pub use builder::{RowBuilder, slugify};
pub use columns::{COLUMN_COUNT, WIX_COLUMNS, column_index};
pub use self::csv::{read_csv, to_csv_string, write_csv, write_csv_file};
pub use error::ExportError;
pub use row::{FieldType, OutputRow, PriceOrigin};
