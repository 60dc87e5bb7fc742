pub mod reader;
pub mod table;
pub mod writer;

// Re-export commonly used types
pub use reader::{detect_delimiter, TableReader};
pub use table::{ColumnType, Table, Value};
pub use writer::{format_real, TableWriter, CUBE_COLUMNS, MAPPING_COLUMNS};
