pub mod csv_table;
pub mod discovery;
pub mod error;

pub use csv_table::{
    DEFAULT_LARGE_FILE_BYTES, DEFAULT_LARGE_FILE_MAX_ROWS, IngestOptions, IngestWarning,
    LoadedTable, is_supported_source, is_tabular_source, load_table,
};
pub use discovery::{DataFile, format_file_size, list_data_files};
pub use error::{IngestError, Result};
