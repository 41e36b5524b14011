pub mod error;
pub mod result;
pub mod roles;
pub mod table;

pub use error::{ModelError, Result};
pub use result::{MatchType, SearchResult};
pub use roles::{ColumnInfo, ColumnRoles};
pub use table::{CellValue, Field, NULL_MARKER, Record, Table};
