use thiserror::Error;

use roster_model::ModelError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("index build cancelled after {rows_processed} rows")]
    BuildCancelled { rows_processed: usize },
}

pub type Result<T> = std::result::Result<T, SearchError>;
