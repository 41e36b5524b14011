#![deny(unsafe_code)]

//! Record search over a loaded table.
//!
//! A [`SearchSnapshot`] bundles a table with its detected column roles and
//! two indices: trimmed identifiers for exact and substring lookup, and
//! normalized names for fuzzy lookup. [`SnapshotStore`] publishes snapshots
//! to concurrent readers.

pub mod detect;
pub mod engine;
pub mod error;
pub mod index;
pub mod normalize;
pub mod score;
pub mod store;

pub use detect::detect_roles;
pub use engine::{
    DEFAULT_MAX_RESULTS, DEFAULT_MIN_SIMILARITY, PARTIAL_ID_SIMILARITY, SearchOptions,
    SearchSnapshot,
};
pub use error::{Result, SearchError};
pub use index::{BuildStats, BuiltIndices, IdentifierIndex, IndexBuilder, KeyIndex, NameIndex};
pub use normalize::{contains_arabic, normalize, normalize_opt};
pub use score::{matching_ratio, score, sequence_similarity};
pub use store::SnapshotStore;
