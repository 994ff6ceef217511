/// Immutable encoder configuration and its strategies.
pub mod config;

/// Key-paths and the column resolver that freezes the schema.
pub mod column;

/// Scalar to cell text conversion.
pub mod format;

/// Row accumulation in column order.
pub mod row;

/// Owned value tree and date marker.
pub mod value;

/// The serde walker driving resolution, formatting and row emission.
pub mod walker;
