//! Error types for table construction and mutation.

use thiserror::Error;

/// Rejected `TableConfig` values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("initial capacity {0} must be a power of two and at least 2")]
    InvalidCapacity(usize),
    #[error("{name} {value} must be a power of two and at least 2")]
    InvalidFactor { name: &'static str, value: usize },
    #[error("load factors must satisfy 0 < min ({min}) < max ({max}) < 1")]
    InvalidLoadFactors { min: f64, max: f64 },
    #[error("load factors ({min}, {max}) do not leave room for a growth factor of {growth_factor} and a shrink divisor of {shrink_divisor}: need max / growth >= min and min * shrink <= max")]
    ResizeOutsideLoadBounds {
        min: f64,
        max: f64,
        growth_factor: usize,
        shrink_divisor: usize,
    },
}

/// Failures surfaced by `ProbedTable` operations.
///
/// An absent key is not an error; lookups and removals report it as `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("failed to allocate {bytes} bytes for {what}")]
    AllocationFailure { what: &'static str, bytes: usize },
    #[error("probe for key {key:?} wrapped around a table of capacity {capacity} without finding a free slot")]
    TableFull { key: String, capacity: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_table_error() {
        let err: TableError = ConfigError::InvalidCapacity(3).into();
        assert_eq!(
            err.to_string(),
            "initial capacity 3 must be a power of two and at least 2"
        );
    }

    #[test]
    fn table_full_message_names_key_and_capacity() {
        let err = TableError::TableFull {
            key: "k".to_string(),
            capacity: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("\"k\""));
        assert!(msg.contains("capacity 8"));
    }
}
