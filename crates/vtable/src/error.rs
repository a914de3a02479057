//! Error type shared by every table operation.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Row out of range | Index outside `[0, row_count)` | `RowOutOfRange` |
//! | Query before reload | No heights established yet | `NotLoaded` |
//! | Tick before initialize | Host skipped `initialize()` | `NotInitialized` |
//! | Reload without source | No data source attached | `NoDataSource` |
//! | Bad row height | Negative or non-finite height | `InvalidHeight` |
//! | Bad lazy estimate | Negative or non-finite estimated height | `InvalidEstimate` |
//! | Bad scroll offset | Non-finite offset | `InvalidScrollOffset` |
//!
//! A pool miss is not an error; [`CellPool::take`](crate::pool::CellPool::take)
//! returns `None`.

/// Errors from table operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// A row index outside `[0, row_count)` was requested.
    RowOutOfRange { row: usize, row_count: usize },
    /// Heights have not been established by a reload yet.
    NotLoaded,
    /// The engine was driven before `initialize()`.
    NotInitialized,
    /// A reload was requested with no data source attached.
    NoDataSource,
    /// The data source reported a negative or non-finite height.
    InvalidHeight { row: usize, height: f64 },
    /// The lazy-mode estimated height is negative or non-finite.
    InvalidEstimate(f64),
    /// The host reported a non-finite scroll offset.
    InvalidScrollOffset(f64),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowOutOfRange { row, row_count } => {
                write!(f, "row {row} out of range (row count {row_count})")
            }
            Self::NotLoaded => write!(f, "table has not been loaded"),
            Self::NotInitialized => write!(f, "table has not been initialized"),
            Self::NoDataSource => write!(f, "no data source attached"),
            Self::InvalidHeight { row, height } => {
                write!(f, "invalid height {height} for row {row}")
            }
            Self::InvalidEstimate(estimate) => {
                write!(f, "invalid estimated row height {estimate}")
            }
            Self::InvalidScrollOffset(offset) => write!(f, "invalid scroll offset {offset}"),
        }
    }
}

impl std::error::Error for TableError {}

/// Result alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
