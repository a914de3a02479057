//! Visible range computation.
//!
//! The visible range is the smallest contiguous run of rows whose cumulative
//! span covers `[scroll_offset, scroll_offset + viewport_height)`:
//!
//! ```text
//! first = min { i : cumulative[i] >= scroll_offset }
//! last  = min { i : cumulative[i] >= scroll_offset + viewport_height }   (or row_count - 1)
//! ```
//!
//! A row whose bottom edge lands exactly on `scroll_offset` is still counted
//! as visible, and the row whose bottom edge lands exactly on the viewport end
//! is the last one included.
//!
//! # Edge Cases
//!
//! | Condition | Result |
//! |-----------|--------|
//! | `row_count == 0` | `Empty` |
//! | `viewport_height <= 0` or NaN | `Empty` |
//! | `scroll_offset > total height` | `Empty` |
//! | `scroll_offset == total height` | last row only |
//! | `scroll_offset < 0` (overscroll) | starts at row 0 |
//! | non-finite `scroll_offset` | `InvalidScrollOffset` |

use std::ops::Range;

use crate::config::RangeScan;
use crate::error::{Result, TableError};
use crate::heights::{HeightProvider, RowHeightIndex};

/// Inclusive span of visible rows, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibleRange {
    /// No row is visible.
    #[default]
    Empty,
    /// Rows `first..=last` are visible.
    Rows { first: usize, last: usize },
}

impl VisibleRange {
    /// Range `first..=last`; `Empty` when `first > last`.
    #[must_use]
    pub fn new(first: usize, last: usize) -> Self {
        if first > last {
            Self::Empty
        } else {
            Self::Rows { first, last }
        }
    }

    /// Whether no row is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// First visible row.
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Rows { first, .. } => Some(*first),
        }
    }

    /// Last visible row.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Rows { last, .. } => Some(*last),
        }
    }

    /// Number of visible rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    /// Whether `row` is inside the range.
    #[must_use]
    pub fn contains(&self, row: usize) -> bool {
        self.rows().contains(&row)
    }

    /// Visible rows as a half-open range.
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        match self {
            Self::Empty => 0..0,
            Self::Rows { first, last } => *first..*last + 1,
        }
    }
}

/// Compute the rows overlapping `[scroll_offset, scroll_offset + viewport_height)`.
///
/// Lazy indices are resolved as far as the scan needs; [`RangeScan::Bisect`]
/// resolves every row first.
pub fn visible_range<P>(
    index: &mut RowHeightIndex,
    provider: &mut P,
    scroll_offset: f64,
    viewport_height: f64,
    scan: RangeScan,
) -> Result<VisibleRange>
where
    P: HeightProvider + ?Sized,
{
    if !scroll_offset.is_finite() {
        return Err(TableError::InvalidScrollOffset(scroll_offset));
    }
    let end = scroll_offset + viewport_height;
    if index.is_empty() || viewport_height.is_nan() || viewport_height <= 0.0 || end <= 0.0 {
        return Ok(VisibleRange::Empty);
    }
    match scan {
        RangeScan::Linear => linear_scan(index, provider, scroll_offset, end),
        RangeScan::Bisect => bisect(index, provider, scroll_offset, end),
    }
}

fn linear_scan<P>(
    index: &mut RowHeightIndex,
    provider: &mut P,
    start: f64,
    end: f64,
) -> Result<VisibleRange>
where
    P: HeightProvider + ?Sized,
{
    let rows = index.row_count();
    let mut cumulative = 0.0;
    let mut row = 0;
    let mut first = None;
    while cumulative < end && row < rows {
        cumulative = index.cumulative_through(row, provider)?;
        if first.is_none() && cumulative >= start {
            first = Some(row);
        }
        row += 1;
    }
    Ok(match first {
        Some(first) => VisibleRange::new(first, row - 1),
        None => VisibleRange::Empty,
    })
}

fn bisect<P>(
    index: &mut RowHeightIndex,
    provider: &mut P,
    start: f64,
    end: f64,
) -> Result<VisibleRange>
where
    P: HeightProvider + ?Sized,
{
    index.resolve_all(provider)?;
    let cumulative = index.cumulative();
    let rows = cumulative.len();
    let first = cumulative.partition_point(|&c| c < start);
    if first == rows {
        return Ok(VisibleRange::Empty);
    }
    let last = cumulative.partition_point(|&c| c < end).min(rows - 1);
    Ok(VisibleRange::new(first, last))
}
