//! Row height storage with a cumulative prefix sum.
//!
//! [`RowHeightIndex`] caches the height of every row once it is known and
//! keeps a prefix-sum array so offset queries are O(1) after resolution.
//!
//! # Invariants
//!
//! 1. Once built, `len(heights) == row_count`.
//! 2. `cumulative` covers rows `0..cumulative.len()`, all resolved, and is
//!    non-decreasing.
//! 3. When fully resolved, `cumulative[row_count - 1] == total_height()`.
//! 4. Every cached height is finite and `>= 0`.
//!
//! # Resolution
//!
//! | Mode | When heights are queried |
//! |------|--------------------------|
//! | Eager | All rows during [`RowHeightIndex::build`] |
//! | Lazy | Each row on first lookup, memoized |

use crate::config::HeightMode;
use crate::error::{Result, TableError};

/// Source of row heights, queried at most once per row per build.
pub trait HeightProvider {
    /// Height of `row`. Must be finite and non-negative.
    fn row_height(&mut self, row: usize) -> f64;
}

impl<F> HeightProvider for F
where
    F: FnMut(usize) -> f64,
{
    fn row_height(&mut self, row: usize) -> f64 {
        self(row)
    }
}

/// Height cache and prefix sums for a fixed number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowHeightIndex {
    /// Resolved heights, `None` until first queried (lazy mode only).
    heights: Vec<Option<f64>>,
    /// Prefix sums for the leading run of resolved rows.
    cumulative: Vec<f64>,
    /// Number of resolved rows.
    resolved: usize,
    /// Sum of all resolved heights.
    resolved_sum: f64,
    /// Height assumed for unresolved rows.
    estimated_height: f64,
}

impl RowHeightIndex {
    /// Build an index for `row_count` rows.
    ///
    /// In eager mode every height is queried here; the first invalid height
    /// aborts the build. A negative or non-finite lazy estimate is rejected
    /// before any row is queried.
    pub fn build<P>(row_count: usize, mode: HeightMode, provider: &mut P) -> Result<Self>
    where
        P: HeightProvider + ?Sized,
    {
        let estimated_height = match mode {
            HeightMode::Eager => 0.0,
            HeightMode::Lazy { estimated_height } => estimated_height,
        };
        if !estimated_height.is_finite() || estimated_height < 0.0 {
            return Err(TableError::InvalidEstimate(estimated_height));
        }
        let mut index = Self {
            heights: vec![None; row_count],
            cumulative: Vec::with_capacity(row_count),
            resolved: 0,
            resolved_sum: 0.0,
            estimated_height,
        };
        if mode == HeightMode::Eager {
            index.resolve_all(provider)?;
        }
        Ok(index)
    }

    /// Build a fully resolved index from known heights.
    pub fn from_heights(heights: &[f64]) -> Result<Self> {
        Self::build(heights.len(), HeightMode::Eager, &mut |row: usize| heights[row])
    }

    /// Number of rows tracked.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.heights.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Whether every row height has been resolved.
    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.resolved == self.heights.len()
    }

    /// Number of rows whose height is known.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    /// Cached height of `row`, if already resolved.
    #[must_use]
    pub fn cached_height(&self, row: usize) -> Option<f64> {
        self.heights.get(row).copied().flatten()
    }

    /// Prefix sums for the leading run of resolved rows.
    #[must_use]
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Height of `row`, resolving it if needed.
    pub fn height_of<P>(&mut self, row: usize, provider: &mut P) -> Result<f64>
    where
        P: HeightProvider + ?Sized,
    {
        self.check_row(row)?;
        self.resolve(row, provider)
    }

    /// Total height of rows `0..=row`.
    pub fn cumulative_through<P>(&mut self, row: usize, provider: &mut P) -> Result<f64>
    where
        P: HeightProvider + ?Sized,
    {
        self.check_row(row)?;
        while self.cumulative.len() <= row {
            let next = self.cumulative.len();
            let height = self.resolve(next, provider)?;
            let before = self.cumulative.last().copied().unwrap_or(0.0);
            self.cumulative.push(before + height);
        }
        Ok(self.cumulative[row])
    }

    /// Total height of rows `0..row`, i.e. the top edge of `row`.
    ///
    /// `offset_of(row_count)` is the full content height.
    pub fn offset_of<P>(&mut self, row: usize, provider: &mut P) -> Result<f64>
    where
        P: HeightProvider + ?Sized,
    {
        if row == 0 {
            return Ok(0.0);
        }
        if row > self.row_count() {
            return Err(TableError::RowOutOfRange {
                row,
                row_count: self.row_count(),
            });
        }
        self.cumulative_through(row - 1, provider)
    }

    /// Total content height.
    ///
    /// Exact once every row is resolved; otherwise unresolved rows count as
    /// the lazy-mode estimate.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        let rows = self.row_count();
        if rows > 0 && self.cumulative.len() == rows {
            return self.cumulative[rows - 1];
        }
        let unresolved = (rows - self.resolved) as f64;
        self.resolved_sum + unresolved * self.estimated_height
    }

    /// Resolve every row and complete the prefix array.
    pub fn resolve_all<P>(&mut self, provider: &mut P) -> Result<()>
    where
        P: HeightProvider + ?Sized,
    {
        match self.row_count() {
            0 => Ok(()),
            rows => self.cumulative_through(rows - 1, provider).map(|_| ()),
        }
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row < self.row_count() {
            Ok(())
        } else {
            Err(TableError::RowOutOfRange {
                row,
                row_count: self.row_count(),
            })
        }
    }

    fn resolve<P>(&mut self, row: usize, provider: &mut P) -> Result<f64>
    where
        P: HeightProvider + ?Sized,
    {
        if let Some(height) = self.heights[row] {
            return Ok(height);
        }
        let height = provider.row_height(row);
        if !height.is_finite() || height < 0.0 {
            return Err(TableError::InvalidHeight { row, height });
        }
        tracing::trace!(row, height, "row height resolved");
        self.heights[row] = Some(height);
        self.resolved += 1;
        self.resolved_sum += height;
        Ok(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(height: f64) -> impl FnMut(usize) -> f64 {
        move |_| height
    }

    #[test]
    fn eager_build_fills_prefix_sums() {
        let heights = [10.0, 20.0, 0.0, 5.0];
        let index = RowHeightIndex::from_heights(&heights).unwrap();
        assert_eq!(index.row_count(), 4);
        assert!(index.is_fully_resolved());
        assert_eq!(index.cumulative(), &[10.0, 30.0, 30.0, 35.0]);
        assert_eq!(index.total_height(), 35.0);
    }

    #[test]
    fn empty_index_has_zero_height() {
        let index = RowHeightIndex::from_heights(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.is_fully_resolved());
        assert_eq!(index.total_height(), 0.0);
    }

    #[test]
    fn lookups_outside_rows_fail() {
        let mut index = RowHeightIndex::from_heights(&[1.0, 2.0]).unwrap();
        let mut provider = uniform(1.0);
        assert_eq!(
            index.height_of(2, &mut provider),
            Err(TableError::RowOutOfRange {
                row: 2,
                row_count: 2
            })
        );
        assert!(index.cumulative_through(5, &mut provider).is_err());
        assert!(index.offset_of(3, &mut provider).is_err());
        assert_eq!(index.offset_of(2, &mut provider), Ok(3.0));
        assert_eq!(index.offset_of(0, &mut provider), Ok(0.0));
    }

    #[test]
    fn invalid_heights_are_rejected_not_clamped() {
        let err = RowHeightIndex::from_heights(&[4.0, -1.0]).unwrap_err();
        assert_eq!(
            err,
            TableError::InvalidHeight {
                row: 1,
                height: -1.0
            }
        );
        assert!(matches!(
            RowHeightIndex::from_heights(&[f64::NAN]),
            Err(TableError::InvalidHeight { row: 0, .. })
        ));
        assert!(matches!(
            RowHeightIndex::from_heights(&[f64::INFINITY]),
            Err(TableError::InvalidHeight { row: 0, .. })
        ));
    }

    #[test]
    fn lazy_estimate_must_be_finite_and_non_negative() {
        for estimate in [-10.0, f64::NAN, f64::INFINITY] {
            let mut queried = false;
            let result = RowHeightIndex::build(
                4,
                HeightMode::Lazy {
                    estimated_height: estimate,
                },
                &mut |_: usize| {
                    queried = true;
                    1.0
                },
            );
            assert!(matches!(result, Err(TableError::InvalidEstimate(_))));
            assert!(!queried);
        }
        let zero = RowHeightIndex::build(
            4,
            HeightMode::Lazy {
                estimated_height: 0.0,
            },
            &mut uniform(1.0),
        )
        .unwrap();
        assert_eq!(zero.total_height(), 0.0);
    }

    #[test]
    fn lazy_mode_queries_on_first_use_only() {
        let mut calls = Vec::new();
        let mut provider = |row: usize| {
            calls.push(row);
            (row + 1) as f64
        };
        let mut index = RowHeightIndex::build(
            5,
            HeightMode::Lazy {
                estimated_height: 10.0,
            },
            &mut provider,
        )
        .unwrap();
        assert_eq!(index.resolved_count(), 0);
        assert_eq!(index.total_height(), 50.0);

        assert_eq!(index.cumulative_through(2, &mut provider), Ok(6.0));
        assert_eq!(index.height_of(1, &mut provider), Ok(2.0));
        assert_eq!(index.cached_height(3), None);
        // rows 0..=2 resolved (6.0) + 2 estimated rows
        assert_eq!(index.total_height(), 26.0);

        index.resolve_all(&mut provider).unwrap();
        assert_eq!(index.total_height(), 15.0);
        drop(provider);
        assert_eq!(calls, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn lazy_out_of_order_resolution_is_memoized() {
        let mut queried = 0;
        let mut provider = |_row: usize| {
            queried += 1;
            3.0
        };
        let mut index = RowHeightIndex::build(
            4,
            HeightMode::Lazy {
                estimated_height: 1.0,
            },
            &mut provider,
        )
        .unwrap();
        assert_eq!(index.height_of(3, &mut provider), Ok(3.0));
        assert_eq!(index.cumulative_through(3, &mut provider), Ok(12.0));
        assert_eq!(index.cumulative(), &[3.0, 6.0, 9.0, 12.0]);
        drop(provider);
        assert_eq!(queried, 4);
    }

    #[test]
    fn lazy_invalid_height_surfaces_at_resolution() {
        let mut provider = |row: usize| if row == 2 { f64::NAN } else { 1.0 };
        let mut index = RowHeightIndex::build(
            4,
            HeightMode::Lazy {
                estimated_height: 1.0,
            },
            &mut provider,
        )
        .unwrap();
        assert_eq!(index.cumulative_through(1, &mut provider), Ok(2.0));
        assert!(matches!(
            index.cumulative_through(3, &mut provider),
            Err(TableError::InvalidHeight { row: 2, .. })
        ));
        assert_eq!(index.cumulative(), &[1.0, 2.0]);
    }
}
