//! Visible row lifecycle: edge-only reconciliation between ranges.
//!
//! [`VisibleRows`] owns the bound cells of the visible window as a
//! double-ended sequence ordered by row. The visible range is derived from
//! the front and back entries, so it can never disagree with the cells.
//!
//! A reconcile pass runs in a fixed order:
//!
//! 1. pop rows above the new first row from the front,
//! 2. pop rows below the new last row from the back,
//! 3. bind rows revealed above at the front (nearest row first),
//! 4. bind rows revealed below at the back.
//!
//! Every removal is recycled before any row is bound, so a cell is never
//! handed out while still logically visible. When nothing survives steps 1
//! and 2 (initial population, reload, or a jump past the whole window) the
//! new range is bound in one forward pass at the back.

use std::collections::VecDeque;

use crate::cell::TableCell;
use crate::error::Result;
use crate::range::VisibleRange;

/// Collaborators needed to bind and retire rows.
pub trait RowBinder<C> {
    /// Height of `row`; fails for rows outside `[0, row_count)`.
    fn row_height(&mut self, row: usize) -> Result<f64>;

    /// A cell with `row`'s content bound, reused or fresh.
    fn make_cell(&mut self, row: usize) -> C;

    /// Retire a cell that left the visible window.
    fn recycle(&mut self, cell: C);

    /// Called once per bind after the cell is placed, before it is shown.
    fn will_display(&mut self, row: usize, cell: &mut C);
}

/// A bound cell and the row it displays.
#[derive(Debug)]
pub struct VisibleCell<C> {
    row: usize,
    cell: C,
}

impl<C> VisibleCell<C> {
    /// Row currently displayed.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// The bound cell.
    #[must_use]
    pub fn cell(&self) -> &C {
        &self.cell
    }

    /// The bound cell, mutably.
    pub fn cell_mut(&mut self) -> &mut C {
        &mut self.cell
    }

    /// Consume the entry, returning the cell.
    #[must_use]
    pub fn into_cell(self) -> C {
        self.cell
    }
}

/// Structural changes made by one reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    /// Rows removed from the top edge.
    pub removed_top: usize,
    /// Rows removed from the bottom edge.
    pub removed_bottom: usize,
    /// Rows bound at the top edge.
    pub added_top: usize,
    /// Rows bound at the bottom edge.
    pub added_bottom: usize,
}

impl Transition {
    /// Total rows removed.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed_top + self.removed_bottom
    }

    /// Total rows bound.
    #[must_use]
    pub fn added(&self) -> usize {
        self.added_top + self.added_bottom
    }
}

/// Bound cells of the visible window, contiguous and ordered by row.
#[derive(Debug)]
pub struct VisibleRows<C> {
    cells: VecDeque<VisibleCell<C>>,
}

impl<C> Default for VisibleRows<C> {
    fn default() -> Self {
        Self {
            cells: VecDeque::new(),
        }
    }
}

impl<C: TableCell> VisibleRows<C> {
    /// Create an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Range of rows currently bound.
    #[must_use]
    pub fn range(&self) -> VisibleRange {
        match (self.cells.front(), self.cells.back()) {
            (Some(front), Some(back)) => VisibleRange::new(front.row, back.row),
            _ => VisibleRange::Empty,
        }
    }

    /// Number of bound cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bound cells in row order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &VisibleCell<C>> + ExactSizeIterator {
        self.cells.iter()
    }

    /// Bound cells in row order, mutably.
    pub fn iter_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = &mut VisibleCell<C>> + ExactSizeIterator {
        self.cells.iter_mut()
    }

    /// Cell bound to `row`, if visible.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&C> {
        let first = self.cells.front()?.row;
        let slot = row.checked_sub(first)?;
        self.cells.get(slot).map(|entry| &entry.cell)
    }

    /// Remove every bound cell, front to back.
    pub fn drain(&mut self) -> impl Iterator<Item = VisibleCell<C>> + '_ {
        self.cells.drain(..)
    }

    /// Move the window to `target` with edge operations only.
    ///
    /// On error the window keeps every mutation made so far and stays
    /// contiguous.
    pub fn reconcile<B>(&mut self, target: VisibleRange, binder: &mut B) -> Result<Transition>
    where
        B: RowBinder<C> + ?Sized,
    {
        let mut transition = Transition::default();
        let (first, last) = match target {
            VisibleRange::Rows { first, last } => (first, last),
            VisibleRange::Empty => {
                while let Some(entry) = self.cells.pop_front() {
                    binder.recycle(entry.cell);
                    transition.removed_top += 1;
                }
                return Ok(transition);
            }
        };

        while self.cells.front().is_some_and(|entry| entry.row < first) {
            if let Some(entry) = self.cells.pop_front() {
                binder.recycle(entry.cell);
                transition.removed_top += 1;
            }
        }
        while self.cells.back().is_some_and(|entry| entry.row > last) {
            if let Some(entry) = self.cells.pop_back() {
                binder.recycle(entry.cell);
                transition.removed_bottom += 1;
            }
        }

        match self.range() {
            VisibleRange::Rows {
                first: front,
                last: back,
            } => {
                for row in (first..front).rev() {
                    self.bind_front(row, binder)?;
                    transition.added_top += 1;
                }
                for row in back + 1..=last {
                    self.bind_back(row, binder)?;
                    transition.added_bottom += 1;
                }
            }
            VisibleRange::Empty => {
                for row in first..=last {
                    self.bind_back(row, binder)?;
                    transition.added_bottom += 1;
                }
            }
        }
        Ok(transition)
    }

    fn bind_front<B>(&mut self, row: usize, binder: &mut B) -> Result<()>
    where
        B: RowBinder<C> + ?Sized,
    {
        let cell = prepare(row, binder)?;
        self.cells.push_front(VisibleCell { row, cell });
        if let Some(entry) = self.cells.front_mut() {
            binder.will_display(row, &mut entry.cell);
        }
        Ok(())
    }

    fn bind_back<B>(&mut self, row: usize, binder: &mut B) -> Result<()>
    where
        B: RowBinder<C> + ?Sized,
    {
        let cell = prepare(row, binder)?;
        self.cells.push_back(VisibleCell { row, cell });
        if let Some(entry) = self.cells.back_mut() {
            binder.will_display(row, &mut entry.cell);
        }
        Ok(())
    }
}

fn prepare<C, B>(row: usize, binder: &mut B) -> Result<C>
where
    C: TableCell,
    B: RowBinder<C> + ?Sized,
{
    let height = binder.row_height(row)?;
    let mut cell = binder.make_cell(row);
    cell.set_preferred_height(height);
    tracing::trace!(row, height, "row bound");
    Ok(cell)
}
