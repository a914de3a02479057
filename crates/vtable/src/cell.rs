//! Capability trait for host row views.

/// A host view that can display one row at a time.
///
/// The engine never inspects a cell beyond this interface. Content binding
/// happens in [`TableDataSource::cell_for_row`](crate::table::TableDataSource::cell_for_row).
pub trait TableCell {
    /// Reuse pool this cell belongs to.
    ///
    /// `None` or an empty tag means the cell is dropped when it leaves the
    /// visible window instead of being recycled.
    fn reuse_tag(&self) -> Option<&str>;

    /// Height allocated to the cell for the row it is about to display.
    fn set_preferred_height(&mut self, height: f64);
}

impl<C: TableCell + ?Sized> TableCell for Box<C> {
    fn reuse_tag(&self) -> Option<&str> {
        (**self).reuse_tag()
    }

    fn set_preferred_height(&mut self, height: f64) {
        (**self).set_preferred_height(height);
    }
}
