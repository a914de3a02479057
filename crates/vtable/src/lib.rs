#![forbid(unsafe_code)]

//! Virtualized, cell-recycling vertical list engine.
//!
//! # Role
//! `vtable` decides which rows of an arbitrarily long list intersect the
//! viewport, keeps one bound cell per visible row, recycles cells that scroll
//! out of view, and sizes two spacers so the scroll container measures the
//! full content height. Constructing and positioning the actual views is left
//! to the host.
//!
//! # Primary responsibilities
//! - **RowHeightIndex** ([`heights`]): cached heights and prefix sums.
//! - **Visible range** ([`range`]): rows covering `[offset, offset + viewport)`.
//! - **CellPool** ([`pool`]): idle cells keyed by reuse tag.
//! - **VisibleRows** ([`lifecycle`]): edge-only add/remove between ranges.
//! - **PaddingController** ([`padding`]): top and bottom spacer sizes.
//! - **TableView** ([`table`]): reload, scroll refresh, tick lifecycle.
//!
//! # Example
//!
//! ```
//! use vtable::{CellPool, TableCell, TableConfig, TableDataSource, TableView, VisibleRange};
//!
//! struct Label {
//!     text: String,
//! }
//!
//! impl TableCell for Label {
//!     fn reuse_tag(&self) -> Option<&str> {
//!         Some("label")
//!     }
//!     fn set_preferred_height(&mut self, _height: f64) {}
//! }
//!
//! struct Numbers;
//!
//! impl TableDataSource<Label> for Numbers {
//!     fn row_count(&mut self) -> usize {
//!         1_000
//!     }
//!     fn row_height(&mut self, _row: usize) -> f64 {
//!         20.0
//!     }
//!     fn cell_for_row(&mut self, pool: &mut CellPool<Label>, row: usize) -> Label {
//!         let mut cell = pool.take("label").unwrap_or(Label { text: String::new() });
//!         cell.text = format!("Row {row}");
//!         cell
//!     }
//! }
//!
//! let mut table = TableView::new(TableConfig::default()).with_viewport_height(50.0);
//! table.initialize();
//! table.set_data_source(Numbers);
//! table.on_tick()?;
//! assert_eq!(table.visible_range(), VisibleRange::new(0, 2));
//!
//! table.scroll_offset_changed(400.0)?;
//! assert_eq!(table.visible_range(), VisibleRange::new(19, 22));
//! # Ok::<(), vtable::TableError>(())
//! ```

pub mod cell;
pub mod config;
pub mod error;
pub mod heights;
pub mod lifecycle;
pub mod padding;
pub mod pool;
pub mod range;
pub mod table;

pub use cell::TableCell;
pub use config::{HeightMode, RangeScan, ReloadPolicy, TableConfig};
pub use error::{Result, TableError};
pub use heights::{HeightProvider, RowHeightIndex};
pub use lifecycle::{RowBinder, Transition, VisibleCell, VisibleRows};
pub use padding::{PaddingController, Spacer, SpacerEdge};
pub use pool::{CellPool, Retired};
pub use range::{VisibleRange, visible_range};
pub use table::{LayoutSlot, TableDataSource, TableDelegate, TableView};
