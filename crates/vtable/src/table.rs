//! The table engine: reload, scroll refresh, and the tick-driven lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! new ─► initialize ─► set_data_source ─► on_tick (reload) ─► scroll / resize ...
//!                          │                    ▲
//!                          └── reload pending ──┘
//! ```
//!
//! The host calls [`TableView::initialize`] once and [`TableView::on_tick`]
//! every scheduling cycle. Attaching a data source only marks a reload as
//! pending; any number of triggers inside one tick coalesce into a single
//! reload at the next [`on_tick`](TableView::on_tick). The new source is held
//! aside until its heights are indexed, so the rows on screen always come
//! from the source that measured them.
//!
//! # Refresh
//!
//! Each scroll or viewport change recomputes the visible range, reconciles
//! the visible cells at the two edges, and resizes the spacers. All work is
//! synchronous. Callbacks receive only the pieces they need (the reuse pool,
//! or a single cell), so they cannot re-enter the engine.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `NotInitialized` | tick/reload before `initialize()` | Nothing changes |
//! | `NoDataSource` | reload with no source | Nothing changes |
//! | `InvalidHeight` (eager) | bad height during reload | Previous source and state kept |
//! | `InvalidEstimate` | bad lazy estimate at reload | Previous source and state kept |
//! | `InvalidHeight` (lazy) | bad height during refresh | Partial window, still consistent |
//! | `NotLoaded` | scroll/height query before first reload | Nothing changes |

use crate::cell::TableCell;
use crate::config::{ReloadPolicy, TableConfig};
use crate::error::{Result, TableError};
use crate::heights::RowHeightIndex;
use crate::lifecycle::{RowBinder, Transition, VisibleCell, VisibleRows};
use crate::padding::{PaddingController, Spacer};
use crate::pool::CellPool;
use crate::range::{VisibleRange, visible_range};

/// Application data feeding the table.
pub trait TableDataSource<C> {
    /// Number of rows.
    fn row_count(&mut self) -> usize;

    /// Height of `row`; must be finite and non-negative.
    fn row_height(&mut self, row: usize) -> f64;

    /// A cell displaying `row`.
    ///
    /// Implementations should try [`CellPool::take`] with their reuse tag
    /// before constructing a fresh cell.
    fn cell_for_row(&mut self, pool: &mut CellPool<C>, row: usize) -> C;
}

/// Optional observer of table internals.
pub trait TableDelegate<C> {
    /// Called after `cell` is placed for `row`, before it is first shown.
    fn will_display_cell(&mut self, row: usize, cell: &mut C);
}

/// One child of the content parent, in display order.
#[derive(Debug)]
pub enum LayoutSlot<'a, C> {
    /// A spacer standing in for hidden rows.
    Spacer(&'a Spacer),
    /// A bound row.
    Row(&'a VisibleCell<C>),
}

/// Virtualized, cell-recycling vertical list.
pub struct TableView<C> {
    config: TableConfig,
    source: Option<Box<dyn TableDataSource<C>>>,
    pending_source: Option<Box<dyn TableDataSource<C>>>,
    delegate: Option<Box<dyn TableDelegate<C>>>,
    heights: Option<RowHeightIndex>,
    rows: VisibleRows<C>,
    pool: CellPool<C>,
    padding: PaddingController,
    scroll_offset: f64,
    viewport_height: f64,
    content_height: f64,
    reload_pending: bool,
    initialized: bool,
}

impl<C: TableCell> Default for TableView<C> {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl<C> std::fmt::Debug for TableView<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableView")
            .field("config", &self.config)
            .field("rows", &self.heights.as_ref().map(RowHeightIndex::row_count))
            .field("scroll_offset", &self.scroll_offset)
            .field("viewport_height", &self.viewport_height)
            .field("content_height", &self.content_height)
            .field("reload_pending", &self.reload_pending)
            .field("source_pending", &self.pending_source.is_some())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl<C: TableCell> TableView<C> {
    /// Create an uninitialized table.
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            source: None,
            pending_source: None,
            delegate: None,
            heights: None,
            rows: VisibleRows::new(),
            pool: CellPool::new(),
            padding: PaddingController::new(),
            scroll_offset: 0.0,
            viewport_height: 0.0,
            content_height: 0.0,
            reload_pending: false,
            initialized: false,
        }
    }

    /// Set the initial viewport height.
    #[must_use]
    pub fn with_viewport_height(mut self, height: f64) -> Self {
        self.viewport_height = height;
        self
    }

    /// Prepare the spacers. Call once before the first tick.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.padding.reset();
        self.initialized = true;
        tracing::debug!(config = %self.config.to_jsonl(), "table initialized");
    }

    /// Consume a pending reload, if any. Returns whether a reload ran.
    pub fn on_tick(&mut self) -> Result<bool> {
        if !self.initialized {
            return Err(TableError::NotInitialized);
        }
        if !std::mem::take(&mut self.reload_pending) {
            return Ok(false);
        }
        self.reload_data()?;
        Ok(true)
    }

    /// Attach a data source and schedule a reload for the next tick.
    ///
    /// The current source stays in use until the reload indexes the new
    /// one. If that fails, the new source is discarded.
    pub fn set_data_source(&mut self, source: impl TableDataSource<C> + 'static) {
        self.pending_source = Some(Box::new(source));
        self.reload_pending = true;
    }

    /// Attach a delegate.
    pub fn set_delegate(&mut self, delegate: impl TableDelegate<C> + 'static) {
        self.delegate = Some(Box::new(delegate));
    }

    /// Detach the delegate.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Schedule a reload for the next tick.
    pub fn request_reload(&mut self) {
        self.reload_pending = true;
    }

    /// Rebuild heights from the data source and repopulate the window.
    ///
    /// A source attached since the last reload is installed only once its
    /// height index builds. Visible cells are dropped, or recycled under
    /// [`ReloadPolicy::Recycle`]. Idle pooled cells are kept.
    pub fn reload_data(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(TableError::NotInitialized);
        }
        let source = match self.pending_source.as_mut() {
            Some(pending) => pending,
            None => self.source.as_mut().ok_or(TableError::NoDataSource)?,
        };
        let row_count = source.row_count();
        let _span = tracing::debug_span!("table_reload", rows = row_count).entered();

        let built = RowHeightIndex::build(row_count, self.config.height_mode, &mut |row: usize| {
            source.row_height(row)
        });
        let index = match built {
            Ok(index) => index,
            Err(err) => {
                if self.pending_source.take().is_some() {
                    tracing::warn!(error = %err, "new data source rejected");
                }
                return Err(err);
            }
        };
        if let Some(pending) = self.pending_source.take() {
            self.source = Some(pending);
        }

        let mut retired = 0usize;
        for entry in self.rows.drain() {
            retired += 1;
            match self.config.reload_policy {
                ReloadPolicy::Destroy => drop(entry),
                ReloadPolicy::Recycle => {
                    self.pool.store(entry.into_cell());
                }
            }
        }
        self.content_height = index.total_height();
        self.padding.collapse(self.content_height);
        self.heights = Some(index);
        self.reload_pending = false;

        let transition = self.refresh_rows()?;
        tracing::debug!(
            retired,
            bound = transition.added(),
            content_height = self.content_height,
            range = ?self.rows.range(),
            "table reloaded"
        );
        Ok(())
    }

    /// Handle a new scroll offset from the host.
    ///
    /// While a reload is pending the offset is only recorded; the reload
    /// picks it up.
    pub fn scroll_offset_changed(&mut self, offset: f64) -> Result<()> {
        if !offset.is_finite() {
            return Err(TableError::InvalidScrollOffset(offset));
        }
        if self.reload_pending {
            self.scroll_offset = offset;
            return Ok(());
        }
        if self.heights.is_none() {
            return Err(TableError::NotLoaded);
        }
        self.scroll_offset = offset;
        self.refresh_rows().map(|_| ())
    }

    /// Handle a normalized scroll position, where `1.0` is the top and
    /// `0.0` the bottom of the scrollable extent.
    pub fn scroll_value_changed(&mut self, normalized: f64) -> Result<()> {
        if !normalized.is_finite() {
            return Err(TableError::InvalidScrollOffset(normalized));
        }
        let scrollable = (self.content_height - self.viewport_height).max(0.0);
        self.scroll_offset_changed((1.0 - normalized) * scrollable)
    }

    /// Update the viewport height and refresh the window if loaded.
    pub fn set_viewport_height(&mut self, height: f64) -> Result<()> {
        self.viewport_height = height;
        if self.heights.is_none() || self.reload_pending {
            return Ok(());
        }
        self.refresh_rows().map(|_| ())
    }

    /// Take an idle cell stored under `tag`.
    #[must_use = "a taken cell is removed from the pool"]
    pub fn get_reusable_cell(&mut self, tag: &str) -> Option<C> {
        self.pool.take(tag)
    }

    /// Drop every idle pooled cell.
    pub fn clear_reusable_cells(&mut self) {
        let dropped = self.pool.len();
        self.pool.clear();
        tracing::debug!(dropped, "reuse pool cleared");
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Whether a reload is waiting for the next tick.
    #[must_use]
    pub fn reload_pending(&self) -> bool {
        self.reload_pending
    }

    /// Whether a reload has established row heights.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.heights.is_some()
    }

    /// Number of rows from the last reload.
    pub fn row_count(&self) -> Result<usize> {
        self.heights
            .as_ref()
            .map(RowHeightIndex::row_count)
            .ok_or(TableError::NotLoaded)
    }

    /// Height index from the last reload.
    pub fn height_index(&self) -> Result<&RowHeightIndex> {
        self.heights.as_ref().ok_or(TableError::NotLoaded)
    }

    /// Height of `row`.
    pub fn row_height(&mut self, row: usize) -> Result<f64> {
        let (heights, source) = self.loaded_parts()?;
        heights.height_of(row, &mut |r: usize| source.row_height(r))
    }

    /// Top edge of `row` within the content.
    pub fn offset_of_row(&mut self, row: usize) -> Result<f64> {
        let (heights, source) = self.loaded_parts()?;
        heights.offset_of(row, &mut |r: usize| source.row_height(r))
    }

    /// Rows currently bound to cells.
    #[must_use]
    pub fn visible_range(&self) -> VisibleRange {
        self.rows.range()
    }

    /// Bound cells in row order.
    pub fn visible_cells(&self) -> impl DoubleEndedIterator<Item = &VisibleCell<C>> {
        self.rows.iter()
    }

    /// Bound cells in row order, mutably.
    pub fn visible_cells_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut VisibleCell<C>> {
        self.rows.iter_mut()
    }

    /// Cell bound to `row`, if visible.
    #[must_use]
    pub fn visible_cell(&self, row: usize) -> Option<&C> {
        self.rows.get(row)
    }

    /// Children of the content parent: top spacer, rows, bottom spacer.
    pub fn layout(&self) -> impl Iterator<Item = LayoutSlot<'_, C>> {
        std::iter::once(LayoutSlot::Spacer(self.padding.top()))
            .chain(self.rows.iter().map(LayoutSlot::Row))
            .chain(std::iter::once(LayoutSlot::Spacer(self.padding.bottom())))
    }

    /// The two spacers.
    #[must_use]
    pub fn padding(&self) -> &PaddingController {
        &self.padding
    }

    /// Idle cells awaiting reuse.
    #[must_use]
    pub fn pool(&self) -> &CellPool<C> {
        &self.pool
    }

    /// Total content height (the content parent's height).
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Last scroll offset reported by the host.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Viewport height reported by the host.
    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn loaded_parts(
        &mut self,
    ) -> Result<(&mut RowHeightIndex, &mut Box<dyn TableDataSource<C>>)> {
        let heights = self.heights.as_mut().ok_or(TableError::NotLoaded)?;
        let source = self.source.as_mut().ok_or(TableError::NoDataSource)?;
        Ok((heights, source))
    }

    fn refresh_rows(&mut self) -> Result<Transition> {
        let Self {
            config,
            source,
            delegate,
            heights,
            rows,
            pool,
            padding,
            scroll_offset,
            viewport_height,
            content_height,
            ..
        } = self;
        let heights = heights.as_mut().ok_or(TableError::NotLoaded)?;
        let source = source.as_mut().ok_or(TableError::NoDataSource)?;
        let _span = tracing::debug_span!("table_refresh", offset = *scroll_offset).entered();

        let previous = rows.range();
        let target = visible_range(
            heights,
            &mut |row: usize| source.row_height(row),
            *scroll_offset,
            *viewport_height,
            config.range_scan,
        )?;

        let mut binder = EngineBinder {
            source: &mut *source,
            delegate,
            pool,
            heights: &mut *heights,
        };
        let transition = rows.reconcile(target, &mut binder)?;

        *content_height = heights.total_height();
        padding.refresh(
            target,
            heights,
            &mut |row: usize| source.row_height(row),
            *content_height,
        )?;

        if transition == Transition::default() {
            tracing::trace!(range = ?target, "visible rows unchanged");
        } else {
            tracing::debug!(
                from = ?previous,
                to = ?target,
                removed = transition.removed(),
                added = transition.added(),
                "visible rows refreshed"
            );
        }
        Ok(transition)
    }
}

/// Binds rows through the data source, pool, and delegate.
struct EngineBinder<'a, C> {
    source: &'a mut Box<dyn TableDataSource<C>>,
    delegate: &'a mut Option<Box<dyn TableDelegate<C>>>,
    pool: &'a mut CellPool<C>,
    heights: &'a mut RowHeightIndex,
}

impl<C: TableCell> RowBinder<C> for EngineBinder<'_, C> {
    fn row_height(&mut self, row: usize) -> Result<f64> {
        let source = &mut *self.source;
        self.heights
            .height_of(row, &mut |r: usize| source.row_height(r))
    }

    fn make_cell(&mut self, row: usize) -> C {
        self.source.cell_for_row(self.pool, row)
    }

    fn recycle(&mut self, cell: C) {
        self.pool.store(cell);
    }

    fn will_display(&mut self, row: usize, cell: &mut C) {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.will_display_cell(row, cell);
        }
    }
}
