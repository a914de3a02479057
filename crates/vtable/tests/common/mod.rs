//! Shared fixtures: a counting cell, a list data source, and a delegate.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use vtable::{CellPool, TableCell, TableConfig, TableDataSource, TableDelegate, TableView};

/// Row view that counts how many times it has been shown.
#[derive(Debug)]
pub struct VisibleCounterCell {
    pub id: usize,
    pub tag: Option<String>,
    pub row: usize,
    pub label: String,
    pub height: f64,
    pub times_shown: usize,
}

impl VisibleCounterCell {
    pub fn notify_became_visible(&mut self) {
        self.times_shown += 1;
    }
}

impl TableCell for VisibleCounterCell {
    fn reuse_tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn set_preferred_height(&mut self, height: f64) {
        self.height = height;
    }
}

/// Counters shared between a test and the source it hands to the table.
#[derive(Debug, Default)]
pub struct SourceStats {
    pub created: usize,
    pub reused: usize,
    pub take_attempts: usize,
    pub height_queries: usize,
    pub cells_requested: Vec<usize>,
}

/// Data source backed by a height list.
pub struct ListSource {
    heights: Vec<f64>,
    tag: Option<String>,
    stats: Rc<RefCell<SourceStats>>,
}

impl ListSource {
    pub fn new(heights: Vec<f64>) -> Self {
        Self {
            heights,
            tag: Some("row".to_string()),
            stats: Rc::default(),
        }
    }

    pub fn uniform(rows: usize, height: f64) -> Self {
        Self::new(vec![height; rows])
    }

    pub fn with_tag(mut self, tag: Option<&str>) -> Self {
        self.tag = tag.map(str::to_string);
        self
    }

    pub fn stats(&self) -> Rc<RefCell<SourceStats>> {
        Rc::clone(&self.stats)
    }
}

impl TableDataSource<VisibleCounterCell> for ListSource {
    fn row_count(&mut self) -> usize {
        self.heights.len()
    }

    fn row_height(&mut self, row: usize) -> f64 {
        self.stats.borrow_mut().height_queries += 1;
        self.heights[row]
    }

    fn cell_for_row(
        &mut self,
        pool: &mut CellPool<VisibleCounterCell>,
        row: usize,
    ) -> VisibleCounterCell {
        let mut stats = self.stats.borrow_mut();
        stats.cells_requested.push(row);
        let reused = match self.tag.as_deref() {
            Some(tag) => {
                stats.take_attempts += 1;
                pool.take(tag)
            }
            None => None,
        };
        let mut cell = match reused {
            Some(cell) => {
                stats.reused += 1;
                cell
            }
            None => {
                stats.created += 1;
                VisibleCounterCell {
                    id: stats.created,
                    tag: self.tag.clone(),
                    row,
                    label: String::new(),
                    height: 0.0,
                    times_shown: 0,
                }
            }
        };
        cell.row = row;
        cell.label = format!("Row {row}");
        cell
    }
}

/// Delegate that notifies cells and records `(row, cell id)` per display.
#[derive(Default)]
pub struct CountingDelegate {
    pub shown: Rc<RefCell<Vec<(usize, usize)>>>,
}

impl CountingDelegate {
    pub fn log(&self) -> Rc<RefCell<Vec<(usize, usize)>>> {
        Rc::clone(&self.shown)
    }
}

impl TableDelegate<VisibleCounterCell> for CountingDelegate {
    fn will_display_cell(&mut self, row: usize, cell: &mut VisibleCounterCell) {
        assert_eq!(cell.row, row, "cell bound before display");
        cell.notify_became_visible();
        self.shown.borrow_mut().push((row, cell.id));
    }
}

/// Initialized table with `source` loaded at offset 0.
pub fn loaded_table(
    config: TableConfig,
    viewport_height: f64,
    source: ListSource,
) -> TableView<VisibleCounterCell> {
    let mut table = TableView::new(config).with_viewport_height(viewport_height);
    table.initialize();
    table.set_data_source(source);
    table.on_tick().expect("initial reload");
    table
}

/// Rows currently bound, front to back.
pub fn visible_rows(table: &TableView<VisibleCounterCell>) -> Vec<usize> {
    table.visible_cells().map(|entry| entry.row()).collect()
}

/// `top + Σ visible + bottom - content_height`.
pub fn padding_error(table: &TableView<VisibleCounterCell>) -> f64 {
    let visible: f64 = table.visible_cells().map(|entry| entry.cell().height).sum();
    let padding = table.padding();
    padding.top().height() + visible + padding.bottom().height() - table.content_height()
}
