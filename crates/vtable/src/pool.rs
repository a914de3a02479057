//! Idle cell storage keyed by reuse tag.
//!
//! # Invariants
//!
//! 1. A cell is either in the pool or owned by the caller, never both: `take`
//!    moves it out, `store` moves it in.
//! 2. Untagged cells are never retained.
//! 3. Retrieval order within a tag is FIFO.
//!
//! There is no eviction. Each tag's queue grows to the largest number of
//! cells retired at once; [`CellPool::clear`] releases everything.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::cell::TableCell;

/// Outcome of [`CellPool::store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retired {
    /// The cell was queued for reuse.
    Pooled,
    /// The cell had no reuse tag and was dropped.
    Destroyed,
}

/// Recycling store of idle cells.
#[derive(Debug)]
pub struct CellPool<C> {
    idle: FxHashMap<String, VecDeque<C>>,
}

impl<C> Default for CellPool<C> {
    fn default() -> Self {
        Self {
            idle: FxHashMap::default(),
        }
    }
}

impl<C: TableCell> CellPool<C> {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an idle cell stored under `tag`, if any.
    #[must_use = "a taken cell is removed from the pool"]
    pub fn take(&mut self, tag: &str) -> Option<C> {
        let cell = self.idle.get_mut(tag)?.pop_front();
        tracing::trace!(tag, hit = cell.is_some(), "reuse take");
        cell
    }

    /// Retire a cell: queue it under its tag, or drop it when untagged.
    pub fn store(&mut self, cell: C) -> Retired {
        let tag = match cell.reuse_tag() {
            Some(tag) if !tag.is_empty() => tag.to_owned(),
            _ => {
                tracing::trace!("untagged cell destroyed");
                return Retired::Destroyed;
            }
        };
        tracing::trace!(tag = tag.as_str(), "cell stored for reuse");
        self.idle.entry(tag).or_default().push_back(cell);
        Retired::Pooled
    }

    /// Number of idle cells under `tag`.
    #[must_use]
    pub fn idle_count(&self, tag: &str) -> usize {
        self.idle.get(tag).map_or(0, VecDeque::len)
    }

    /// Total idle cells across all tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.idle.values().map(VecDeque::len).sum()
    }

    /// Whether no idle cells are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idle.values().all(VecDeque::is_empty)
    }

    /// Drop every idle cell under `tag`, returning how many were dropped.
    pub fn clear_tag(&mut self, tag: &str) -> usize {
        self.idle.remove(tag).map_or(0, |cells| cells.len())
    }

    /// Drop every idle cell.
    pub fn clear(&mut self) {
        self.idle.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Probe {
        id: u32,
        tag: Option<&'static str>,
    }

    impl TableCell for Probe {
        fn reuse_tag(&self) -> Option<&str> {
            self.tag
        }

        fn set_preferred_height(&mut self, _height: f64) {}
    }

    fn probe(id: u32, tag: Option<&'static str>) -> Probe {
        Probe { id, tag }
    }

    #[test]
    fn miss_on_unknown_or_drained_tag() {
        let mut pool = CellPool::<Probe>::new();
        assert_eq!(pool.take("row"), None);
        assert_eq!(pool.store(probe(1, Some("row"))), Retired::Pooled);
        assert_eq!(pool.take("row"), Some(probe(1, Some("row"))));
        assert_eq!(pool.take("row"), None);
    }

    #[test]
    fn untagged_cells_are_destroyed() {
        let mut pool = CellPool::new();
        assert_eq!(pool.store(probe(1, None)), Retired::Destroyed);
        assert_eq!(pool.store(probe(2, Some(""))), Retired::Destroyed);
        assert!(pool.is_empty());
        assert_eq!(pool.take(""), None);
    }

    #[test]
    fn tags_are_isolated_and_fifo() {
        let mut pool = CellPool::new();
        pool.store(probe(1, Some("a")));
        pool.store(probe(2, Some("b")));
        pool.store(probe(3, Some("a")));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.idle_count("a"), 2);
        assert_eq!(pool.take("a").map(|c| c.id), Some(1));
        assert_eq!(pool.take("a").map(|c| c.id), Some(3));
        assert_eq!(pool.take("b").map(|c| c.id), Some(2));
        assert!(pool.is_empty());
    }

    #[test]
    fn clearing_releases_cells() {
        let mut pool = CellPool::new();
        pool.store(probe(1, Some("a")));
        pool.store(probe(2, Some("a")));
        pool.store(probe(3, Some("b")));
        assert_eq!(pool.clear_tag("a"), 2);
        assert_eq!(pool.clear_tag("a"), 0);
        assert_eq!(pool.len(), 1);
        pool.clear();
        assert!(pool.is_empty());
    }
}
