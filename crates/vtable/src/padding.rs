//! Spacer sizing around the visible window.
//!
//! The content parent holds, in order: the top spacer, the visible cells,
//! and the bottom spacer. The spacers stand in for every hidden row so the
//! container still measures the full content height.
//!
//! # Invariants
//!
//! 1. `top == offset_of(first)`, the height of rows above the window.
//! 2. `top + Σ visible + bottom == content_height` after every refresh.
//! 3. With no visible rows: `top == 0` and `bottom == content_height`.

use crate::error::Result;
use crate::heights::{HeightProvider, RowHeightIndex};
use crate::range::VisibleRange;

/// Which edge of the visible window a spacer occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacerEdge {
    /// Above the first visible row.
    Top,
    /// Below the last visible row.
    Bottom,
}

/// Invisible placeholder standing in for hidden rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacer {
    edge: SpacerEdge,
    height: f64,
}

impl Spacer {
    fn new(edge: SpacerEdge) -> Self {
        Self { edge, height: 0.0 }
    }

    /// Edge occupied by this spacer.
    #[must_use]
    pub fn edge(&self) -> SpacerEdge {
        self.edge
    }

    /// Preferred height of this spacer.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Owner of the top and bottom spacers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddingController {
    top: Spacer,
    bottom: Spacer,
}

impl Default for PaddingController {
    fn default() -> Self {
        Self {
            top: Spacer::new(SpacerEdge::Top),
            bottom: Spacer::new(SpacerEdge::Bottom),
        }
    }
}

impl PaddingController {
    /// Create both spacers with zero height.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spacer above the visible window.
    #[must_use]
    pub fn top(&self) -> &Spacer {
        &self.top
    }

    /// Spacer below the visible window.
    #[must_use]
    pub fn bottom(&self) -> &Spacer {
        &self.bottom
    }

    /// Collapse both spacers to zero.
    pub fn reset(&mut self) {
        self.top.height = 0.0;
        self.bottom.height = 0.0;
    }

    /// Size the spacers for an empty window: everything sits below.
    pub fn collapse(&mut self, content_height: f64) {
        self.top.height = 0.0;
        self.bottom.height = content_height;
    }

    /// Resize both spacers for `range`.
    pub fn refresh<P>(
        &mut self,
        range: VisibleRange,
        index: &mut RowHeightIndex,
        provider: &mut P,
        content_height: f64,
    ) -> Result<()>
    where
        P: HeightProvider + ?Sized,
    {
        let (top, through_last) = match range {
            VisibleRange::Empty => (0.0, 0.0),
            VisibleRange::Rows { first, last } => (
                index.offset_of(first, provider)?,
                index.cumulative_through(last, provider)?,
            ),
        };
        self.top.height = top;
        self.bottom.height = content_height - through_last;
        Ok(())
    }
}
