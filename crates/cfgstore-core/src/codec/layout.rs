//! Column alignment for sibling keys.
//!
//! Every `key => value` line of one level is padded with tab characters so
//! the `=>` operators line up:
//!
//! ```text
//! 'a'        => 1,
//! 'longkey' => 2
//! ```
//!
//! # The algorithm (for beginners)
//!
//! With a tab unit of `w` columns:
//!
//! 1. `max_len` is the longest key in the level (1 for an empty level).
//! 2. `max_tabs = ceil(max_len / w)`: how many tab stops the longest key spans.
//! 3. Each key pads with `max_tabs - round(len / w)` tabs.  When that is zero
//!    or negative the key is already at (or past) the column, and a single
//!    space separates it from `=>` instead.
//!
//! The per-key count rounds halves up; it does not truncate.

use crate::domain::document::Key;

/// Default width of one tab stop, in columns.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Computes alignment for document levels using a fixed tab unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCalculator {
    tab_width: usize,
}

impl LayoutCalculator {
    /// Creates a calculator with the given tab unit.  A width of 0 is
    /// treated as 1.
    pub fn new(tab_width: usize) -> Self {
        Self {
            tab_width: tab_width.max(1),
        }
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Computes the layout of one level from its sibling keys.
    pub fn level<'a, I>(&self, keys: I) -> LevelLayout
    where
        I: IntoIterator<Item = &'a Key>,
    {
        let max_len = keys.into_iter().map(Key::text_len).max().unwrap_or(1);
        LevelLayout {
            tab_width: self.tab_width,
            max_tabs: max_len.div_ceil(self.tab_width),
        }
    }

    /// `round(len / tab_width)`, halves rounding up.
    pub fn tabs_for_len(&self, len: usize) -> usize {
        (2 * len + self.tab_width) / (2 * self.tab_width)
    }
}

impl Default for LayoutCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_WIDTH)
    }
}

/// Alignment of one document level, produced by [`LayoutCalculator::level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelLayout {
    tab_width: usize,
    max_tabs: usize,
}

impl LevelLayout {
    /// Number of tab stops spanned by the longest key of the level.
    pub fn max_tabs(&self) -> usize {
        self.max_tabs
    }

    /// Number of tab characters to place after `key`; 0 means "one space".
    pub fn pad_tabs(&self, key: &Key) -> usize {
        let calculator = LayoutCalculator::new(self.tab_width);
        self.max_tabs
            .saturating_sub(calculator.tabs_for_len(key.text_len()))
    }

    /// The separator text placed between `key` and `=>`.
    pub fn padding(&self, key: &Key) -> String {
        match self.pad_tabs(key) {
            0 => " ".to_string(),
            n => "\t".repeat(n),
        }
    }
}

/// Leading indentation for a line at `depth` (one tab per level).
pub fn indent(depth: usize) -> String {
    "\t".repeat(depth)
}
