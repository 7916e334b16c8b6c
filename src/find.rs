use indexmap::IndexSet;

/// A searchable column: the row tag, or a property column by index.
/// The index column and the header are never searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FindColumn {
    Tag,
    Property(usize),
}

/// One rendered table cell, as the find bar sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub column: FindColumn,
}

impl CellRef {
    pub fn tag(row: usize) -> Self {
        Self {
            row,
            column: FindColumn::Tag,
        }
    }

    pub fn property(row: usize, column: usize) -> Self {
        Self {
            row,
            column: FindColumn::Property(column),
        }
    }
}

/// Anything that can hand out the currently displayed text of its cells.
pub trait SearchSource {
    fn row_count(&self) -> usize;
    fn column_count(&self) -> usize;
    fn cell_text(&self, cell: CellRef) -> String;
}

/// Where keyboard focus went when it left the find input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// Another control inside the find bar.
    FindUi,
    /// A table cell; `editable` is true for numeric and NAME cells.
    Cell { editable: bool },
    /// A NAME selector.
    Selector,
    /// Anything else, or nothing.
    Outside,
}

/// Find bar state: pattern, ordered match set and the current match.
///
/// Matching is a case-insensitive literal substring test on the displayed text, so
/// the result depends on the display mode at the time of the search.
#[derive(Debug, Clone, Default)]
pub struct FindIndex {
    open: bool,
    pattern: String,
    matches: IndexSet<CellRef>,
    current: usize,
}

impl FindIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Open the bar, keeping the previous pattern, and search again.
    pub fn open<S: SearchSource + ?Sized>(&mut self, source: &S) {
        self.open = true;
        self.rebuild(source);
    }

    /// Replace the pattern. The current match restarts at the first one.
    pub fn set_pattern<S: SearchSource + ?Sized>(&mut self, pattern: &str, source: &S) {
        self.pattern = pattern.to_string();
        self.current = 0;
        if self.open {
            self.rebuild(source);
        }
    }

    /// Re-run the search against fresh cell text, e.g. after a display mode switch.
    pub fn refresh<S: SearchSource + ?Sized>(&mut self, source: &S) {
        if self.open {
            self.rebuild(source);
        }
    }

    fn rebuild<S: SearchSource + ?Sized>(&mut self, source: &S) {
        self.matches.clear();
        if !self.pattern.is_empty() {
            let needle = self.pattern.to_lowercase();
            for row in 0..source.row_count() {
                let columns = std::iter::once(FindColumn::Tag)
                    .chain((0..source.column_count()).map(FindColumn::Property));
                for column in columns {
                    let cell = CellRef { row, column };
                    if source.cell_text(cell).to_lowercase().contains(&needle) {
                        self.matches.insert(cell);
                    }
                }
            }
        }
        if self.current >= self.matches.len() {
            self.current = 0;
        }
        log::debug!(
            "find {:?}: {} matches",
            self.pattern,
            self.matches.len()
        );
    }

    /// Advance to the next match, wrapping. Needs at least two matches.
    pub fn next(&mut self) -> Option<CellRef> {
        if self.matches.len() < 2 {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.current_match()
    }

    /// Step back to the previous match, wrapping. Needs at least two matches.
    pub fn prev(&mut self) -> Option<CellRef> {
        let len = self.matches.len();
        if len < 2 {
            return None;
        }
        self.current = (self.current + len - 1) % len;
        self.current_match()
    }

    /// Hide the bar and drop all highlights. The pattern is kept for the next open.
    pub fn close(&mut self) {
        self.open = false;
        self.matches.clear();
        self.current = 0;
    }

    /// Focus left the find input. Closes the bar when focus landed on a non-editable
    /// table cell; returns whether it closed.
    pub fn focus_moved(&mut self, target: FocusTarget) -> bool {
        if !self.open {
            return false;
        }
        match target {
            FocusTarget::Cell { editable: false } => {
                self.close();
                true
            }
            FocusTarget::FindUi
            | FocusTarget::Cell { editable: true }
            | FocusTarget::Selector
            | FocusTarget::Outside => false,
        }
    }

    /// Matches in row-major, then column order.
    pub fn matches(&self) -> impl Iterator<Item = CellRef> + '_ {
        self.matches.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.matches.is_empty()).then_some(self.current)
    }

    pub fn current_match(&self) -> Option<CellRef> {
        self.matches.get_index(self.current).copied()
    }

    /// 1-based position of the current match, or 0 when there are none.
    pub fn position(&self) -> usize {
        if self.matches.is_empty() {
            0
        } else {
            self.current + 1
        }
    }

    /// The "n/m" text of the find bar.
    pub fn position_text(&self) -> String {
        format!("{}/{}", self.position(), self.matches.len())
    }

    pub fn is_found(&self, cell: CellRef) -> bool {
        self.matches.contains(&cell)
    }

    pub fn is_current(&self, cell: CellRef) -> bool {
        self.current_match() == Some(cell)
    }

    /// The cell the view should scroll into view.
    pub fn scroll_target(&self) -> Option<CellRef> {
        self.current_match()
    }
}
