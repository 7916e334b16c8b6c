use crate::find::{CellRef, FindColumn, SearchSource};
use crate::property::PropertyType;
use crate::statics;
use crate::table::{CellKey, RecordTable};
use crate::text::{CellView, DisplayMode, TextResources};
use crate::validation::{ValidationError, validate_numeric};
use crate::value::Scalar;

/// Committed content of one cell or array element.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Numeric kinds: the committed text, exactly as typed.
    Numeric(String),
    /// STRING: raw identifier, read-only here.
    Text(String),
    /// NAME: raw value chosen from the name set.
    Name(String),
    /// Unrecognized kinds render as inert text and keep the stored value.
    Inert(Scalar),
}

impl CellContent {
    fn render(ty: PropertyType, value: Option<&Scalar>) -> Self {
        let text = || value.map(ToString::to_string).unwrap_or_default();
        match ty {
            PropertyType::String => CellContent::Text(text()),
            PropertyType::Name => CellContent::Name(text()),
            _ if ty.is_numeric() => CellContent::Numeric(text()),
            _ => CellContent::Inert(value.cloned().unwrap_or(Scalar::Text(String::new()))),
        }
    }

    pub fn view(&self, resources: &TextResources) -> CellView {
        match self {
            CellContent::Text(raw) | CellContent::Name(raw) => resources.view(raw),
            CellContent::Numeric(s) => CellView::Plain(s.clone()),
            CellContent::Inert(v) => CellView::Plain(v.to_string()),
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, CellContent::Numeric(_) | CellContent::Name(_))
    }
}

/// Live state of one cell or array element.
/// Dirty and validity are plain state; the host UI only projects them.
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub content: CellContent,
    pub dirty: bool,
    pub invalid: Option<ValidationError>,
}

impl CellState {
    fn new(content: CellContent) -> Self {
        Self {
            content,
            dirty: false,
            invalid: None,
        }
    }

    /// Tooltip: the invalid reason wins over the resolved-pair counterpart.
    pub fn tooltip(&self, resources: &TextResources, mode: DisplayMode) -> Option<String> {
        if let Some(err) = &self.invalid {
            return Some(err.to_string());
        }
        self.content
            .view(resources)
            .tooltip(mode)
            .map(str::to_owned)
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Scalar(CellState),
    Array(Vec<CellState>),
}

/// One entry of the NAME selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub tooltip: Option<String>,
}

/// Closed-choice selector over the name set, in name-set order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChoice {
    pub options: Vec<ChoiceOption>,
    pub selected: Option<usize>,
}

impl NameChoice {
    fn build(
        names: &[String],
        resources: &TextResources,
        mode: DisplayMode,
        current: &str,
    ) -> Self {
        let options = names
            .iter()
            .map(|name| {
                let view = resources.view(name);
                ChoiceOption {
                    value: name.clone(),
                    label: view.display_text(mode).to_string(),
                    tooltip: view.tooltip(mode).map(str::to_owned),
                }
            })
            .collect();
        Self {
            options,
            selected: names.iter().position(|n| n == current),
        }
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(|o| o.value.as_str())
    }
}

/// The editor currently holding focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveEditor {
    /// Numeric text editor. `select_all` means the next keystroke overwrites.
    Text {
        key: CellKey,
        buffer: String,
        select_all: bool,
    },
    Choice { key: CellKey, choice: NameChoice },
}

impl ActiveEditor {
    pub fn key(&self) -> CellKey {
        match self {
            ActiveEditor::Text { key, .. } | ActiveEditor::Choice { key, .. } => *key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no package is loaded")]
    NothingLoaded,
    #[error("no cell at row {}, column {}", .0.row, .0.column)]
    NoSuchCell(CellKey),
    #[error("cell at row {}, column {} is read-only", .0.row, .0.column)]
    ReadOnly(CellKey),
    #[error("{0:?} is not in the name set")]
    NotInNameSet(String),
    #[error("no cell is being edited")]
    NotEditing,
    #[error("the focused editor does not take this kind of input")]
    WrongEditor,
}

/// Live, editable projection of a [`RecordTable`]: one state per cell, or per element
/// for array columns, plus the editor that currently has focus.
#[derive(Debug, Clone)]
pub struct CellEditor {
    rows: Vec<Vec<Slot>>,
    active: Option<ActiveEditor>,
}

impl CellEditor {
    /// Render every cell from the table's live values. No cell starts dirty.
    pub fn render(table: &RecordTable) -> Self {
        let rows = (0..table.row_count())
            .map(|row| {
                table
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(column, desc)| {
                        if desc.is_array {
                            let len = table.array_len(row, column);
                            Slot::Array(
                                (0..len)
                                    .map(|i| {
                                        CellState::new(CellContent::render(
                                            desc.ty,
                                            table.effective_element(row, column, i),
                                        ))
                                    })
                                    .collect(),
                            )
                        } else {
                            Slot::Scalar(CellState::new(CellContent::render(
                                desc.ty,
                                table.effective_scalar(row, column),
                            )))
                        }
                    })
                    .collect()
            })
            .collect();

        Self { rows, active: None }
    }

    pub fn cell(&self, key: CellKey) -> Option<&CellState> {
        match (self.rows.get(key.row)?.get(key.column)?, key.element) {
            (Slot::Scalar(state), None) => Some(state),
            (Slot::Array(states), Some(i)) => states.get(i),
            _ => None,
        }
    }

    fn cell_mut(&mut self, key: CellKey) -> Option<&mut CellState> {
        match (self.rows.get_mut(key.row)?.get_mut(key.column)?, key.element) {
            (Slot::Scalar(state), None) => Some(state),
            (Slot::Array(states), Some(i)) => states.get_mut(i),
            _ => None,
        }
    }

    /// Number of elements rendered for an array cell.
    pub fn element_count(&self, row: usize, column: usize) -> usize {
        match self.rows.get(row).and_then(|r| r.get(column)) {
            Some(Slot::Array(states)) => states.len(),
            _ => 0,
        }
    }

    pub fn active(&self) -> Option<&ActiveEditor> {
        self.active.as_ref()
    }

    pub fn focused(&self) -> Option<CellKey> {
        self.active.as_ref().map(ActiveEditor::key)
    }

    pub fn is_dirty(&self, key: CellKey) -> bool {
        self.cell(key).is_some_and(|c| c.dirty)
    }

    pub fn dirty_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .map(|slot| match slot {
                Slot::Scalar(state) => usize::from(state.dirty),
                Slot::Array(states) => states.iter().filter(|s| s.dirty).count(),
            })
            .sum()
    }

    /// Focus a cell. Any editor already open is committed first.
    /// Numeric cells open with the whole text selected; NAME cells open the selector.
    pub fn focus(
        &mut self,
        table: &RecordTable,
        resources: &TextResources,
        mode: DisplayMode,
        key: CellKey,
    ) -> Result<&ActiveEditor, EditError> {
        self.blur(table);

        let cell = self.cell(key).ok_or(EditError::NoSuchCell(key))?;
        let editor = match &cell.content {
            CellContent::Numeric(text) => ActiveEditor::Text {
                key,
                buffer: text.clone(),
                select_all: true,
            },
            CellContent::Name(current) => ActiveEditor::Choice {
                key,
                choice: NameChoice::build(table.names(), resources, mode, current),
            },
            CellContent::Text(_) | CellContent::Inert(_) => return Err(EditError::ReadOnly(key)),
        };

        let editor: &ActiveEditor = self.active.insert(editor);
        Ok(editor)
    }

    /// Type into the focused numeric editor. A full selection is overwritten.
    pub fn input(&mut self, text: &str) -> Result<(), EditError> {
        match &mut self.active {
            Some(ActiveEditor::Text {
                buffer, select_all, ..
            }) => {
                if *select_all {
                    buffer.clear();
                    *select_all = false;
                }
                buffer.push_str(text);
                Ok(())
            }
            Some(ActiveEditor::Choice { .. }) => Err(EditError::WrongEditor),
            None => Err(EditError::NotEditing),
        }
    }

    /// Replace the whole buffer of the focused numeric editor.
    pub fn set_text(&mut self, text: &str) -> Result<(), EditError> {
        match &mut self.active {
            Some(ActiveEditor::Text {
                buffer, select_all, ..
            }) => {
                *buffer = text.to_string();
                *select_all = false;
                Ok(())
            }
            Some(ActiveEditor::Choice { .. }) => Err(EditError::WrongEditor),
            None => Err(EditError::NotEditing),
        }
    }

    /// Pick an option in the focused NAME selector.
    pub fn select(&mut self, value: &str) -> Result<(), EditError> {
        match &mut self.active {
            Some(ActiveEditor::Choice { choice, .. }) => {
                let index = choice
                    .options
                    .iter()
                    .position(|o| o.value == value)
                    .ok_or_else(|| EditError::NotInNameSet(value.to_string()))?;
                choice.selected = Some(index);
                Ok(())
            }
            Some(ActiveEditor::Text { .. }) => Err(EditError::WrongEditor),
            None => Err(EditError::NotEditing),
        }
    }

    /// Loss of focus: commit the open editor, if any. Returns the committed cell.
    pub fn blur(&mut self, table: &RecordTable) -> Option<CellKey> {
        let editor = self.active.take()?;
        let key = editor.key();
        match editor {
            ActiveEditor::Text { buffer, .. } => {
                self.commit_text(table, key, &buffer).ok();
            }
            ActiveEditor::Choice { choice, .. } => {
                // A value outside the name set has no option; keep it unless another was picked.
                if let Some(value) = choice.selected_value() {
                    self.apply_name(table, key, value).ok();
                }
            }
        }
        Some(key)
    }

    /// Commit text to a numeric cell. Dirty iff the text differs from the original text;
    /// a changed value is then validated, but never rejected.
    pub fn commit_text(
        &mut self,
        table: &RecordTable,
        key: CellKey,
        text: &str,
    ) -> Result<&CellState, EditError> {
        let ty = table
            .property_type(key.column)
            .ok_or(EditError::NoSuchCell(key))?;
        let original = table.original_text(key);
        let cell = self.cell_mut(key).ok_or(EditError::NoSuchCell(key))?;
        let CellContent::Numeric(current) = &mut cell.content else {
            return Err(EditError::ReadOnly(key));
        };

        *current = text.to_string();
        if text == original {
            cell.dirty = false;
            cell.invalid = None;
        } else {
            cell.dirty = true;
            cell.invalid = validate_numeric(ty, text).err();
        }
        log::debug!(
            "commit {key:?}: {text:?} dirty={} invalid={:?}",
            cell.dirty,
            cell.invalid
        );
        Ok(&*cell)
    }

    /// Commit a NAME value. It must come from the name set.
    pub fn commit_name(
        &mut self,
        table: &RecordTable,
        key: CellKey,
        value: &str,
    ) -> Result<&CellState, EditError> {
        if !table.names().iter().any(|n| n == value) {
            return Err(EditError::NotInNameSet(value.to_string()));
        }
        self.apply_name(table, key, value)
    }

    fn apply_name(
        &mut self,
        table: &RecordTable,
        key: CellKey,
        value: &str,
    ) -> Result<&CellState, EditError> {
        let original = table.original_text(key);
        let cell = self.cell_mut(key).ok_or(EditError::NoSuchCell(key))?;
        let CellContent::Name(current) = &mut cell.content else {
            return Err(EditError::ReadOnly(key));
        };

        *current = value.to_string();
        cell.dirty = value != original;
        cell.invalid = None;
        log::debug!("commit {key:?}: {value:?} dirty={}", cell.dirty);
        Ok(&*cell)
    }

    /// Move focus to the same column in the previous/next row. At the first/last row
    /// this is a no-op and the current editor stays open.
    pub fn navigate(
        &mut self,
        table: &RecordTable,
        resources: &TextResources,
        mode: DisplayMode,
        direction: Direction,
    ) -> Result<Option<&ActiveEditor>, EditError> {
        let from = self.focused().ok_or(EditError::NotEditing)?;
        let Some(target) = self.neighbor(table, from, direction) else {
            return Ok(None);
        };
        self.focus(table, resources, mode, target).map(Some)
    }

    /// Same column, adjacent row. Array elements keep their index, clamped to the
    /// target row's length.
    pub fn neighbor(&self, table: &RecordTable, key: CellKey, direction: Direction) -> Option<CellKey> {
        let row = match direction {
            Direction::Up => key.row.checked_sub(1)?,
            Direction::Down => Some(key.row + 1).filter(|r| *r < table.row_count())?,
        };
        let element = match key.element {
            Some(index) => {
                let len = self.element_count(row, key.column);
                if len == 0 {
                    return None;
                }
                Some(index.min(len - 1))
            }
            None => None,
        };
        Some(CellKey {
            row,
            column: key.column,
            element,
        })
    }

    pub fn view<'a>(
        &'a self,
        table: &'a RecordTable,
        resources: &'a TextResources,
        mode: DisplayMode,
        array_delimiter: &'a str,
    ) -> TableView<'a> {
        TableView {
            table,
            editor: self,
            resources,
            mode,
            array_delimiter,
        }
    }
}

/// Read-only rendering of the live table in the current display mode.
pub struct TableView<'a> {
    table: &'a RecordTable,
    editor: &'a CellEditor,
    resources: &'a TextResources,
    mode: DisplayMode,
    array_delimiter: &'a str,
}

impl TableView<'_> {
    pub fn header(&self) -> Vec<&str> {
        [statics::EN_COL_INDEX, statics::EN_COL_TAG]
            .into_iter()
            .chain(self.table.columns().iter().map(|c| c.name.as_str()))
            .collect()
    }

    /// Display text of one cell or element.
    pub fn text(&self, key: CellKey) -> Option<String> {
        let cell = self.editor.cell(key)?;
        Some(
            cell.content
                .view(self.resources)
                .display_text(self.mode)
                .to_string(),
        )
    }

    pub fn tooltip(&self, key: CellKey) -> Option<String> {
        self.editor.cell(key)?.tooltip(self.resources, self.mode)
    }

    /// Display text of a whole property cell; array elements are joined by the delimiter.
    pub fn property_text(&self, row: usize, column: usize) -> String {
        let Some(desc) = self.table.column(column) else {
            return String::new();
        };
        if desc.is_array {
            (0..self.editor.element_count(row, column))
                .filter_map(|i| self.text(CellKey::element(row, column, i)))
                .collect::<Vec<_>>()
                .join(self.array_delimiter)
        } else {
            self.text(CellKey::scalar(row, column)).unwrap_or_default()
        }
    }
}

impl SearchSource for TableView<'_> {
    fn row_count(&self) -> usize {
        self.table.row_count()
    }

    fn column_count(&self) -> usize {
        self.table.column_count()
    }

    fn cell_text(&self, cell: CellRef) -> String {
        match cell.column {
            FindColumn::Tag => self.table.tag(cell.row).unwrap_or_default().to_string(),
            FindColumn::Property(column) => self.property_text(cell.row, column),
        }
    }
}
