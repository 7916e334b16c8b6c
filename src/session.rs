use crate::config::EditorConfig;
use crate::diff::{ExtractOptions, extract_entries};
use crate::editor::{ActiveEditor, CellEditor, CellState, Direction, EditError, TableView};
use crate::export;
use crate::find::{CellRef, FindIndex, FocusTarget, SearchSource};
use crate::package::{self, DecodedPackage, SparseEntry};
use crate::statics;
use crate::table::{CellKey, RecordTable};
use crate::text::{DisplayMode, TextResources};
use std::path::Path;

struct Document {
    table: RecordTable,
    editor: CellEditor,
}

impl Document {
    fn new(table: RecordTable) -> Self {
        let editor = CellEditor::render(&table);
        Self { table, editor }
    }
}

/// Stand-in search source while nothing is loaded.
struct NoRows;

impl SearchSource for NoRows {
    fn row_count(&self) -> usize {
        0
    }

    fn column_count(&self) -> usize {
        0
    }

    fn cell_text(&self, _cell: CellRef) -> String {
        String::new()
    }
}

/// The editor's single owner of the current package.
///
/// Loading replaces table, cell states and find results in one step; the display mode
/// and text resources survive a load.
pub struct EditorSession {
    config: EditorConfig,
    resources: TextResources,
    display_mode: DisplayMode,
    document: Option<Document>,
    find: FindIndex,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default(), TextResources::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig, resources: TextResources) -> Self {
        Self {
            display_mode: config.display_mode,
            config,
            resources,
            document: None,
            find: FindIndex::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn resources(&self) -> &TextResources {
        &self.resources
    }

    pub fn set_resources(&mut self, resources: TextResources) {
        log::info!("text resources replaced: {} entries", resources.len());
        self.resources = resources;
        self.refresh_find();
    }

    pub fn load(&mut self, package: DecodedPackage) {
        self.replace(RecordTable::new(package));
    }

    /// Load a package whose live rows start from a previously saved patch.
    pub fn load_with_overlay(&mut self, package: DecodedPackage, overlay: &[SparseEntry]) {
        self.replace(RecordTable::with_overlay(package, overlay));
    }

    pub fn load_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let package = DecodedPackage::load_path(path)?;
        self.load(package);
        Ok(())
    }

    fn replace(&mut self, table: RecordTable) {
        log::info!(
            "showing {:?}: {} rows x {} columns",
            table.display_name(),
            table.row_count(),
            table.column_count()
        );
        self.document = Some(Document::new(table));
        self.find.close();
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn table(&self) -> Option<&RecordTable> {
        self.document.as_ref().map(|d| &d.table)
    }

    pub fn editor(&self) -> Option<&CellEditor> {
        self.document.as_ref().map(|d| &d.editor)
    }

    pub fn cell(&self, key: CellKey) -> Option<&CellState> {
        self.editor()?.cell(key)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Re-renders STRING/NAME cells. Stored values and dirty flags are untouched.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.display_mode == mode {
            return;
        }
        self.display_mode = mode;
        self.refresh_find();
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.set_display_mode(self.display_mode.toggled());
        self.display_mode
    }

    pub fn view(&self) -> Option<TableView<'_>> {
        let doc = self.document.as_ref()?;
        Some(doc.editor.view(
            &doc.table,
            &self.resources,
            self.display_mode,
            &self.config.array_delimiter,
        ))
    }

    /// Window title: the package file name followed by the app name and version.
    pub fn title(&self) -> String {
        let app = format!(
            "{} v{}",
            env!("CARGO_PKG_DESCRIPTION"),
            env!("CARGO_PKG_VERSION")
        );
        match self.table() {
            Some(table) => format!("{} - {app}", table.display_name()),
            None => app,
        }
    }

    fn document_mut(&mut self) -> Result<&mut Document, EditError> {
        self.document.as_mut().ok_or(EditError::NothingLoaded)
    }

    pub fn focus(&mut self, key: CellKey) -> Result<&ActiveEditor, EditError> {
        let Self {
            document,
            resources,
            display_mode,
            ..
        } = self;
        let doc = document.as_mut().ok_or(EditError::NothingLoaded)?;
        doc.editor.focus(&doc.table, resources, *display_mode, key)
    }

    pub fn input(&mut self, text: &str) -> Result<(), EditError> {
        self.document_mut()?.editor.input(text)
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), EditError> {
        self.document_mut()?.editor.set_text(text)
    }

    pub fn select_name(&mut self, value: &str) -> Result<(), EditError> {
        self.document_mut()?.editor.select(value)
    }

    /// Commit whatever editor is open.
    pub fn blur(&mut self) -> Option<CellKey> {
        let doc = self.document.as_mut()?;
        doc.editor.blur(&doc.table)
    }

    pub fn navigate(&mut self, direction: Direction) -> Result<Option<&ActiveEditor>, EditError> {
        let Self {
            document,
            resources,
            display_mode,
            ..
        } = self;
        let doc = document.as_mut().ok_or(EditError::NothingLoaded)?;
        doc.editor
            .navigate(&doc.table, resources, *display_mode, direction)
    }

    fn extract(&mut self, options: ExtractOptions) -> Result<Vec<SparseEntry>, EditError> {
        let doc = self.document_mut()?;
        Ok(extract_entries(&doc.table, &mut doc.editor, options))
    }

    /// Sparse patch of dirty values only.
    pub fn save(&mut self) -> Result<Vec<SparseEntry>, EditError> {
        self.extract(ExtractOptions::SAVE)
    }

    /// Every field of every row.
    pub fn export(&mut self) -> Result<Vec<SparseEntry>, EditError> {
        self.extract(ExtractOptions::EXPORT)
    }

    pub fn export_delimited(&mut self) -> Result<String, EditError> {
        let entries = self.export()?;
        let table = self.table().ok_or(EditError::NothingLoaded)?;
        Ok(export::to_delimited(
            table.columns(),
            &entries,
            self.config.export_delimiter,
            &self.config.array_delimiter,
        ))
    }

    /// Write the save patch to `path` and return the notice to show.
    pub fn save_to_path(&mut self, path: &Path) -> anyhow::Result<String> {
        let entries = self.save()?;
        package::write_patch(path, &entries)?;
        let notice = self.saved_notice().unwrap_or_default();
        log::info!("{notice}");
        Ok(notice)
    }

    pub fn saved_notice(&self) -> Option<String> {
        let table = self.table()?;
        Some(format!(
            "{} {}",
            table.display_name(),
            statics::EN_TOAST_SAVED_SUFFIX
        ))
    }

    pub fn find(&self) -> &FindIndex {
        &self.find
    }

    fn find_parts(&mut self) -> (&mut FindIndex, Box<dyn SearchSource + '_>) {
        let source: Box<dyn SearchSource + '_> = match &self.document {
            Some(doc) => Box::new(doc.editor.view(
                &doc.table,
                &self.resources,
                self.display_mode,
                &self.config.array_delimiter,
            )),
            None => Box::new(NoRows),
        };
        (&mut self.find, source)
    }

    pub fn open_find(&mut self) {
        let (find, source) = self.find_parts();
        find.open(source.as_ref());
    }

    pub fn set_find_pattern(&mut self, pattern: &str) {
        let (find, source) = self.find_parts();
        find.set_pattern(pattern, source.as_ref());
    }

    fn refresh_find(&mut self) {
        let (find, source) = self.find_parts();
        find.refresh(source.as_ref());
    }

    pub fn find_next(&mut self) -> Option<CellRef> {
        self.find.next()
    }

    pub fn find_prev(&mut self) -> Option<CellRef> {
        self.find.prev()
    }

    /// Escape in the find input.
    pub fn close_find(&mut self) {
        self.find.close();
    }

    /// Focus left the find input for `target`; returns whether the bar closed.
    pub fn find_focus_moved(&mut self, target: FocusTarget) -> bool {
        self.find.focus_moved(target)
    }

    /// Classify a table cell as a focus target.
    pub fn focus_target(&self, key: CellKey) -> FocusTarget {
        match self.cell(key) {
            Some(cell) => FocusTarget::Cell {
                editable: cell.content.is_editable(),
            },
            None => FocusTarget::Outside,
        }
    }
}
