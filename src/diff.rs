use crate::editor::{CellContent, CellEditor};
use crate::package::SparseEntry;
use crate::property::PropertyType;
use crate::table::{CellKey, RecordTable};
use crate::validation::parse_number;
use crate::value::{PatchValue, Scalar};

/// What to pull out of the live table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Only dirty fields/elements (a save patch) instead of every field (an export).
    pub dirty_only: bool,
}

impl ExtractOptions {
    pub const SAVE: Self = Self { dirty_only: true };
    pub const EXPORT: Self = Self { dirty_only: false };
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::SAVE
    }
}

/// Walk the live table and build one sparse entry per row.
///
/// Any open editor is committed first, so the walk always sees the latest value.
/// Invalid values are exported as-is; unparseable numeric text becomes `NaN`.
pub fn extract_entries(
    table: &RecordTable,
    editor: &mut CellEditor,
    options: ExtractOptions,
) -> Vec<SparseEntry> {
    editor.blur(table);

    let mut entries = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let mut entry = SparseEntry::new(table.tag(row).unwrap_or_default());

        for (column, desc) in table.columns().iter().enumerate() {
            let value = if desc.is_array {
                extract_array(editor, desc.ty, row, column, options).map(PatchValue::Array)
            } else {
                editor
                    .cell(CellKey::scalar(row, column))
                    .filter(|cell| !options.dirty_only || cell.dirty)
                    .map(|cell| PatchValue::Scalar(native_value(desc.ty, &cell.content)))
            };
            if let Some(value) = value {
                entry.fields.insert(desc.name.clone(), value);
            }
        }

        entries.push(entry);
    }

    log::info!(
        "extracted {} entries ({} fields, dirty_only={})",
        entries.len(),
        entries.iter().map(|e| e.fields.len()).sum::<usize>(),
        options.dirty_only
    );
    entries
}

/// Dirty-only arrays keep the original length with only the dirty positions set, and
/// are omitted entirely when nothing is dirty.
fn extract_array(
    editor: &CellEditor,
    ty: PropertyType,
    row: usize,
    column: usize,
    options: ExtractOptions,
) -> Option<Vec<Option<Scalar>>> {
    let mut values = vec![None; editor.element_count(row, column)];
    let mut any = false;
    for (i, slot) in values.iter_mut().enumerate() {
        let Some(cell) = editor.cell(CellKey::element(row, column, i)) else {
            continue;
        };
        if options.dirty_only && !cell.dirty {
            continue;
        }
        *slot = Some(native_value(ty, &cell.content));
        any = true;
    }
    (any || !options.dirty_only).then_some(values)
}

/// Convert committed content back to the property's native representation.
fn native_value(ty: PropertyType, content: &CellContent) -> Scalar {
    match content {
        CellContent::Numeric(text) => Scalar::from_number(
            parse_number(text).unwrap_or(f64::NAN),
            ty == PropertyType::Float,
        ),
        CellContent::Text(raw) | CellContent::Name(raw) => Scalar::Text(raw.clone()),
        // Opaque kinds are written back exactly as they were decoded.
        CellContent::Inert(value) => value.clone(),
    }
}
