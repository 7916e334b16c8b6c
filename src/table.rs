use crate::package::{self, DecodedPackage, OriginalEntry, SparseEntry};
use crate::property::{PropertyDescriptor, PropertyType};
use crate::value::{PatchValue, Scalar, Value};
use std::collections::HashMap;

/// Address of one editable unit: a scalar cell, or one element of an array cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: usize,
    pub column: usize,
    pub element: Option<usize>,
}

impl CellKey {
    pub fn scalar(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            element: None,
        }
    }

    pub fn element(row: usize, column: usize, index: usize) -> Self {
        Self {
            row,
            column,
            element: Some(index),
        }
    }
}

/// The loaded record table: column descriptors, immutable original rows, the name set,
/// and a sparse live overlay keyed by (row, column).
///
/// Column list and row count are fixed for the lifetime of the table; loading a new
/// package builds a new table.
#[derive(Debug, Clone)]
pub struct RecordTable {
    filename: String,
    columns: Vec<PropertyDescriptor>,
    originals: Vec<OriginalEntry>,
    names: Vec<String>,
    live_tags: Vec<String>,
    overrides: HashMap<(usize, usize), PatchValue>,
}

impl RecordTable {
    pub fn new(package: DecodedPackage) -> Self {
        let live_tags = package.rows.iter().map(|r| r.tag.clone()).collect();
        Self {
            filename: package.filename,
            columns: package.columns,
            originals: package.rows,
            names: package.name_set,
            live_tags,
            overrides: HashMap::new(),
        }
    }

    /// Build a table whose live rows start from a previously saved patch.
    /// Overlay entry `i` overlays original row `i`; unset array positions fall back
    /// to the original element.
    pub fn with_overlay(package: DecodedPackage, overlay: &[SparseEntry]) -> Self {
        let mut table = Self::new(package);
        if overlay.len() != table.row_count() {
            log::warn!(
                "overlay has {} entries for {} rows; extra entries are ignored",
                overlay.len(),
                table.row_count()
            );
        }

        for (row, entry) in overlay.iter().enumerate().take(table.row_count()) {
            table.live_tags[row] = entry.tag.clone();
            for (name, value) in &entry.fields {
                let Some(column) = table.column_index(name) else {
                    log::warn!("overlay row {row} names unknown column {name:?}");
                    continue;
                };
                let is_array = table.columns[column].is_array;
                match value {
                    PatchValue::Array(values) if is_array => {
                        let len = table.array_len(row, column);
                        if values.len() != len {
                            log::warn!(
                                "overlay row {row} column {name:?} has {} elements, original has {len}",
                                values.len()
                            );
                        }
                    }
                    PatchValue::Scalar(_) if !is_array => {}
                    _ => {
                        log::warn!("overlay row {row} column {name:?} does not match its shape");
                        continue;
                    }
                }
                table.overrides.insert((row, column), value.clone());
            }
        }

        table
    }

    pub fn display_name(&self) -> &str {
        package::basename(&self.filename)
    }

    pub fn columns(&self) -> &[PropertyDescriptor] {
        &self.columns
    }

    pub fn column(&self, column: usize) -> Option<&PropertyDescriptor> {
        self.columns.get(column)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn property_type(&self, column: usize) -> Option<PropertyType> {
        self.columns.get(column).map(|c| c.ty)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.originals.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// `$tag` of the live row.
    pub fn tag(&self, row: usize) -> Option<&str> {
        self.live_tags.get(row).map(String::as_str)
    }

    fn original_field(&self, row: usize, column: usize) -> Option<&Value> {
        let name = &self.columns.get(column)?.name;
        self.originals.get(row)?.get(name)
    }

    pub fn original_scalar(&self, row: usize, column: usize) -> Option<&Scalar> {
        self.original_field(row, column)?.as_scalar()
    }

    pub fn original_element(&self, row: usize, column: usize, index: usize) -> Option<&Scalar> {
        self.original_field(row, column)?.as_array()?.get(index)
    }

    /// Length of an array cell. Live rows never change it.
    pub fn array_len(&self, row: usize, column: usize) -> usize {
        self.original_field(row, column)
            .and_then(Value::as_array)
            .map_or(0, <[Scalar]>::len)
    }

    pub fn effective_scalar(&self, row: usize, column: usize) -> Option<&Scalar> {
        match self.overrides.get(&(row, column)) {
            Some(PatchValue::Scalar(s)) => Some(s),
            _ => self.original_scalar(row, column),
        }
    }

    pub fn effective_element(&self, row: usize, column: usize, index: usize) -> Option<&Scalar> {
        if index >= self.array_len(row, column) {
            return None;
        }
        match self.overrides.get(&(row, column)) {
            Some(PatchValue::Array(values)) => match values.get(index) {
                Some(Some(s)) => Some(s),
                _ => self.original_element(row, column, index),
            },
            _ => self.original_element(row, column, index),
        }
    }

    /// Text of the original value at `key`, the reference for dirty checks.
    /// A missing field compares as empty text.
    pub fn original_text(&self, key: CellKey) -> String {
        let original = match key.element {
            Some(index) => self.original_element(key.row, key.column, index),
            None => self.original_scalar(key.row, key.column),
        };
        original.map(ToString::to_string).unwrap_or_default()
    }
}
