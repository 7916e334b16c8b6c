//! Core library for an editable record-table view over decoded UE data-table exports.
//! Renders typed columns, tracks dirty/invalid state per cell and per array element,
//! extracts sparse patches for write-back, and drives an in-table find bar.

mod config;
mod diff;
mod editor;
mod export;
mod find;
mod package;
mod property;
mod session;
pub mod statics;
mod table;
mod text;
mod validation;
mod value;

pub use config::EditorConfig;
pub use diff::{ExtractOptions, extract_entries};
pub use editor::{
    ActiveEditor, CellContent, CellEditor, CellState, ChoiceOption, Direction, EditError,
    NameChoice, TableView,
};
pub use export::to_delimited;
pub use find::{CellRef, FindColumn, FindIndex, FocusTarget, SearchSource};
pub use package::{
    DecodedPackage, DumpFormat, OriginalEntry, PackageError, SparseEntry, parse_patch,
    patch_to_json5, read_text, write_patch,
};
pub use property::{PropertyDescriptor, PropertyType};
pub use session::EditorSession;
pub use table::{CellKey, RecordTable};
pub use text::{CellView, DisplayMode, TextResources};
pub use validation::{ValidationError, parse_number, validate_numeric};
pub use value::{PatchValue, Scalar, Value, format_float};
