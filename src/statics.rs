// Central place for user-facing strings and other non-localized constants.
// Keep these out of editor/diff code to reduce duplication and make tweaks safer.

// Entry keys.
pub const KEY_TAG: &str = "$tag";

// Upstream exporter naming convention for array-valued properties.
pub const ARRAY_SUFFIX: &str = "_Array";

// Rendering.
pub const DEFAULT_ARRAY_DELIMITER: &str = ", ";
pub const DEFAULT_EXPORT_DELIMITER: char = ',';

// English UI strings (EN_ prefix to make future localization easier)
pub const EN_COL_INDEX: &str = "#";
pub const EN_COL_TAG: &str = "Tag";
pub const EN_TOAST_SAVED_SUFFIX: &str = "has been saved.";

// Number spellings shared by the parser and the renderer.
pub const LIT_INFINITY: &str = "Infinity";
pub const LIT_NAN: &str = "NaN";
pub const LIT_NULL: &str = "null";

// Gzip magic: 1F 8B
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
pub const EXT_GZ: &str = "gz";
