use crate::package;
use crate::statics;
use crate::text::DisplayMode;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Host-level editor settings. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Initial display mode; the session keeps it across package loads.
    pub display_mode: DisplayMode,
    /// Joins array elements in rendered and exported text.
    pub array_delimiter: String,
    pub export_delimiter: char,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            array_delimiter: statics::DEFAULT_ARRAY_DELIMITER.to_string(),
            export_delimiter: statics::DEFAULT_EXPORT_DELIMITER,
        }
    }
}

impl EditorConfig {
    pub fn parse_json5(text: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str::<EditorConfig>(text)?)
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let text = package::read_text(path)?;
        let config =
            Self::parse_json5(&text).with_context(|| format!("parsing config {path:?}"))?;
        log::info!("loaded editor config {path:?}");
        Ok(config)
    }
}
