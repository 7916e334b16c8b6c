use crate::package;
use anyhow::Context;
use serde::Deserialize;
use std::{collections::HashMap, path::Path};

/// Global rendering toggle: show raw identifiers or their resolved display text.
/// Only affects rendering, never stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Ids,
    #[default]
    Values,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Ids => DisplayMode::Values,
            DisplayMode::Values => DisplayMode::Ids,
        }
    }
}

/// Read-only identifier -> display string lookup used purely for presentation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TextResources {
    entries: HashMap<String, String>,
}

impl TextResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_json5(text: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str::<TextResources>(text)?)
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let text = package::read_text(path)?;
        Self::parse_json5(&text).with_context(|| format!("parsing text resources {path:?}"))
    }

    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project a raw STRING/NAME value to its display form.
    pub fn view(&self, raw: &str) -> CellView {
        match self.resolve(raw) {
            Some(text) => CellView::Resolved {
                id: raw.to_string(),
                text: text.to_string(),
            },
            None => CellView::Plain(raw.to_string()),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TextResources {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// How a cell (or array element) is presented. A resolved pair shows one side and
/// carries the other as its tooltip, depending on the display mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellView {
    Plain(String),
    Resolved { id: String, text: String },
}

impl CellView {
    pub fn display_text(&self, mode: DisplayMode) -> &str {
        match (self, mode) {
            (CellView::Plain(s), _) => s,
            (CellView::Resolved { id, .. }, DisplayMode::Ids) => id,
            (CellView::Resolved { text, .. }, DisplayMode::Values) => text,
        }
    }

    pub fn tooltip(&self, mode: DisplayMode) -> Option<&str> {
        match (self, mode) {
            (CellView::Plain(_), _) => None,
            (CellView::Resolved { text, .. }, DisplayMode::Ids) => Some(text),
            (CellView::Resolved { id, .. }, DisplayMode::Values) => Some(id),
        }
    }
}
