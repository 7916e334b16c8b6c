use crate::property::PropertyDescriptor;
use crate::statics;
use crate::value::{PatchValue, Scalar, Value, write_escaped_string};
use anyhow::Context;
use flate2::{Compression, GzBuilder, read::GzDecoder};
use indexmap::IndexMap;
use serde::Deserialize;
use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Json,
    GzipJson,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageError {
    #[error("entry has no `$tag`")]
    MissingTag,
    #[error("entry `$tag` is not a string")]
    TagNotText,
}

/// An immutable row as loaded. Every non-array column is expected to be present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "IndexMap<String, Value>")]
pub struct OriginalEntry {
    pub tag: String,
    pub fields: IndexMap<String, Value>,
}

impl OriginalEntry {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl TryFrom<IndexMap<String, Value>> for OriginalEntry {
    type Error = PackageError;

    fn try_from(mut fields: IndexMap<String, Value>) -> Result<Self, Self::Error> {
        let tag = match fields.shift_remove(statics::KEY_TAG) {
            Some(Value::Scalar(Scalar::Text(tag))) => tag,
            Some(_) => return Err(PackageError::TagNotText),
            None => return Err(PackageError::MissingTag),
        };
        Ok(Self { tag, fields })
    }
}

/// A row as a sparse patch: `$tag` plus only the fields that are being written back.
/// The consumer treats an omitted field as "keep original".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "IndexMap<String, PatchValue>")]
pub struct SparseEntry {
    pub tag: String,
    pub fields: IndexMap<String, PatchValue>,
}

impl SparseEntry {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PatchValue> {
        self.fields.get(name)
    }

    /// True when the entry carries nothing but its tag.
    pub fn is_unchanged(&self) -> bool {
        self.fields.is_empty()
    }

    fn write_json5(&self, out: &mut String) {
        out.push('{');
        write_escaped_string(out, statics::KEY_TAG);
        out.push_str(": ");
        write_escaped_string(out, &self.tag);
        for (k, v) in &self.fields {
            out.push_str(", ");
            write_escaped_string(out, k);
            out.push_str(": ");
            v.write_json5(out);
        }
        out.push('}');
    }
}

impl TryFrom<IndexMap<String, PatchValue>> for SparseEntry {
    type Error = PackageError;

    fn try_from(mut fields: IndexMap<String, PatchValue>) -> Result<Self, Self::Error> {
        let tag = match fields.shift_remove(statics::KEY_TAG) {
            Some(PatchValue::Scalar(Scalar::Text(tag))) => tag,
            Some(_) => return Err(PackageError::TagNotText),
            None => return Err(PackageError::MissingTag),
        };
        Ok(Self { tag, fields })
    }
}

/// Serialize a patch list as JSON5, one entry per line.
pub fn patch_to_json5(entries: &[SparseEntry]) -> String {
    let mut out = String::from("[");
    for (i, entry) in entries.iter().enumerate() {
        out.push_str("\n    ");
        entry.write_json5(&mut out);
        if i + 1 != entries.len() {
            out.push(',');
        }
    }
    if !entries.is_empty() {
        out.push('\n');
    }
    out.push_str("]\n");
    out
}

pub fn parse_patch(text: &str) -> anyhow::Result<Vec<SparseEntry>> {
    Ok(json5::from_str::<Vec<SparseEntry>>(text)?)
}

/// The decoded package the external loader hands over.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPackage {
    #[serde(default)]
    pub filename: String,
    #[serde(alias = "props")]
    pub columns: Vec<PropertyDescriptor>,
    #[serde(alias = "entries", alias = "originalRows")]
    pub rows: Vec<OriginalEntry>,
    #[serde(default, alias = "names")]
    pub name_set: Vec<String>,
}

impl DecodedPackage {
    pub fn parse_json5(text: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str::<DecodedPackage>(text)?)
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let text = read_text(path)?;
        let mut package =
            Self::parse_json5(&text).with_context(|| format!("parsing package {path:?}"))?;
        if package.filename.is_empty() {
            package.filename = path.to_string_lossy().into_owned();
        }
        log::info!(
            "loaded package dump {path:?}: {} columns, {} rows, {} names",
            package.columns.len(),
            package.rows.len(),
            package.name_set.len()
        );
        Ok(package)
    }

    /// File name without directories, for titles and notices.
    pub fn display_name(&self) -> &str {
        basename(&self.filename)
    }
}

pub(crate) fn basename(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
}

/// Read a JSON/JSON5 dump from disk, transparently gunzipping `.gz` files.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {path:?}"))?;
    let text_bytes = match detect_format(path, &bytes) {
        DumpFormat::Json => bytes,
        DumpFormat::GzipJson => {
            let mut decoder = GzDecoder::new(&bytes[..]);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).context("gzip decompress")?;
            out
        }
    };
    String::from_utf8(text_bytes).context("dump is not valid UTF-8")
}

/// Write a patch list next to the package; `.gz` paths are gzip-compressed.
pub fn write_patch(path: &Path, entries: &[SparseEntry]) -> anyhow::Result<()> {
    let text = patch_to_json5(entries);
    let bytes = if path.extension().and_then(|e| e.to_str()) == Some(statics::EXT_GZ) {
        let mut encoder = GzBuilder::new()
            .mtime(0)
            .write(Vec::new(), Compression::default());
        encoder
            .write_all(text.as_bytes())
            .context("gzip compress")?;
        encoder.finish().context("gzip finish")?
    } else {
        text.into_bytes()
    };
    fs::write(path, &bytes).with_context(|| format!("writing {path:?}"))?;
    log::info!("wrote {} patch entries to {path:?}", entries.len());
    Ok(())
}

fn detect_format(path: &Path, bytes: &[u8]) -> DumpFormat {
    if path.extension().and_then(|e| e.to_str()) == Some(statics::EXT_GZ) {
        return DumpFormat::GzipJson;
    }
    if bytes.starts_with(&statics::GZIP_MAGIC) {
        return DumpFormat::GzipJson;
    }
    DumpFormat::Json
}
