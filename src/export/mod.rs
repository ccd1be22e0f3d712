//! Export Archiver
//!
//! Turns an already-fetched `export_docs` result into json, jsonl or a tar
//! archive. Nothing in here touches the network.

mod archive;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use archive::{doc_entry_name, sanitize_slug, write_archive, write_archive_at, ArchiveMeta};

#[cfg(unix)]
const EXPORT_FILE_MODE: u32 = 0o644;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export write failed: {0}")]
    Io(#[from] io::Error),

    #[error("export encode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate archive entry {name}")]
    DuplicateEntry { name: String },

    #[error("failed to move export into place at {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Jsonl,
    Tar,
}

impl ExportFormat {
    /// Formats that only make sense as a file
    pub fn requires_destination(self) -> bool {
        matches!(self, ExportFormat::Jsonl | ExportFormat::Tar)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Jsonl => write!(f, "jsonl"),
            ExportFormat::Tar => write!(f, "tar"),
        }
    }
}

/// One document as returned by `export_docs`.
///
/// Fields the client does not interpret are kept in `extra` and written back
/// out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDoc {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<DocVersion>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExportDoc {
    pub fn new(id: impl Into<String>, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            title: title.into(),
            body: None,
            versions: None,
            extra: Map::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_versions(mut self, versions: Vec<DocVersion>) -> Self {
        self.versions = Some(versions);
        self
    }

    /// Body text, if there is any
    pub fn content(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }

    /// Versions, if there are any
    pub fn version_list(&self) -> Option<&[DocVersion]> {
        self.versions.as_deref().filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocVersion {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocVersion {
    pub fn new(id: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hash: Some(hash.into()),
            extra: Map::new(),
        }
    }
}

/// Whole sequence as one pretty-printed JSON array
pub fn write_json<W: Write>(mut out: W, docs: &[ExportDoc]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut out, docs)?;
    out.flush()?;
    Ok(())
}

/// One compact JSON object per line, written as it goes
pub fn write_jsonl<W: Write>(out: W, docs: &[ExportDoc]) -> Result<(), ExportError> {
    let mut out = BufWriter::new(out);
    for doc in docs {
        serde_json::to_writer(&mut out, doc)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Write `docs` to `out` in `format`
pub fn write_docs<W: Write>(out: W, docs: &[ExportDoc], format: ExportFormat) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => write_json(out, docs),
        ExportFormat::Jsonl => write_jsonl(out, docs),
        ExportFormat::Tar => write_archive(out, docs).map(|_| ()),
    }
}

/// Same as [`write_docs`], into memory
pub fn to_bytes(docs: &[ExportDoc], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_docs(&mut buf, docs, format)?;
    Ok(buf)
}

/// Write `docs` to `path`.
///
/// New files get mode 0644 less the umask; an existing file keeps its mode.
/// The data goes to a temp file next to `path` and is renamed over it only
/// once everything has been written, so a failure leaves whatever was at
/// `path` before untouched.
pub fn export_to_path(path: &Path, docs: &[ExportDoc], format: ExportFormat) -> Result<(), ExportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".agent-editor-export-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask, like any newly created file
        builder.permissions(fs::Permissions::from_mode(EXPORT_FILE_MODE));
    }
    let mut staged = builder.tempfile_in(dir)?;
    write_docs(staged.as_file_mut(), docs, format)?;

    // Replacing a file keeps its mode
    match fs::metadata(path) {
        Ok(existing) => staged.as_file().set_permissions(existing.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    staged.as_file().sync_all()?;

    staged.persist(path).map_err(|e| ExportError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    tracing::debug!(path = %path.display(), %format, docs = docs.len(), "export written");
    Ok(())
}

/// Parse an export back into documents. Used to check exports round-trip.
pub fn read_docs(bytes: &[u8], format: ExportFormat) -> Result<Vec<ExportDoc>, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::from_slice(bytes)?),
        ExportFormat::Jsonl => bytes
            .split(|&b| b == b'\n')
            .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
            .map(|line| serde_json::from_slice(line).map_err(ExportError::from))
            .collect(),
        ExportFormat::Tar => {
            let mut archive = tar::Archive::new(bytes);
            for entry in archive.entries()? {
                let entry = entry?;
                if &*entry.path()? == Path::new("docs.json") {
                    return Ok(serde_json::from_reader(entry)?);
                }
            }
            Err(ExportError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "archive has no docs.json",
            )))
        }
    }
}

/// Read an export file written by [`export_to_path`]
pub fn read_path(path: &Path, format: ExportFormat) -> Result<Vec<ExportDoc>, ExportError> {
    let bytes = fs::read(path)?;
    read_docs(&bytes, format)
}
