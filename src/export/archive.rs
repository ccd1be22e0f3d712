//! Tar export layout
//!
//! ```text
//! docs.json                  full document list
//! meta.json                  {created_at, doc_count, format, version}
//! versions.json              only when some doc has versions
//! docs/<slug>-<id>.md        one per doc with a body
//! ```

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tar::{Builder, Header};

use super::{DocVersion, ExportDoc, ExportError};

const SLUG_MAX_LEN: usize = 40;
const ENTRY_MODE: u32 = 0o600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMeta {
    pub created_at: String,
    pub doc_count: usize,
    pub format: String,
    pub version: String,
}

impl ArchiveMeta {
    pub fn new(doc_count: usize, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            doc_count,
            format: "json".to_string(),
            version: "1".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DocVersions<'a> {
    doc_id: &'a str,
    versions: &'a [DocVersion],
}

/// Lowercase, map anything outside `[a-z0-9-_]` to `-`, cap at 40 chars.
/// A slug with no usable character at all becomes `doc`.
pub fn sanitize_slug(slug: &str) -> String {
    let mut kept_any = false;
    let cleaned: String = slug
        .chars()
        .flat_map(char::to_lowercase)
        .take(SLUG_MAX_LEN)
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => {
                kept_any = true;
                c
            }
            _ => '-',
        })
        .collect();

    if kept_any {
        cleaned
    } else {
        "doc".to_string()
    }
}

/// Archive path of a document's content file
pub fn doc_entry_name(id: &str, slug: &str) -> String {
    format!("docs/{}-{}.md", sanitize_slug(slug), id)
}

/// Write the archive stamped with the current time
pub fn write_archive<W: Write>(out: W, docs: &[ExportDoc]) -> Result<W, ExportError> {
    write_archive_at(out, docs, Utc::now())
}

/// Write the archive and hand back the underlying writer
pub fn write_archive_at<W: Write>(
    out: W,
    docs: &[ExportDoc],
    created_at: DateTime<Utc>,
) -> Result<W, ExportError> {
    let content: Vec<(String, &str)> = docs
        .iter()
        .filter_map(|doc| doc.content().map(|body| (doc_entry_name(&doc.id, &doc.slug), body)))
        .collect();

    let mut seen = HashSet::with_capacity(content.len());
    for (name, _) in &content {
        if !seen.insert(name.as_str()) {
            return Err(ExportError::DuplicateEntry { name: name.clone() });
        }
    }

    let mtime = u64::try_from(created_at.timestamp()).unwrap_or(0);
    let mut builder = Builder::new(out);

    let docs_json = serde_json::to_vec_pretty(docs)?;
    append(&mut builder, "docs.json", &docs_json, mtime)?;

    let meta = serde_json::to_vec_pretty(&ArchiveMeta::new(docs.len(), created_at))?;
    append(&mut builder, "meta.json", &meta, mtime)?;

    let versions: Vec<DocVersions<'_>> = docs
        .iter()
        .filter_map(|doc| {
            doc.version_list().map(|versions| DocVersions {
                doc_id: &doc.id,
                versions,
            })
        })
        .collect();
    if !versions.is_empty() {
        let versions_json = serde_json::to_vec_pretty(&versions)?;
        append(&mut builder, "versions.json", &versions_json, mtime)?;
    }

    for (name, body) in &content {
        append(&mut builder, name, body.as_bytes(), mtime)?;
    }

    Ok(builder.into_inner()?)
}

fn append<W: Write>(builder: &mut Builder<W>, name: &str, data: &[u8], mtime: u64) -> Result<(), ExportError> {
    let mut header = Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(ENTRY_MODE);
    header.set_mtime(mtime);
    builder.append_data(&mut header, name, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::TimeZone;
    use serde_json::Value;
    use std::io::Read;

    fn entries(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
        let mut archive = tar::Archive::new(bytes);
        let mut out = Vec::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            out.push((name, data));
        }
        Ok(out)
    }

    fn build(docs: &[ExportDoc]) -> Result<Vec<(String, Vec<u8>)>> {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let bytes = write_archive_at(Vec::new(), docs, at)?;
        entries(&bytes)
    }

    fn names(entries: &[(String, Vec<u8>)]) -> Vec<&str> {
        entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn test_two_doc_archive() -> Result<()> {
        let docs = vec![
            ExportDoc::new("d1", "one", "One")
                .with_body("# One")
                .with_versions(vec![DocVersion::new("v1", "h1")]),
            ExportDoc::new("d2", "two", "Two").with_body("# Two"),
        ];
        let entries = build(&docs)?;

        assert_eq!(
            names(&entries),
            vec![
                "docs.json",
                "meta.json",
                "versions.json",
                "docs/one-d1.md",
                "docs/two-d2.md"
            ]
        );

        let versions: Value = serde_json::from_slice(&entries[2].1)?;
        assert_eq!(
            versions,
            serde_json::json!([{"doc_id": "d1", "versions": [{"id": "v1", "hash": "h1"}]}])
        );
        assert_eq!(entries[3].1, b"# One");
        assert_eq!(entries[4].1, b"# Two");
        Ok(())
    }

    #[test]
    fn test_meta_counts_every_doc() -> Result<()> {
        let docs = vec![
            ExportDoc::new("a", "a", "A"),
            ExportDoc::new("b", "b", "B").with_body(""),
            ExportDoc::new("c", "c", "C").with_body("text"),
        ];
        let entries = build(&docs)?;
        let meta: ArchiveMeta = serde_json::from_slice(&entries[1].1)?;

        assert_eq!(meta.doc_count, 3);
        assert_eq!(meta.created_at, "2024-05-01T12:00:00Z");
        assert_eq!(meta.format, "json");
        assert_eq!(meta.version, "1");
        Ok(())
    }

    #[test]
    fn test_no_versions_entry_without_versions() -> Result<()> {
        let docs = vec![
            ExportDoc::new("a", "a", "A").with_versions(Vec::new()),
            ExportDoc::new("b", "b", "B"),
        ];
        let entries = build(&docs)?;
        assert_eq!(names(&entries), vec!["docs.json", "meta.json"]);
        Ok(())
    }

    #[test]
    fn test_versions_lists_only_docs_that_have_them() -> Result<()> {
        let docs = vec![
            ExportDoc::new("a", "a", "A").with_versions(vec![DocVersion::new("v1", "h1")]),
            ExportDoc::new("b", "b", "B").with_versions(Vec::new()),
            ExportDoc::new("c", "c", "C").with_versions(vec![
                DocVersion::new("v2", "h2"),
                DocVersion::new("v3", "h3"),
            ]),
        ];
        let entries = build(&docs)?;
        let versions: Vec<Value> = serde_json::from_slice(&entries[2].1)?;

        let ids: Vec<&str> = versions.iter().filter_map(|v| v["doc_id"].as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(versions[1]["versions"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[test]
    fn test_entry_headers() -> Result<()> {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let bytes = write_archive_at(Vec::new(), &[ExportDoc::new("a", "a", "A")], at)?;
        let mut archive = tar::Archive::new(bytes.as_slice());
        for entry in archive.entries()? {
            let entry = entry?;
            assert_eq!(entry.header().mode()?, 0o600);
            assert_eq!(entry.header().mtime()?, at.timestamp() as u64);
        }
        Ok(())
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let docs = vec![
            ExportDoc::new("d1", "Same", "A").with_body("a"),
            ExportDoc::new("d1", "same", "B").with_body("b"),
        ];
        let err = write_archive(Vec::new(), &docs).unwrap_err();
        assert!(matches!(err, ExportError::DuplicateEntry { name } if name == "docs/same-d1.md"));
    }

    #[test]
    fn test_distinct_ids_can_share_an_entry_name() {
        let docs = vec![
            ExportDoc::new("b-c", "a", "A").with_body("a"),
            ExportDoc::new("c", "a-b", "B").with_body("b"),
        ];
        let err = write_archive(Vec::new(), &docs).unwrap_err();
        assert!(matches!(err, ExportError::DuplicateEntry { name } if name == "docs/a-b-c.md"));

        // Without a body there is no content entry to clash
        let docs = vec![
            ExportDoc::new("b-c", "a", "A").with_body("a"),
            ExportDoc::new("c", "a-b", "B"),
        ];
        assert!(write_archive(Vec::new(), &docs).is_ok());
    }

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("Hello World!"), "hello-world-");
        assert_eq!(sanitize_slug("notes/2024_q1"), "notes-2024_q1");
        assert_eq!(sanitize_slug(""), "doc");
        assert_eq!(sanitize_slug("a".repeat(60).as_str()).len(), 40);
        assert_eq!(sanitize_slug("Ünïcode"), "-n-code");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let long = "Z".repeat(80);
        for slug in ["Hello World!", "x/y/z", "", "🦀🦀", "a!", "already-clean_1", long.as_str()] {
            let once = sanitize_slug(slug);
            assert_eq!(sanitize_slug(&once), once, "slug {:?}", slug);
        }
    }

    #[test]
    fn test_empty_or_all_invalid_slug_is_doc() {
        assert_eq!(sanitize_slug("!!!"), "doc");
        assert_eq!(sanitize_slug("日本語"), "doc");
        assert_eq!(sanitize_slug("---"), "---");
        assert_eq!(doc_entry_name("d7", ""), "docs/doc-d7.md");
        assert_eq!(doc_entry_name("d8", "?"), "docs/doc-d8.md");
    }
}
