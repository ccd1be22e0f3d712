//! Progress events written by the backend during `import_docs`

use serde::{Deserialize, Serialize};

/// Import phase reported by a progress line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Started,
    #[serde(alias = "processing")]
    Progress,
    #[serde(alias = "imported", alias = "dry_run")]
    Done,
    Failed,
}

impl ProgressStatus {
    /// No more events follow a terminal one
    pub fn is_terminal(self) -> bool {
        matches!(self, ProgressStatus::Done | ProgressStatus::Failed)
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Started => write!(f, "STARTED"),
            ProgressStatus::Progress => write!(f, "PROGRESS"),
            ProgressStatus::Done => write!(f, "DONE"),
            ProgressStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One structured status update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub inserted: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub skipped: u64,
}

/// A line read from the progress file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressLine {
    Event(ProgressEvent),
    /// Anything that did not parse, echoed as-is
    Raw(String),
}

impl ProgressLine {
    /// Parse one line. Blank lines yield nothing.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<ProgressEvent>(line) {
            Ok(event) => Some(ProgressLine::Event(event)),
            Err(_) => Some(ProgressLine::Raw(line.to_string())),
        }
    }

    pub fn event(&self) -> Option<&ProgressEvent> {
        match self {
            ProgressLine::Event(e) => Some(e),
            ProgressLine::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressLine::Event(e) => write!(
                f,
                "[import] {} {}/{} inserted={} updated={} skipped={}",
                e.status, e.processed, e.total, e.inserted, e.updated, e.skipped
            ),
            ProgressLine::Raw(line) => write!(f, "[import] {}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event() {
        let line = ProgressLine::parse(
            r#"{"status":"progress","processed":3,"total":10,"inserted":2,"updated":1,"skipped":0}"#,
        )
        .unwrap();

        assert_eq!(
            line,
            ProgressLine::Event(ProgressEvent {
                status: ProgressStatus::Progress,
                processed: 3,
                total: 10,
                inserted: 2,
                updated: 1,
                skipped: 0,
            })
        );
        assert_eq!(
            line.to_string(),
            "[import] PROGRESS 3/10 inserted=2 updated=1 skipped=0"
        );
    }

    #[test]
    fn test_backend_status_aliases() {
        let status = |s: &str| {
            ProgressLine::parse(&format!(r#"{{"status":"{}"}}"#, s))
                .and_then(|l| l.event().map(|e| e.status))
        };
        assert_eq!(status("processing"), Some(ProgressStatus::Progress));
        assert_eq!(status("imported"), Some(ProgressStatus::Done));
        assert_eq!(status("dry_run"), Some(ProgressStatus::Done));
        assert_eq!(status("failed"), Some(ProgressStatus::Failed));
        assert_eq!(status("started"), Some(ProgressStatus::Started));
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let line = ProgressLine::parse(r#"{"status":"started"}"#).unwrap();
        let event = line.event().unwrap();
        assert_eq!(event.total, 0);
        assert_eq!(event.processed, 0);
    }

    #[test]
    fn test_malformed_lines_are_echoed() {
        assert_eq!(
            ProgressLine::parse("  scanning archive...  "),
            Some(ProgressLine::Raw("scanning archive...".to_string()))
        );
        assert_eq!(
            ProgressLine::parse(r#"{"status":"exploded"}"#),
            Some(ProgressLine::Raw(r#"{"status":"exploded"}"#.to_string()))
        );
        assert_eq!(
            ProgressLine::parse("oops").unwrap().to_string(),
            "[import] oops"
        );
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        assert_eq!(ProgressLine::parse(""), None);
        assert_eq!(ProgressLine::parse("   \r"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ProgressStatus::Done.is_terminal());
        assert!(ProgressStatus::Failed.is_terminal());
        assert!(!ProgressStatus::Started.is_terminal());
        assert!(!ProgressStatus::Progress.is_terminal());
    }
}
