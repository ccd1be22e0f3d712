//! Append-only file tailing
//!
//! The cursor only moves forward. Bytes after the last newline are kept in
//! memory until the rest of the line shows up, so a poll that lands in the
//! middle of a write never yields half a line.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    offset: u64,
    pending: Vec<u8>,
}

impl LogTail {
    /// Tail `path` from its first byte
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            pending: Vec::new(),
        }
    }

    /// Tail `path` starting after whatever it holds right now
    pub async fn from_end(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let offset = tokio::fs::metadata(&path).await?.len();
        Ok(Self {
            path,
            offset,
            pending: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes consumed so far, including any held partial line
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read whatever was appended since the last poll and return the
    /// complete lines, without their newline.
    ///
    /// A missing file is treated as empty.
    pub async fn poll(&mut self) -> io::Result<Vec<String>> {
        let mut file = match File::open(&self.path).await {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let len = file.metadata().await?.len();
        if len < self.offset {
            tracing::debug!(path = %self.path.display(), len, offset = self.offset, "tailed file shrank, waiting for it to grow");
            return Ok(Vec::new());
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset)).await?;
        let mut chunk = Vec::with_capacity((len - self.offset) as usize);
        file.take(len - self.offset).read_to_end(&mut chunk).await?;
        self.offset += chunk.len() as u64;

        Ok(self.split_lines(&chunk))
    }

    /// Whatever trailing partial line is still held, if any
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    fn split_lines(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .collect()
    }
}
