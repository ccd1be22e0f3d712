//! Import progress telemetry
//!
//! While `import_docs` runs the backend appends one JSON object per line to
//! a file we name in the call. This module tails that file and renders each
//! line on stderr.

pub mod event;
pub mod streamer;
pub mod tail;

pub use event::{ProgressEvent, ProgressLine, ProgressStatus};
pub use streamer::{
    spawn_renderer, ProgressLog, ProgressSession, ProgressStreamer, StreamSummary, StreamerConfig,
};
pub use tail::LogTail;
