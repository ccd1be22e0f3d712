//! Live import progress
//!
//! ```text
//!  backend ──appends──▶ progress file ──LogTail──▶ streamer task ──mpsc──▶ renderer ──▶ stderr
//! ```
//!
//! The streamer polls on a fixed interval while the import call is in
//! flight. Once told to stop it keeps draining until it has seen a terminal
//! event or the drain deadline passes, whichever comes first.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::event::{ProgressLine, ProgressStatus};
use super::tail::LogTail;

const CHANNEL_CAPACITY: usize = 64;

/// Timing knobs for the streamer
#[derive(Debug, Clone, Copy)]
pub struct StreamerConfig {
    pub poll_interval: Duration,
    /// Pause between polls while draining
    pub drain_interval: Duration,
    /// Upper bound on the drain after stop
    pub drain_timeout: Duration,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            drain_interval: Duration::from_millis(25),
            drain_timeout: Duration::from_millis(500),
        }
    }
}

/// What the streamer saw over its lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub events: usize,
    pub raw_lines: usize,
    pub terminal: Option<ProgressStatus>,
}

impl StreamSummary {
    fn record(&mut self, line: &ProgressLine) {
        match line {
            ProgressLine::Event(event) => {
                self.events += 1;
                if event.status.is_terminal() {
                    self.terminal = Some(event.status);
                }
            }
            ProgressLine::Raw(_) => self.raw_lines += 1,
        }
    }
}

/// Handle to a running streamer task
pub struct ProgressStreamer {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<StreamSummary>,
}

impl ProgressStreamer {
    /// Start tailing `path`, sending each parsed line to `sink`
    pub fn spawn(path: impl Into<PathBuf>, sink: mpsc::Sender<ProgressLine>, config: StreamerConfig) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let tail = LogTail::new(path);
        let handle = tokio::spawn(run(tail, sink, config, stop_rx));
        Self {
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Signal stop and wait for the final drain
    pub async fn finish(mut self) -> StreamSummary {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match (&mut self.handle).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "progress streamer task failed");
                StreamSummary::default()
            }
        }
    }
}

async fn run(
    mut tail: LogTail,
    sink: mpsc::Sender<ProgressLine>,
    config: StreamerConfig,
    mut stop: oneshot::Receiver<()>,
) -> StreamSummary {
    let mut summary = StreamSummary::default();
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                if !poll_once(&mut tail, &sink, &mut summary).await {
                    return summary;
                }
            }
        }
    }

    let deadline = Instant::now() + config.drain_timeout;
    loop {
        if !poll_once(&mut tail, &sink, &mut summary).await {
            return summary;
        }
        if summary.terminal.is_some() || Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(config.drain_interval).await;
    }

    // The call has returned, so nothing more will be appended to a dangling line.
    if let Some(line) = tail.take_remainder().as_deref().and_then(ProgressLine::parse) {
        summary.record(&line);
        let _ = sink.send(line).await;
    }

    tracing::debug!(
        events = summary.events,
        raw = summary.raw_lines,
        terminal = ?summary.terminal,
        "progress streamer stopped"
    );
    summary
}

/// Returns false once nobody is listening
async fn poll_once(tail: &mut LogTail, sink: &mpsc::Sender<ProgressLine>, summary: &mut StreamSummary) -> bool {
    let lines = match tail.poll().await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::debug!(error = %e, path = %tail.path().display(), "progress poll failed");
            return true;
        }
    };

    for line in lines.iter().filter_map(|l| ProgressLine::parse(l)) {
        summary.record(&line);
        if sink.send(line).await.is_err() {
            return false;
        }
    }
    true
}

/// Print progress lines to stderr until the sender side closes
pub fn spawn_renderer(mut lines: mpsc::Receiver<ProgressLine>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            eprintln!("{}", line);
        }
    })
}

/// Private scratch file handed to the backend as `progress_path`.
///
/// Removed when dropped, whatever happened in between.
#[derive(Debug)]
pub struct ProgressLog {
    path: tempfile::TempPath,
}

impl ProgressLog {
    pub fn create() -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("agent-editor-import-progress-")
            .suffix(".log")
            .tempfile()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now, reporting failure
    pub fn close(self) -> io::Result<()> {
        self.path.close()
    }
}

/// Progress file, streamer and renderer for one import call
pub struct ProgressSession {
    log: ProgressLog,
    streamer: ProgressStreamer,
    renderer: JoinHandle<()>,
}

impl ProgressSession {
    pub fn start(config: StreamerConfig) -> io::Result<Self> {
        let log = ProgressLog::create()?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let streamer = ProgressStreamer::spawn(log.path(), tx, config);
        let renderer = spawn_renderer(rx);
        tracing::debug!(path = %log.path().display(), "import progress streaming started");
        Ok(Self {
            log,
            streamer,
            renderer,
        })
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Stop streaming, flush the renderer and delete the progress file
    pub async fn finish(self) -> StreamSummary {
        let summary = self.streamer.finish().await;
        if let Err(e) = self.renderer.await {
            tracing::warn!(error = %e, "progress renderer failed");
        }
        let path = self.log.path().to_path_buf();
        if let Err(e) = self.log.close() {
            tracing::warn!(error = %e, path = %path.display(), "failed to remove progress file");
        }
        summary
    }
}
