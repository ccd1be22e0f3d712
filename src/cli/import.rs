//! `agent-editor import` command
//!
//! # Usage
//! ```bash
//! agent-editor import docs export.tar --new-repo "Imported"            # dry run
//! agent-editor import docs export.json --repo r1 --dry-run=false --merge-strategy overwrite
//! ```
//!
//! While `import_docs` is in flight the backend reports progress through a
//! scratch file we name in the call; see [`crate::progress`].

use anyhow::{bail, Result};
use clap::{ArgAction, Args, Subcommand};
use serde_json::Value;

use super::Context;
use crate::output;
use crate::progress::{ProgressSession, StreamerConfig};
use crate::rpc::{call, methods, ImportDocsParams, ImportTarget, MergeStrategy};

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(subcommand)]
    pub command: ImportCommands,
}

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Import docs from an export archive
    Docs(ImportDocsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportDocsArgs {
    /// Archive path (json, jsonl or tar export)
    pub path: String,

    /// Existing repo to import into
    #[arg(long)]
    pub repo: Option<String>,

    /// Create a new repo for the import
    #[arg(long)]
    pub new_repo: Option<String>,

    /// Validate without writing (use --dry-run=false to apply)
    #[arg(long, action = ArgAction::Set, default_value_t = true, num_args = 0..=1, default_missing_value = "true")]
    pub dry_run: bool,

    /// Conflict strategy: keep|overwrite
    #[arg(long, default_value = "keep")]
    pub merge_strategy: String,

    /// Do not stream import progress
    #[arg(long)]
    pub no_progress: bool,
}

impl ImportDocsArgs {
    /// Exactly one of `--repo` / `--new-repo`
    pub fn target(&self) -> Result<ImportTarget> {
        let repo = self.repo.as_deref().filter(|s| !s.is_empty());
        let new_repo = self.new_repo.as_deref().filter(|s| !s.is_empty());
        match (repo, new_repo) {
            (Some(_), Some(_)) => bail!("--repo and --new-repo are mutually exclusive"),
            (None, None) => bail!("specify --repo or --new-repo"),
            (Some(id), None) => Ok(ImportTarget::Existing(id.to_string())),
            (None, Some(name)) => Ok(ImportTarget::New(name.to_string())),
        }
    }

    pub fn strategy(&self) -> Result<MergeStrategy> {
        self.merge_strategy.parse().map_err(anyhow::Error::msg)
    }

    /// Validated call params, without a progress path
    pub fn params(&self) -> Result<ImportDocsParams> {
        let target = self.target()?;
        let strategy = self.strategy()?;
        Ok(ImportDocsParams::new(
            self.path.clone(),
            target,
            self.dry_run,
            strategy,
        ))
    }
}

pub async fn execute(args: ImportArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ImportCommands::Docs(docs) => import_docs(&docs, ctx, StreamerConfig::default()).await,
    }
}

async fn import_docs(args: &ImportDocsArgs, ctx: &Context, streamer: StreamerConfig) -> Result<()> {
    let mut params = args.params()?;
    let rpc = ctx.rpc()?;

    let session = if args.no_progress {
        None
    } else {
        match ProgressSession::start(streamer) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "could not create progress file, importing without progress");
                None
            }
        }
    };
    params.progress_path = session
        .as_ref()
        .map(|s| s.path().to_string_lossy().into_owned());

    let result = call::<_, _, Value>(rpc.as_ref(), methods::IMPORT_DOCS, &params).await;

    if let Some(session) = session {
        let summary = session.finish().await;
        tracing::debug!(
            events = summary.events,
            raw = summary.raw_lines,
            terminal = ?summary.terminal,
            "import progress finished"
        );
    }

    let report = result?;
    output::print(&report, ctx.format())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{context, MockRpc};
    use crate::rpc::{RpcError, RpcTransport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn args(repo: Option<&str>, new_repo: Option<&str>) -> ImportDocsArgs {
        ImportDocsArgs {
            path: "/tmp/export.tar".into(),
            repo: repo.map(String::from),
            new_repo: new_repo.map(String::from),
            dry_run: true,
            merge_strategy: "keep".into(),
            no_progress: false,
        }
    }

    fn fast() -> StreamerConfig {
        StreamerConfig {
            poll_interval: Duration::from_millis(10),
            drain_interval: Duration::from_millis(5),
            drain_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn test_repo_and_new_repo_rejected_without_call() {
        let mock = Arc::new(MockRpc::new());
        let err = import_docs(&args(Some("r1"), Some("Fresh")), &context(&mock), fast())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_target_rejected_without_call() {
        let mock = Arc::new(MockRpc::new());
        let err = import_docs(&args(None, Some("")), &context(&mock), fast())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--repo or --new-repo"));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_strategy_rejected_without_call() {
        let mock = Arc::new(MockRpc::new());
        let mut bad = args(Some("r1"), None);
        bad.merge_strategy = "merge".into();
        let err = import_docs(&bad, &context(&mock), fast()).await.unwrap_err();
        assert!(err.to_string().contains("invalid --merge-strategy merge"));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_strategy_case_insensitive() -> Result<()> {
        let mut a = args(Some("r1"), None);
        a.merge_strategy = "OverWrite".into();
        assert_eq!(a.params()?.merge_strategy, MergeStrategy::Overwrite);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_progress_omits_progress_path() -> Result<()> {
        let mock = Arc::new(MockRpc::new().reply("import_docs", json!({"inserted": 0})));
        let mut a = args(Some("r1"), None);
        a.no_progress = true;
        import_docs(&a, &context(&mock), fast()).await?;

        let params = mock.single_params();
        assert!(params.get("progress_path").is_none());
        assert_eq!(params["repo_id"], "r1");
        assert_eq!(params["dry_run"], true);
        Ok(())
    }

    /// Writes progress lines into the file it was handed, like the sidecar does
    #[derive(Default)]
    struct ProgressWritingBackend {
        progress_path: Mutex<Option<PathBuf>>,
        fail: bool,
    }

    #[async_trait]
    impl RpcTransport for ProgressWritingBackend {
        async fn call_raw(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
            assert_eq!(method, "import_docs");
            let path = params
                .as_ref()
                .and_then(|p| p["progress_path"].as_str())
                .map(PathBuf::from)
                .expect("progress_path sent");
            *self.progress_path.lock().unwrap() = Some(path.clone());

            let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, r#"{{"status":"processing","processed":1,"total":2}}"#).unwrap();
            tokio::time::sleep(Duration::from_millis(30)).await;
            writeln!(file, r#"{{"status":"imported","processed":2,"total":2,"inserted":2}}"#).unwrap();

            if self.fail {
                return Err(RpcError::Remote {
                    method: method.to_string(),
                    fault: crate::rpc::RemoteFault {
                        code: -32000,
                        message: "import failed".into(),
                        data: None,
                    },
                });
            }
            Ok(json!({"inserted": 2, "updated": 0, "skipped": 0}))
        }
    }

    #[tokio::test]
    async fn test_progress_file_passed_and_removed() -> Result<()> {
        let backend = Arc::new(ProgressWritingBackend::default());
        let transport: Arc<dyn RpcTransport> = backend.clone();
        let ctx = Context::new(Default::default(), true).with_transport(transport);

        import_docs(&args(None, Some("Fresh")), &ctx, fast()).await?;

        let path = backend.progress_path.lock().unwrap().clone().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("agent-editor-import-progress-"));
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_progress_file_removed_on_failure() {
        let backend = Arc::new(ProgressWritingBackend {
            fail: true,
            ..Default::default()
        });
        let transport: Arc<dyn RpcTransport> = backend.clone();
        let ctx = Context::new(Default::default(), true).with_transport(transport);

        let err = import_docs(&args(Some("r1"), None), &ctx, fast())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("import failed"));

        let path = backend.progress_path.lock().unwrap().clone().unwrap();
        assert!(!path.exists());
    }
}
