use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Nothing listens here, so any call that does go out fails fast.
const DEAD_SERVER: &str = "http://127.0.0.1:9";

fn agent_editor() -> Command {
    let mut cmd = Command::cargo_bin("agent-editor").expect("binary exists");
    cmd.env_remove("AGENT_EDITOR_SERVER")
        .env_remove("AGENT_EDITOR_TOKEN")
        .env_remove("AGENT_EDITOR_OUTPUT")
        .env_remove("AGENT_EDITOR_CONFIG")
        .env_remove("RUST_LOG")
        .args(["--server", DEAD_SERVER, "--timeout", "2"]);
    cmd
}

#[test]
fn import_with_repo_and_new_repo_fails_locally() {
    agent_editor()
        .args(["import", "docs", "export.tar", "--repo", "r1", "--new-repo", "Fresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"))
        .stderr(predicate::str::contains("transport").not());
}

#[test]
fn import_without_target_fails_locally() {
    agent_editor()
        .args(["import", "docs", "export.tar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("specify --repo or --new-repo"));
}

#[test]
fn import_with_unknown_merge_strategy_fails_locally() {
    agent_editor()
        .args(["import", "docs", "export.tar", "--repo", "r1", "--merge-strategy", "merge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --merge-strategy merge"));
}

#[test]
fn export_jsonl_requires_out() {
    agent_editor()
        .args(["export", "docs", "--format", "jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--out is required when format=jsonl"));
}

#[test]
fn export_rejects_unknown_format() {
    agent_editor()
        .args(["export", "docs", "--format", "zip", "--out", "x.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zip"));
}

#[test]
fn graph_depth_is_checked_locally() {
    agent_editor()
        .args(["graph", "neighbors", "d1", "--depth", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --depth 5"));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    agent_editor()
        .args(["repo", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repos_list"));
}

#[test]
fn version_prints_build_line() {
    agent_editor()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "agent-editor {} (commit: ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn config_show_masks_token() {
    agent_editor()
        .args(["--token", "hunter2", "-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("hunter2").not())
        .stdout(predicate::str::contains(DEAD_SERVER));
}

#[test]
fn config_file_is_layered_under_flags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("agent-editor.toml");
    std::fs::write(
        &path,
        "output = \"yaml\"\n\n[server]\nurl = \"http://10.0.0.5:9000\"\ntimeout_secs = 7\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("agent-editor").unwrap();
    cmd.env_remove("AGENT_EDITOR_SERVER")
        .env_remove("AGENT_EDITOR_OUTPUT")
        .env_remove("AGENT_EDITOR_TIMEOUT")
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("url: http://10.0.0.5:9000"))
        .stdout(predicate::str::contains("timeout_secs: 7"));
}

#[test]
fn missing_config_file_fails() {
    agent_editor()
        .args(["--config", "/nonexistent/agent-editor.toml", "version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn zero_timeout_fails_locally() {
    Command::cargo_bin("agent-editor")
        .unwrap()
        .env_remove("AGENT_EDITOR_TIMEOUT")
        .args(["--server", DEAD_SERVER, "--timeout", "0", "repo", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"))
        .stderr(predicate::str::contains("repos_list").not());
}
