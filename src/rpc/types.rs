//! Remote API types
//!
//! Typed params and results for the sidecar's method catalogue. Where the
//! backend returns an open-ended object the command passes it through as
//! `serde_json::Value` instead.

use serde::{Deserialize, Serialize};

// ============== Method names ==============

pub mod methods {
    pub const REPOS_ADD: &str = "repos_add";
    pub const REPOS_LIST: &str = "repos_list";
    pub const REPOS_INFO: &str = "repos_info";
    pub const REPOS_REMOVE: &str = "repos_remove";
    pub const REPOS_SET_DEFAULT_PROVIDER: &str = "repos_set_default_provider";
    pub const SCAN_REPO: &str = "scan_repo";

    pub const DOCS_CREATE: &str = "docs_create";
    pub const DOCS_UPDATE: &str = "docs_update";
    pub const DOCS_GET: &str = "docs_get";
    pub const DOCS_DELETE: &str = "docs_delete";
    pub const SEARCH: &str = "search";
    pub const FTS_STATS: &str = "fts_stats";

    pub const GRAPH_NEIGHBORS: &str = "graph_neighbors";
    pub const GRAPH_BACKLINKS: &str = "graph_backlinks";
    pub const GRAPH_PATH: &str = "graph_path";
    pub const GRAPH_RELATED: &str = "graph_related";

    pub const AI_RUN: &str = "ai_run";
    pub const AI_PROVIDERS_LIST: &str = "ai_providers_list";
    pub const AI_PROVIDERS_ENABLE: &str = "ai_providers_enable";
    pub const AI_PROVIDERS_DISABLE: &str = "ai_providers_disable";
    pub const AI_PROVIDER_TEST: &str = "ai_provider_test";
    pub const AI_PROVIDER_KEY_SET: &str = "ai_provider_key_set";
    pub const AI_PROVIDER_KEY_GET: &str = "ai_provider_key_get";

    pub const PLUGINS_LIST: &str = "plugins_list";
    pub const PLUGINS_INFO: &str = "plugins_info";
    pub const PLUGINS_REMOVE: &str = "plugins_remove";
    pub const PLUGINS_ENABLE: &str = "plugins_enable";
    pub const PLUGINS_DISABLE: &str = "plugins_disable";
    pub const PLUGINS_UPSERT: &str = "plugins_upsert";
    pub const PLUGINS_CALL_CORE: &str = "plugins_call_core";
    pub const PLUGINS_SPAWN_CORE: &str = "plugins_spawn_core";
    pub const PLUGINS_SHUTDOWN_CORE: &str = "plugins_shutdown_core";
    pub const PLUGINS_CORE_LIST: &str = "plugins_core_list";

    pub const EXPORT_DOCS: &str = "export_docs";
    pub const EXPORT_DB: &str = "export_db";
    pub const IMPORT_DOCS: &str = "import_docs";

    pub const APP_SETTINGS_GET: &str = "app_settings_get";
    pub const APP_SETTINGS_SET: &str = "app_settings_set";
}

// ============== Shared params ==============

/// `{ "id_or_name": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct IdOrName<'a> {
    pub id_or_name: &'a str,
}

/// `{ "doc_id": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct DocRef<'a> {
    pub doc_id: &'a str,
}

/// `{ "name": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct NameRef<'a> {
    pub name: &'a str,
}

/// Empty object params (`{}`)
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoParams {}

// ============== Repo Types ==============

#[derive(Debug, Clone, Serialize)]
pub struct RepoAddParams {
    pub path: String,
    pub name: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoAdded {
    pub repo_id: String,
}

/// Repo summary from `repos_list`
#[derive(Debug, Clone, Serialize, Deserialize, tabled::Tabled)]
pub struct RepoSummary {
    pub id: String,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRemoved {
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanFilters {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanParams {
    pub repo_path: String,
    pub filters: ScanFilters,
    pub watch: bool,
    /// Debounce in milliseconds
    pub debounce: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub files_scanned: i64,
    #[serde(default)]
    pub docs_added: i64,
    #[serde(default)]
    pub errors: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DefaultProviderParams<'a> {
    pub id_or_name: &'a str,
    pub provider: &'a str,
}

// ============== Doc Types ==============

#[derive(Debug, Clone, Serialize)]
pub struct DocCreateParams {
    pub repo_id: String,
    pub slug: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocCreated {
    pub doc_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocUpdateParams {
    pub doc_id: String,
    pub body: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocUpdated {
    pub version_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocGetParams<'a> {
    pub doc_id: &'a str,
    pub content: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocDeleted {
    pub deleted: bool,
}

// ============== Search Types ==============

#[derive(Debug, Clone, Serialize)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,
    pub query: String,
    pub limit: u32,
    pub offset: u32,
}

/// One full-text hit
#[derive(Debug, Clone, Serialize, Deserialize, tabled::Tabled)]
pub struct SearchHit {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub rank: f64,
    #[serde(default)]
    #[tabled(skip)]
    pub title_snip: String,
    #[serde(default)]
    #[tabled(rename = "snippet")]
    pub body_snip: String,
}

// ============== Graph Types ==============

#[derive(Debug, Clone, Serialize)]
pub struct NeighborsParams<'a> {
    pub doc_id: &'a str,
    pub depth: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathParams<'a> {
    pub start_id: &'a str,
    pub end_id: &'a str,
}

// ============== AI Types ==============

#[derive(Debug, Clone, Serialize)]
pub struct AiRunParams {
    pub provider: String,
    pub doc_id: String,
    pub anchor_id: String,
    pub prompt: String,
}

/// Provider row from `ai_providers_list`
#[derive(Debug, Clone, Serialize, Deserialize, tabled::Tabled)]
pub struct ProviderSummary {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderTestParams<'a> {
    pub name: &'a str,
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderKeyParams<'a> {
    pub name: &'a str,
    pub key: &'a str,
}

// ============== Plugin Types ==============

/// Plugin row from `plugins_list`
#[derive(Debug, Clone, Serialize, Deserialize, tabled::Tabled)]
pub struct PluginSummary {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Running core plugin from `plugins_core_list`
#[derive(Debug, Clone, Serialize, Deserialize, tabled::Tabled)]
pub struct CoreProcess {
    pub name: String,
    #[serde(default)]
    pub pid: u32,
    #[serde(default)]
    pub running: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallCoreParams<'a> {
    pub name: &'a str,
    pub line: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpawnCoreParams<'a> {
    pub name: &'a str,
    pub exec: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginPermsParams<'a> {
    pub name: &'a str,
    /// Permissions as a JSON document string
    pub permissions: &'a str,
}

// ============== Import / Export Types ==============

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportDocsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_deleted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_versions: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportDbParams<'a> {
    pub out_path: &'a str,
}

/// Conflict strategy when an imported doc already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    #[default]
    Keep,
    Overwrite,
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStrategy::Keep => write!(f, "keep"),
            MergeStrategy::Overwrite => write!(f, "overwrite"),
        }
    }
}

impl std::str::FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(MergeStrategy::Keep),
            "overwrite" => Ok(MergeStrategy::Overwrite),
            other => Err(format!("invalid --merge-strategy {}", other)),
        }
    }
}

/// Where imported docs land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    Existing(String),
    New(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportDocsParams {
    pub path: String,
    pub dry_run: bool,
    pub merge_strategy: MergeStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_path: Option<String>,
}

impl ImportDocsParams {
    pub fn new(path: String, target: ImportTarget, dry_run: bool, merge_strategy: MergeStrategy) -> Self {
        let (repo_id, new_repo_name) = match target {
            ImportTarget::Existing(id) => (Some(id), None),
            ImportTarget::New(name) => (None, Some(name)),
        };
        Self {
            path,
            dry_run,
            merge_strategy,
            repo_id,
            new_repo_name,
            progress_path: None,
        }
    }
}

// ============== Settings Types ==============

pub const DEFAULT_PROVIDER_KEY: &str = "default_provider";

#[derive(Debug, Clone, Serialize)]
pub struct SettingsGetParams<'a> {
    pub key: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsSetParams<'a> {
    pub key: &'a str,
    pub value: &'a str,
}
