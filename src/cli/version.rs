//! `agent-editor version` command

use anyhow::Result;

use super::Context;
use crate::output::{self, OutputFormat};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build metadata stamped in at compile time
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub built: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            commit: option_env!("AGENT_EDITOR_COMMIT").unwrap_or("none"),
            built: option_env!("AGENT_EDITOR_BUILD_DATE").unwrap_or("unknown"),
        }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "agent-editor {} (commit: {}, built: {})",
            self.version, self.commit, self.built
        )
    }
}

pub fn execute(ctx: &Context) -> Result<()> {
    let info = BuildInfo::current();
    match ctx.format() {
        OutputFormat::Text => {
            println!("{}", info);
            Ok(())
        }
        format => output::print(&info, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        let info = BuildInfo {
            version: "0.3.0",
            commit: "abc123",
            built: "2024-05-01",
        };
        assert_eq!(
            info.to_string(),
            "agent-editor 0.3.0 (commit: abc123, built: 2024-05-01)"
        );
    }

    #[test]
    fn test_current_uses_package_version() {
        assert_eq!(BuildInfo::current().version, env!("CARGO_PKG_VERSION"));
    }
}
