use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_PATH: &str = "/tmp/claude-webhook.log";
pub const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub trigger: TriggerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { host: IpAddr::V4(Ipv4Addr::LOCALHOST), port: DEFAULT_PORT } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self { Self { path: PathBuf::from(DEFAULT_LOG_PATH) } }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Directory holding the `trigger-<kind>-workflow.sh` scripts.
    /// Defaults to the directory containing the server executable.
    pub scripts_dir: Option<PathBuf>,
    /// Base directory under which `<project>-worktrees` are resolved.
    pub worktree_root: PathBuf,
    pub script_timeout_secs: u64,
    /// Rewrite the default trigger scripts on startup.
    pub write_scripts: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            scripts_dir: None,
            worktree_root: PathBuf::from(".."),
            script_timeout_secs: DEFAULT_SCRIPT_TIMEOUT_SECS,
            write_scripts: true,
        }
    }
}

impl TriggerConfig {
    pub fn resolve_scripts_dir(&self) -> PathBuf {
        if let Some(dir) = &self.scripts_dir {
            return dir.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Config {
    /// Load the configuration from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        serde_yaml::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("config.yml")).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.log.path, PathBuf::from(DEFAULT_LOG_PATH));
        assert_eq!(config.trigger.worktree_root, PathBuf::from(".."));
        assert_eq!(config.trigger.script_timeout_secs, 300);
        assert!(config.trigger.write_scripts);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "server:\n  port: 9000\n\
             trigger:\n  scripts_dir: /opt/relay\n  script_timeout_secs: 5\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.trigger.resolve_scripts_dir(), PathBuf::from("/opt/relay"));
        assert_eq!(config.trigger.script_timeout_secs, 5);
        assert_eq!(config.log.path, PathBuf::from(DEFAULT_LOG_PATH));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "server: [1, 2").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
