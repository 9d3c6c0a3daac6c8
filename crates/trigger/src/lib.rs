pub mod script;
pub mod signal;
pub mod templates;

use std::{path::PathBuf, process::ExitStatus, time::Duration};

pub use futures_util::future::BoxFuture;
pub use script::ScriptTrigger;
pub use signal::SignalFileTrigger;
use thiserror::Error;
use worktree_relay_core::config::TriggerConfig;

/// Result of a trigger attempt, reported in the log and the HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOutcome {
    pub success: bool,
    pub detail: Option<String>,
}

impl TriggerOutcome {
    pub fn succeeded(detail: impl Into<String>) -> Self {
        Self { success: true, detail: Some(detail.into()) }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self { success: false, detail: Some(detail.into()) }
    }

    pub fn is_success(&self) -> bool { self.success }
}

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Workflow script failed: {stderr}")]
    ScriptFailed { status: ExitStatus, stderr: String },
    #[error("Workflow {kind} timed out")]
    TimedOut { kind: String },
    #[error("Error triggering workflow {kind}: {source}")]
    Io {
        kind: String,
        #[source]
        source: std::io::Error,
    },
}

impl TriggerError {
    pub fn io(kind: &str, source: std::io::Error) -> Self {
        Self::Io { kind: kind.to_string(), source }
    }
}

/// One way of starting the next workflow stage.
///
/// The dispatcher asks each strategy in order whether it can handle a workflow kind;
/// the first one that can is fired and its result is final.
pub trait TriggerStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy handles `kind`. May touch the filesystem.
    fn applies_to<'a>(&'a self, kind: &'a str) -> BoxFuture<'a, bool>;

    /// Start the workflow. On success, returns a message describing what was done.
    fn fire<'a>(
        &'a self,
        kind: &'a str,
        project: &'a str,
    ) -> BoxFuture<'a, Result<String, TriggerError>>;
}

pub struct Dispatcher {
    strategies: Vec<Box<dyn TriggerStrategy>>,
}

impl Dispatcher {
    pub fn new(strategies: Vec<Box<dyn TriggerStrategy>>) -> Self { Self { strategies } }

    /// Script first, then the signal file fallback.
    pub fn from_config(config: &TriggerConfig, scripts_dir: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(ScriptTrigger::new(
                scripts_dir,
                Duration::from_secs(config.script_timeout_secs),
            )),
            Box::new(SignalFileTrigger::new(config.worktree_root.clone())),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    async fn select(&self, kind: &str) -> Option<&dyn TriggerStrategy> {
        for strategy in &self.strategies {
            if strategy.applies_to(kind).await {
                return Some(strategy.as_ref());
            }
        }
        None
    }

    /// Trigger the workflow `kind` for `project`. Never fails; errors are logged and
    /// reported through the outcome.
    pub async fn trigger(&self, kind: &str, project: &str) -> TriggerOutcome {
        tracing::info!("Triggering {kind} workflow for {project}");
        let Some(strategy) = self.select(kind).await else {
            let message = format!("Unknown workflow type: {kind}");
            tracing::warn!("{message}");
            return TriggerOutcome::failed(message);
        };
        tracing::debug!("Using {} trigger for {kind}", strategy.name());
        match strategy.fire(kind, project).await {
            Ok(message) => {
                tracing::info!("{message}");
                TriggerOutcome::succeeded(message)
            }
            Err(e) => {
                tracing::error!("{e}");
                TriggerOutcome::failed(e.to_string())
            }
        }
    }
}
