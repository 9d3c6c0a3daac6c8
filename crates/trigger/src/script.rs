use std::{path::PathBuf, process::Stdio, time::Duration};

use futures_util::{FutureExt, future::BoxFuture};
use tokio::process::Command;
use worktree_relay_core::{models::script_name, util::join_normalized};

use crate::{TriggerError, TriggerStrategy};

/// Runs `trigger-<kind>-workflow.sh` from the scripts directory with the project name as
/// its only argument.
pub struct ScriptTrigger {
    dir: PathBuf,
    timeout: Duration,
}

impl ScriptTrigger {
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { dir: dir.into(), timeout }
    }

    pub fn script_path(&self, kind: &str) -> PathBuf {
        join_normalized(&self.dir, script_name(kind))
    }

    pub async fn run(&self, kind: &str, project: &str) -> Result<String, TriggerError> {
        let path = self.script_path(kind);
        let child = Command::new(&path)
            .arg(project)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout kills the script
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TriggerError::io(kind, e))?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| TriggerError::io(kind, e))?,
            Err(_) => {
                tracing::debug!("Killed {} after {:?}", path.display(), self.timeout);
                return Err(TriggerError::TimedOut { kind: kind.to_string() });
            }
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("{} output: {}", path.display(), stdout.trim_end());
        }
        if output.status.success() {
            Ok(format!("Successfully triggered {kind} workflow"))
        } else {
            Err(TriggerError::ScriptFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        }
    }
}

impl TriggerStrategy for ScriptTrigger {
    fn name(&self) -> &'static str { "script" }

    fn applies_to<'a>(&'a self, kind: &'a str) -> BoxFuture<'a, bool> {
        async move {
            tokio::fs::metadata(self.script_path(kind)).await.is_ok_and(|meta| meta.is_file())
        }
        .boxed()
    }

    fn fire<'a>(
        &'a self,
        kind: &'a str,
        project: &'a str,
    ) -> BoxFuture<'a, Result<String, TriggerError>> {
        self.run(kind, project).boxed()
    }
}
