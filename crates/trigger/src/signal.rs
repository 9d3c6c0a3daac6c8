use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use futures_util::{FutureExt, future::BoxFuture};
use worktree_relay_core::{models::Stage, util::join_normalized};

use crate::{TriggerError, TriggerStrategy};

/// Fallback trigger: touches a marker file in the project's worktree so an external
/// poller can pick up the next stage. Only the built-in stages have a marker.
pub struct SignalFileTrigger {
    worktree_root: PathBuf,
}

impl SignalFileTrigger {
    pub fn new(worktree_root: impl Into<PathBuf>) -> Self {
        Self { worktree_root: worktree_root.into() }
    }

    /// `<root>/<project>-worktrees/<branch>/<marker>`
    pub fn signal_path(&self, stage: Stage, project: &str) -> PathBuf {
        let (branch, marker) = stage.signal_target();
        join_normalized(&self.worktree_root, format!("{project}-worktrees/{branch}/{marker}"))
    }

    pub async fn signal(&self, kind: &str, project: &str) -> Result<String, TriggerError> {
        let Ok(stage) = kind.parse::<Stage>() else {
            return Err(TriggerError::io(
                kind,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "no signal file for kind"),
            ));
        };
        let path = self.signal_path(stage, project);
        touch(&path).await.map_err(|e| TriggerError::io(kind, e))?;
        Ok(format!("Created signal file: {}", path.display()))
    }
}

impl TriggerStrategy for SignalFileTrigger {
    fn name(&self) -> &'static str { "signal-file" }

    fn applies_to<'a>(&'a self, kind: &'a str) -> BoxFuture<'a, bool> {
        futures_util::future::ready(kind.parse::<Stage>().is_ok()).boxed()
    }

    fn fire<'a>(
        &'a self,
        kind: &'a str,
        project: &'a str,
    ) -> BoxFuture<'a, Result<String, TriggerError>> {
        self.signal(kind, project).boxed()
    }
}

/// Create `path` if missing, otherwise bump its modification time. The parent
/// directory must already exist.
pub async fn touch(path: &Path) -> std::io::Result<()> {
    let file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
    let file = file.into_std().await;
    tokio::task::spawn_blocking(move || file.set_modified(SystemTime::now())).await?
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_signal_path() {
        let trigger = SignalFileTrigger::new("..");
        assert_eq!(
            trigger.signal_path(Stage::Validation, "acme"),
            PathBuf::from("../acme-worktrees/test/.bugfix-validated")
        );
        assert_eq!(
            trigger.signal_path(Stage::Test, "acme"),
            PathBuf::from("../acme-worktrees/feature/.claude-complete")
        );
        assert_eq!(
            trigger.signal_path(Stage::Docs, "unknown"),
            PathBuf::from("../unknown-worktrees/test/.tests-complete")
        );
        // Path components in the project name are flattened under the root
        assert_eq!(
            trigger.signal_path(Stage::Docs, "../../etc/acme"),
            PathBuf::from("../etc/acme-worktrees/test/.tests-complete")
        );
    }

    #[tokio::test]
    async fn test_applies_to_builtin_stages() {
        let trigger = SignalFileTrigger::new("..");
        assert!(trigger.applies_to("test").await);
        assert!(trigger.applies_to("docs").await);
        assert!(trigger.applies_to("validation").await);
        assert!(!trigger.applies_to("deploy").await);
        assert!(!trigger.applies_to("unknown").await);
    }

    #[tokio::test]
    async fn test_touch_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".tests-complete");
        std::fs::write(&path, "keep").unwrap();
        let old = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::options().write(true).open(&path).unwrap().set_modified(old).unwrap();

        touch(&path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep");
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert!(modified > old + Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_signal_requires_worktree() {
        let dir = tempfile::tempdir().unwrap();
        let trigger = SignalFileTrigger::new(dir.path());
        assert!(trigger.signal("docs", "acme").await.is_err());

        std::fs::create_dir_all(dir.path().join("acme-worktrees/test")).unwrap();
        let message = trigger.signal("docs", "acme").await.unwrap();
        let expected = dir.path().join("acme-worktrees/test/.tests-complete");
        assert_eq!(message, format!("Created signal file: {}", expected.display()));
        assert!(expected.is_file());
    }
}
