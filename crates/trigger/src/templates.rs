//! Default trigger scripts, rewritten into the scripts directory on every startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use worktree_relay_core::models::Stage;

pub struct ScriptTemplate {
    pub stage: Stage,
    pub body: &'static str,
}

impl ScriptTemplate {
    pub fn file_name(&self) -> String { self.stage.script_name() }
}

pub const DEFAULT_SCRIPTS: &[ScriptTemplate] = &[
    ScriptTemplate { stage: Stage::Test, body: TEST_SCRIPT },
    ScriptTemplate { stage: Stage::Docs, body: DOCS_SCRIPT },
    ScriptTemplate { stage: Stage::Validation, body: VALIDATION_SCRIPT },
];

const TEST_SCRIPT: &str = r#"#!/bin/bash
# Trigger test workflow
PROJECT_NAME="${1:-test-project}"
WORKTREE_BASE="../${PROJECT_NAME}-worktrees"

if [[ -d "$WORKTREE_BASE/test" ]]; then
    cd "$WORKTREE_BASE/test"
    git pull origin feature/"$PROJECT_NAME" 2>/dev/null || true

    # Run tests
    if [[ -f "package.json" ]]; then
        npm test 2>/dev/null || true
    elif [[ -f "requirements.txt" ]] || [[ -f "pyproject.toml" ]]; then
        if command -v pytest &> /dev/null; then
            pytest 2>/dev/null || true
        fi
    fi

    # Create test completion signal
    touch .tests-complete
    echo "Test workflow completed for $PROJECT_NAME"
else
    echo "Test worktree not found for $PROJECT_NAME" >&2
    exit 1
fi
"#;

const DOCS_SCRIPT: &str = r#"#!/bin/bash
# Trigger documentation workflow
PROJECT_NAME="${1:-test-project}"
WORKTREE_BASE="../${PROJECT_NAME}-worktrees"

if [[ -d "$WORKTREE_BASE/docs" ]]; then
    cd "$WORKTREE_BASE/docs"
    git pull origin feature/"$PROJECT_NAME" 2>/dev/null || true

    # Create documentation needed signal
    echo "Documentation update needed for $PROJECT_NAME" > .docs-needed
    echo "Documentation workflow triggered for $PROJECT_NAME"
else
    echo "Documentation worktree not found for $PROJECT_NAME" >&2
    exit 1
fi
"#;

const VALIDATION_SCRIPT: &str = r#"#!/bin/bash
# Trigger validation workflow
PROJECT_NAME="${1:-test-project}"
WORKTREE_BASE="../${PROJECT_NAME}-worktrees"

if [[ -d "$WORKTREE_BASE/test" ]]; then
    cd "$WORKTREE_BASE/test"
    git pull origin bugfix/"$PROJECT_NAME" 2>/dev/null || true

    # Run validation tests
    if [[ -f "package.json" ]]; then
        npm test 2>/dev/null || true
    elif [[ -f "requirements.txt" ]] || [[ -f "pyproject.toml" ]]; then
        if command -v pytest &> /dev/null; then
            pytest 2>/dev/null || true
        fi
    fi

    # Create validation completion signal
    touch .bugfix-validated
    echo "Validation workflow completed for $PROJECT_NAME"
else
    echo "Test worktree not found for $PROJECT_NAME" >&2
    exit 1
fi
"#;

/// Write the default scripts into `dir`, replacing previous versions, and mark them
/// executable. Returns the written paths.
pub fn install(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create scripts directory {}", dir.display()))?;
    let mut written = Vec::with_capacity(DEFAULT_SCRIPTS.len());
    for template in DEFAULT_SCRIPTS {
        let file_name = template.file_name();
        let path = dir.join(&file_name);
        std::fs::write(&path, template.body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        set_executable(&path)?;
        tracing::info!("Created {file_name}");
        written.push(path);
    }
    Ok(written)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("Failed to get metadata for {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> { Ok(()) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_writes_all_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let written = install(dir.path()).unwrap();
        let names = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![
            "trigger-test-workflow.sh",
            "trigger-docs-workflow.sh",
            "trigger-validation-workflow.sh",
        ]);
        for path in &written {
            let content = std::fs::read_to_string(path).unwrap();
            assert!(content.starts_with("#!/bin/bash\n"));
            assert!(content.contains("PROJECT_NAME=\"${1:-test-project}\""));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_install_sets_mode_and_overwrites() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("trigger-docs-workflow.sh");
        std::fs::write(&stale, "#!/bin/sh\nexit 1\n").unwrap();
        std::fs::set_permissions(&stale, std::fs::Permissions::from_mode(0o600)).unwrap();

        install(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&stale).unwrap(), DOCS_SCRIPT);
        for template in DEFAULT_SCRIPTS {
            let mode = std::fs::metadata(dir.path().join(template.file_name()))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_install_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("relay").join("scripts");
        install(&nested).unwrap();
        assert!(nested.join("trigger-validation-workflow.sh").is_file());
    }

    #[test]
    fn test_scripts_signal_their_stage() {
        assert!(TEST_SCRIPT.contains("touch .tests-complete"));
        assert!(DOCS_SCRIPT.contains("> .docs-needed"));
        assert!(VALIDATION_SCRIPT.contains("git pull origin bugfix/"));
        assert!(VALIDATION_SCRIPT.contains("touch .bugfix-validated"));
    }
}
