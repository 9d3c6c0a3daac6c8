use std::path::{Path, PathBuf};

/// Join two paths, only including the normal components.
pub fn join_normalized(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let mut out = base.as_ref().to_path_buf();
    out.extend(path.as_ref().components().filter(|v| matches!(v, std::path::Component::Normal(_))));
    out
}

#[cfg(test)]
mod tests {
    use super::join_normalized;
    use std::path::PathBuf;

    #[test]
    fn test_join_normalized() {
        let cases: &[(&str, &str, &str)] = &[
            ("..", "acme-worktrees/test/.tests-complete", "../acme-worktrees/test/.tests-complete"),
            ("scripts", "trigger-docs-workflow.sh", "scripts/trigger-docs-workflow.sh"),
            ("scripts", "../../etc/passwd", "scripts/etc/passwd"),
            ("scripts", "/abs/file.sh", "scripts/abs/file.sh"),
            ("..", "./a/./b", "../a/b"),
        ];
        for &(base, path, expected) in cases {
            assert_eq!(join_normalized(base, path), PathBuf::from(expected));
        }
    }
}
