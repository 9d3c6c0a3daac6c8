use std::{fmt, str::FromStr};

/// Built-in workflow stages. The generic webhook accepts arbitrary workflow kinds,
/// these are the ones the server knows how to signal without a script.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Stage {
    Test,
    Docs,
    Validation,
}

impl Stage {
    pub const fn variants() -> &'static [Self] { &[Self::Test, Self::Docs, Self::Validation] }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Docs => "docs",
            Self::Validation => "validation",
        }
    }

    /// Worktree branch directory and marker file name used when no trigger script exists.
    /// Note that `test` marks the `feature` worktree.
    pub fn signal_target(&self) -> (&'static str, &'static str) {
        match self {
            Self::Test => ("feature", ".claude-complete"),
            Self::Docs => ("test", ".tests-complete"),
            Self::Validation => ("test", ".bugfix-validated"),
        }
    }

    /// File name of the trigger script for this stage.
    pub fn script_name(&self) -> String { script_name(self.as_str()) }
}

impl FromStr for Stage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Self::Test),
            "docs" => Ok(Self::Docs),
            "validation" => Ok(Self::Validation),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Script file name for an arbitrary workflow kind.
pub fn script_name(kind: &str) -> String { format!("trigger-{kind}-workflow.sh") }
