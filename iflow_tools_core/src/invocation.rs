//! External tool invocations

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One execution of an external binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory the binary is started in
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a flag followed by its value
    pub fn flag(self, name: &str, value: impl Into<String>) -> Self {
        self.arg(name).arg(value)
    }

    /// Append a flag whose value is a path
    pub fn path_flag(self, name: &str, value: &Path) -> Self {
        self.flag(name, value.display().to_string())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command line as it would be typed into a POSIX shell
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Invocations that run one after another
///
/// Jobs are the unit of parallelism: the runner starts jobs concurrently,
/// but the steps of a single job always run in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub label: String,
    pub steps: Vec<Invocation>,
}

impl Job {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
        }
    }

    pub fn single(label: impl Into<String>, invocation: Invocation) -> Self {
        Self::new(label).then(invocation)
    }

    /// Append a step
    pub fn then(mut self, invocation: Invocation) -> Self {
        self.steps.push(invocation);
        self
    }
}

fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@+%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
