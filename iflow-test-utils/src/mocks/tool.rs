//! Fake tool binaries
//!
//! A fake tool is a small POSIX shell script. Every call writes one record
//! file (named after the shell's pid, so parallel calls never share a file)
//! holding the physical working directory followed by one argument per line.
//!
//! While a call runs it keeps a marker in `running/` and appends the number
//! of markers it saw at start to `concurrency`, so tests can check how many
//! calls overlapped.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One recorded call of a fake tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub cwd: PathBuf,
    pub args: Vec<String>,
}

impl RecordedCall {
    /// Value following `flag` in the argument list
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Builder-style fake binary
pub struct FakeTool {
    dir: TempDir,
    name: String,
    exit_code: i32,
    fail_on: Option<String>,
    stdout: String,
    sleep: Option<String>,
}

impl FakeTool {
    /// A tool that succeeds and prints nothing
    pub fn new(name: &str) -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            name: name.to_string(),
            exit_code: 0,
            fail_on: None,
            stdout: String::new(),
            sleep: None,
        }
    }

    /// Exit with `code` on every call
    pub fn exiting_with(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Exit with 1 whenever any argument equals `arg`
    pub fn failing_on(mut self, arg: &str) -> Self {
        self.fail_on = Some(arg.to_string());
        self
    }

    /// Print `text` on stdout on every call
    pub fn printing(mut self, text: &str) -> Self {
        self.stdout = text.to_string();
        self
    }

    /// Sleep for `seconds` (as understood by `sleep(1)`) on every call
    pub fn sleeping(mut self, seconds: &str) -> Self {
        self.sleep = Some(seconds.to_string());
        self
    }

    /// Write the script and make it executable
    #[cfg(unix)]
    pub fn install(self) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let calls = self.calls_dir();
        fs::create_dir_all(&calls).expect("Failed to create calls dir");
        let running = self.dir.path().join("running");
        fs::create_dir_all(&running).expect("Failed to create running dir");

        let fail_check = match &self.fail_on {
            Some(arg) => format!(
                "for a in \"$@\"; do if [ \"$a\" = '{arg}' ]; then exit 1; fi; done\n"
            ),
            None => String::new(),
        };
        let sleep = match &self.sleep {
            Some(seconds) => format!("sleep {seconds}\n"),
            None => String::new(),
        };
        let script = format!(
            "#!/bin/sh\n\
             marker='{running}/'$$\n\
             : > \"$marker\"\n\
             ls '{running}' | wc -l >> '{concurrency}'\n\
             record='{calls}/call-'$$\n\
             pwd -P > \"$record\"\n\
             for a in \"$@\"; do printf '%s\\n' \"$a\" >> \"$record\"; done\n\
             {sleep}\
             rm -f \"$marker\"\n\
             printf '%s' '{stdout}'\n\
             {fail_check}\
             exit {code}\n",
            running = running.display(),
            concurrency = self.concurrency_log().display(),
            calls = calls.display(),
            stdout = self.stdout,
            code = self.exit_code,
        );

        let path = self.path();
        fs::write(&path, script).expect("Failed to write fake tool");
        let mut permissions = fs::metadata(&path)
            .expect("Failed to stat fake tool")
            .permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).expect("Failed to chmod fake tool");
        self
    }

    /// Absolute path of the script
    pub fn path(&self) -> PathBuf {
        self.dir.path().join(&self.name)
    }

    /// Every call made so far, in no particular order
    pub fn calls(&self) -> Vec<RecordedCall> {
        let Ok(entries) = fs::read_dir(self.calls_dir()) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| read_call(&entry.path()))
            .collect()
    }

    /// Calls whose arguments contain `arg`
    pub fn calls_with(&self, arg: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.args.iter().any(|a| a == arg))
            .collect()
    }

    /// Most calls seen running at the same time, 0 before the first call
    pub fn peak_concurrency(&self) -> usize {
        fs::read_to_string(self.concurrency_log())
            .unwrap_or_default()
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .max()
            .unwrap_or(0)
    }

    fn concurrency_log(&self) -> PathBuf {
        self.dir.path().join("concurrency")
    }

    fn calls_dir(&self) -> PathBuf {
        self.dir.path().join("calls")
    }
}

fn read_call(path: &Path) -> RecordedCall {
    let content = fs::read_to_string(path).expect("Failed to read call record");
    let mut lines = content.lines();
    let cwd = PathBuf::from(lines.next().unwrap_or_default());
    RecordedCall {
        cwd,
        args: lines.map(str::to_string).collect(),
    }
}
