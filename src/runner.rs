//! # Command Runner
//!
//! The single seam between the orchestrator and the outside world: every
//! external tool invocation goes through [`CommandRunner`]. The production
//! implementation spawns real processes; tests substitute a scriptable mock
//! so pipeline behavior can be verified without a toolchain installed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use log::{debug, error, info};

/// Abstraction for launching external toolchain processes.
///
/// Failure is never raised as an error from this layer. Whether the tool
/// exited nonzero or could not be launched at all, the caller sees `false`
/// and decides how to react.
pub trait CommandRunner {
    /// Run `argv[0]` with the remaining elements as arguments, optionally in
    /// `cwd`. The child inherits this process's stdout/stderr, so the tool's
    /// own output stays live on the console.
    ///
    /// Returns `true` iff the process exited with code 0.
    fn run(&self, argv: &[String], cwd: Option<&Path>) -> bool;
}

/// The real runner (production). Blocks until the child terminates.
pub struct ToolchainRunner;

impl CommandRunner for ToolchainRunner {
    fn run(&self, argv: &[String], cwd: Option<&Path>) -> bool {
        let Some((program, args)) = argv.split_first() else {
            error!("Refusing to run an empty command line");
            return false;
        };

        info!("Running: {}", argv.join(" "));

        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        // `status()` inherits the parent's output streams and blocks until
        // the child exits. No timeout: a hung tool hangs the whole run.
        match command.status() {
            Ok(status) => {
                debug!("{} exited with code {:?}", program, status.code());
                status.success()
            }
            Err(e) => {
                error!("Failed to launch {}: {}", program, e);
                false
            }
        }
    }
}

/// One recorded invocation, kept by [`MockRunner`] for assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// A Mock Runner for Testing.
///
/// Records every invocation and reports failure for any subcommand listed
/// in `fail_on` (matched against `argv[1]`, e.g. "restore" or "publish").
#[derive(Debug, Default)]
pub struct MockRunner {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail_on: Mutex<HashSet<String>>,
}

impl MockRunner {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner where the named subcommand exits nonzero.
    #[allow(dead_code)]
    pub fn failing_on(subcommand: &str) -> Self {
        let runner = Self::default();
        runner
            .fail_on
            .lock()
            .unwrap()
            .insert(subcommand.to_string());
        runner
    }

    /// The subcommands invoked so far, in order (`argv[1]` of each call).
    #[allow(dead_code)]
    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.argv.get(1).cloned().unwrap_or_default())
            .collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, argv: &[String], cwd: Option<&Path>) -> bool {
        self.calls.lock().unwrap().push(RecordedCall {
            argv: argv.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        });

        let subcommand = argv.get(1).map(String::as_str).unwrap_or("");
        !self.fail_on.lock().unwrap().contains(subcommand)
    }
}
