//! Child process invocation settings

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

/// Default interpreter binary
pub const DEFAULT_INTERPRETER: &str = "python";

/// Default script run when none is given on the command line
pub const DEFAULT_SCRIPT: &str = "human_sim.py";

/// Invocation settings for the relayed child process
///
/// Describes the `<interpreter> <script> [args...]` command line the relay
/// spawns. The default invocation is `python human_sim.py` in the current
/// working directory.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Interpreter binary, e.g. `python` or `/usr/bin/python3`
    pub interpreter: PathBuf,

    /// Script path handed to the interpreter as its first argument
    pub script: PathBuf,

    /// Extra arguments passed through to the script
    pub script_args: Vec<String>,

    /// Working directory for the child, `None` inherits ours
    pub cwd: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            script: PathBuf::from(DEFAULT_SCRIPT),
            script_args: Vec::new(),
            cwd: None,
        }
    }
}

impl RelayConfig {
    /// Create a configuration for `<interpreter> <script>` with no extra args
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            script_args: Vec::new(),
            cwd: None,
        }
    }

    /// Build the ready-to-spawn command
    ///
    /// All three stdio streams are piped; stderr is merged with stdout
    /// downstream by the relay's reader tasks. `kill_on_drop` keeps the
    /// child from outliving a dropped relay future.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&self.script)
            .args(&self.script_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Human-readable command line for logs and error messages
    pub fn command_line(&self) -> String {
        let mut parts = vec![
            self.interpreter.to_string_lossy().into_owned(),
            self.script.to_string_lossy().into_owned(),
        ];
        parts.extend(self.script_args.iter().cloned());
        parts.join(" ")
    }
}
