//! # Command Runner
//!
//! Runs a command line inside the sandbox root, in one of two modes:
//! - foreground: split with shell-word rules and exec'd directly (no shell),
//!   awaited under a timeout;
//! - background: written into a launch script run by bash (pipes and
//!   redirection allowed), detached into a new session, output sent to a log
//!   file. The caller gets the pid back immediately; nothing tracks or reaps
//!   the process afterwards beyond the runtime's orphan reaper.
//!
//! Before either mode, the raw string is screened against [`UNSAFE_PATTERNS`].
//! That screen is plain substring matching, not parsing: it blocks harmless
//! commands (`sudoku`) and misses obfuscated ones (`s''udo`). It is a
//! best-effort guard and NOT a security boundary.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

use crate::domain::error::ToolError;
use crate::domain::paths;
use crate::domain::types::{BackgroundProcess, CommandOutput, ExecOutput};
use crate::infrastructure::sandbox::Sandbox;
use crate::infrastructure::tools::process::{Captured, run_captured};

/// Substrings associated with privilege escalation or raw device/proc access.
/// Matched case-insensitively against the whole command line.
pub const UNSAFE_PATTERNS: &[&str] = &[
    "sudo", "su ", "rm -rf /", "> /dev", "< /dev", "> /proc", "< /proc", "> /sys", "< /sys",
];

/// Returns the first denylisted pattern found in `command`, if any.
pub fn unsafe_pattern(command: &str) -> Option<&'static str> {
    let lowered = command.to_lowercase();
    UNSAFE_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lowered.contains(pattern))
}

#[derive(Debug, Clone, Copy)]
pub enum CommandMode {
    Foreground { timeout: Duration },
    Background,
}

/// Interpreter for background launch scripts.
const LAUNCH_SHELL: &str = "bash";

#[derive(Debug, Clone)]
pub struct CommandRunner {
    sandbox: Arc<Sandbox>,
    shell: String,
}

impl CommandRunner {
    pub fn new(sandbox: Arc<Sandbox>) -> Self {
        Self {
            sandbox,
            shell: LAUNCH_SHELL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_shell(mut self, shell: &str) -> Self {
        self.shell = shell.to_string();
        self
    }

    pub async fn run(&self, command: &str, mode: CommandMode) -> Result<CommandOutput, ToolError> {
        if command.trim().is_empty() {
            return Err(ToolError::validation("Command is required"));
        }
        if let Some(pattern) = unsafe_pattern(command) {
            tracing::warn!("Rejected command matching denylist pattern {:?}", pattern);
            return Err(ToolError::validation(
                "Command contains potentially unsafe operations",
            ));
        }

        match mode {
            CommandMode::Foreground { timeout } => self
                .run_foreground(command, timeout)
                .await
                .map(CommandOutput::Foreground),
            CommandMode::Background => self
                .launch_background(command)
                .await
                .map(CommandOutput::Background),
        }
    }

    async fn run_foreground(&self, command: &str, timeout: Duration) -> Result<ExecOutput, ToolError> {
        let argv = shell_words::split(command)
            .map_err(|e| ToolError::validation(format!("Invalid command syntax: {e}")))?;
        let Some((program, args)) = argv.split_first() else {
            return Err(ToolError::validation("Command is required"));
        };

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(self.sandbox.root());

        match run_captured(cmd, timeout).await? {
            Captured::Exited(output) => Ok(output),
            Captured::TimedOut => Err(ToolError::ExecutionTimeout {
                subject: "Command",
                secs: timeout.as_secs(),
            }),
        }
    }

    /// A failed launch leaves neither the log nor the script behind.
    async fn launch_background(&self, command: &str) -> Result<BackgroundProcess, ToolError> {
        let root = self.sandbox.root();
        let token = paths::unique_token();
        let log_file = root.join(paths::background_log_name(&token));
        let script_file = root.join(paths::background_script_name(&token));

        match self.spawn_detached(command, &log_file, &script_file).await {
            Ok(pid) => {
                tracing::info!(
                    "Background process {} started, logging to {}",
                    pid,
                    log_file.display()
                );
                Ok(BackgroundProcess {
                    pid,
                    log_file,
                    script_file,
                })
            }
            Err(err) => {
                for path in [&log_file, &script_file] {
                    match tokio::fs::remove_file(path).await {
                        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                            tracing::warn!("Failed to remove {}: {}", path.display(), e);
                        }
                        _ => {}
                    }
                }
                Err(err)
            }
        }
    }

    async fn spawn_detached(
        &self,
        command: &str,
        log_file: &Path,
        script_file: &Path,
    ) -> Result<u32, ToolError> {
        let root = self.sandbox.root();
        // Exists (empty) before the call returns, whatever the script does.
        tokio::fs::File::create(log_file).await?;
        tokio::fs::write(script_file, launch_script(root, log_file, command)).await?;
        make_executable(script_file).await?;

        let mut cmd = Command::new(&self.shell);
        cmd.arg(script_file)
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        // SAFETY: setsid is async-signal-safe and only touches the forked child.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = cmd
            .spawn()
            .map_err(|e| ToolError::Process(format!("Failed to start background process: {e}")))?;
        child
            .id()
            .ok_or_else(|| ToolError::Process("Background process exited before reporting a pid".into()))
    }
}

fn launch_script(root: &Path, log_file: &Path, command: &str) -> String {
    let root = shell_words::quote(&root.to_string_lossy()).into_owned();
    let log = shell_words::quote(&log_file.to_string_lossy()).into_owned();
    format!("#!/bin/bash\ncd {root} || exit 1\n{{\n{command}\n}} > {log} 2>&1\n")
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
