//! # Process Capture
//!
//! Spawns a child with separate stdout/stderr pipes and waits for it under a
//! per-call timeout. On Unix the child leads its own process group so that a
//! timeout (or cancellation by an outer deadline) kills grandchildren too.
//! Termination is always best-effort: kill failures are swallowed.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use crate::domain::error::ToolError;
use crate::domain::types::ExecOutput;

#[derive(Debug)]
pub enum Captured {
    Exited(ExecOutput),
    TimedOut,
}

/// Runs `command` to completion or until `limit` elapses.
///
/// The caller sets program, arguments and working directory; this sets up the
/// pipes. If the returned future is dropped mid-flight, the process group is killed.
pub async fn run_captured(mut command: Command, limit: Duration) -> Result<Captured, ToolError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    // SAFETY: setpgid is async-signal-safe and only touches the forked child.
    unsafe {
        command.pre_exec(|| {
            if libc::setpgid(0, 0) == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let program = command.as_std().get_program().to_string_lossy().into_owned();
    let mut child = command
        .spawn()
        .map_err(|e| ToolError::Process(format!("Failed to spawn '{program}': {e}")))?;
    let mut group = GroupKillGuard::new(child.id());

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| ToolError::Process("stdout was not captured".to_string()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| ToolError::Process("stderr was not captured".to_string()))?;

    let mut out = Vec::new();
    let mut err = Vec::new();
    let collect = async {
        let (status, _, _) = tokio::try_join!(
            child.wait(),
            stdout.read_to_end(&mut out),
            stderr.read_to_end(&mut err),
        )?;
        Ok::<ExitStatus, std::io::Error>(status)
    };

    let waited = tokio::time::timeout(limit, collect).await;
    match waited {
        Ok(Ok(status)) => {
            group.disarm();
            Ok(Captured::Exited(ExecOutput {
                exit_code: exit_code(status),
                stdout: String::from_utf8_lossy(&out).into_owned(),
                stderr: String::from_utf8_lossy(&err).into_owned(),
            }))
        }
        Ok(Err(e)) => {
            terminate(&mut child, &mut group).await;
            Err(ToolError::Process(format!(
                "Failed to communicate with '{program}': {e}"
            )))
        }
        Err(_) => {
            terminate(&mut child, &mut group).await;
            Ok(Captured::TimedOut)
        }
    }
}

/// Kills the group, then the child itself, and reaps it.
async fn terminate(child: &mut Child, group: &mut GroupKillGuard) {
    group.kill();
    let _ = child.kill().await;
    group.disarm();
}

/// Exit code, or the negated signal number for signal deaths.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

/// SIGKILLs the child's process group when dropped while armed.
struct GroupKillGuard {
    pgid: Option<u32>,
}

impl GroupKillGuard {
    fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    fn kill(&self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            // SAFETY: killpg only sends a signal; an invalid group yields ESRCH.
            unsafe {
                libc::killpg(pgid as libc::pid_t, libc::SIGKILL);
            }
        }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupKillGuard {
    fn drop(&mut self) {
        self.kill();
    }
}
