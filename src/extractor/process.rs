// Process supervisor for external extraction workers

use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("I/O error while supervising worker: {0}")]
    Io(#[from] io::Error),
}

/// Owns a spawned child until it has been reaped.
///
/// On unix the child leads its own process group, so killing the guard
/// also takes down anything the worker forked (headless browsers, ffmpeg).
/// Dropping the guard before the child is reaped (deadline, cancelled
/// future, panic) kills the whole group.
struct ChildGuard {
    child: Child,
    program: String,
    pgid: Option<u32>,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child, program: &str) -> Self {
        Self {
            pgid: child.id(),
            child,
            program: program.to_string(),
            reaped: false,
        }
    }

    #[cfg(unix)]
    fn kill_group(&self) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pgid) = self.pgid {
            if let Err(e) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
                // ESRCH: the whole group is already gone
                tracing::debug!(program = %self.program, pgid, error = %e, "killpg failed");
            }
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}

    async fn kill(&mut self) {
        self.kill_group();
        if let Err(e) = self.child.kill().await {
            tracing::debug!(program = %self.program, error = %e, "failed to kill worker");
        }
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        tracing::debug!(program = %self.program, pid = ?self.pgid, "killing abandoned worker");
        self.kill_group();
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.start_kill();
        }
    }
}

/// Run a command to completion with a hard wall-clock deadline.
///
/// stdin is closed, stdout and stderr are collected concurrently with the
/// exit wait. On deadline the child and its process group are killed and
/// the child is reaped before returning.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    envs: &[(&str, &str)],
    deadline: Duration,
) -> Result<Output, ProcessError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .envs(envs.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let child = command
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let mut guard = ChildGuard::new(child, program);

    let mut stdout_pipe = guard
        .child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stdout was not captured"))?;
    let mut stderr_pipe = guard
        .child
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stderr was not captured"))?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let waited = timeout(deadline, async {
        let (out_res, err_res, status) = tokio::join!(
            stdout_pipe.read_to_end(&mut stdout),
            stderr_pipe.read_to_end(&mut stderr),
            guard.child.wait(),
        );
        out_res?;
        err_res?;
        status
    })
    .await;

    match waited {
        Ok(Ok(status)) => {
            guard.reaped = true;
            Ok(Output {
                status,
                stdout,
                stderr,
            })
        }
        Ok(Err(e)) => {
            guard.kill().await;
            Err(ProcessError::Io(e))
        }
        Err(_) => {
            guard.kill().await;
            Err(ProcessError::TimedOut(deadline))
        }
    }
}

/// Last `max_chars` characters of a byte stream, lossily decoded.
pub fn tail_lossy(bytes: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - max_chars).collect()
}
