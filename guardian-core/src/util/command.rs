//! Blocking process execution with captured output and an optional timeout.
//!
//! Every external-tool invocation in guardian-core goes through [`run_command`].
//! stdout and stderr are drained on reader threads so a chatty ffmpeg cannot
//! fill a pipe and stall, while the calling thread polls for exit and kills the
//! child once the timeout expires.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};

use log::{debug, error};

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Runs `cmd` to completion, returning its output regardless of exit status.
///
/// `name` is a short human label (e.g. "ffprobe (duration)") used in logs and
/// errors. When `timeout` elapses the child is killed and
/// [`CoreError::CommandTimeout`] is returned.
pub fn run_command(cmd: &mut Command, name: &str, timeout: Option<Duration>) -> CoreResult<CommandOutput> {
    debug!("Running {name}: {cmd:?}");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            error!("Failed to spawn {name}: {e}");
            command_start_error(name, e)
        })?;

    let stdout_handle = child.stdout.take().map(|out| spawn_reader(out, name, "stdout"));
    let stderr_handle = child.stderr.take().map(|err| spawn_reader(err, name, "stderr"));

    let status = match timeout {
        Some(limit) => {
            let started = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) if started.elapsed() >= limit => {
                        error!("{name} exceeded {}s, killing it", limit.as_secs());
                        if let Err(e) = child.kill() {
                            error!("Failed to kill {name}: {e}");
                        }
                        let _ = child.wait();
                        let _ = join_reader(stdout_handle);
                        let _ = join_reader(stderr_handle);
                        return Err(CoreError::CommandTimeout(name.to_string(), limit.as_secs()));
                    }
                    Ok(None) => thread::sleep(POLL_INTERVAL),
                    Err(e) => return Err(command_wait_error(name, e)),
                }
            }
        }
        None => child.wait().map_err(|e| command_wait_error(name, e))?,
    };

    let output = CommandOutput {
        status,
        stdout: join_reader(stdout_handle),
        stderr: join_reader(stderr_handle),
    };

    debug!("{name} finished with {}", output.status);
    Ok(output)
}

/// Like [`run_command`], but a non-zero exit becomes [`CoreError::CommandFailed`].
pub fn run_command_checked(cmd: &mut Command, name: &str, timeout: Option<Duration>) -> CoreResult<CommandOutput> {
    let output = run_command(cmd, name, timeout)?;
    if !output.success() {
        error!("{name} failed with {}: {}", output.status, last_lines(&output.stderr, 5));
        return Err(command_failed_error(name, output.status, last_lines(&output.stderr, 20)));
    }
    Ok(output)
}

fn spawn_reader<R: Read + Send + 'static>(stream: R, name: &str, label: &'static str) -> JoinHandle<Vec<String>> {
    let name = name.to_string();
    thread::spawn(move || {
        let mut lines = Vec::new();
        for line in BufReader::new(stream).lines().map_while(Result::ok) {
            log::trace!("{name} {label}: {line}");
            lines.push(line);
        }
        lines
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<String>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|lines| lines.join("\n"))
        .unwrap_or_default()
}

/// Returns the last `count` lines of `text`; ffmpeg puts the useful part of a
/// failure at the end of a long stderr transcript.
pub fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
