//! Real command execution implementation.

use crate::error::{Error, Result};
use crate::traits::{CommandLine, CommandOutput, CommandRequest, CommandRunner};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// ETXTBSY error code (errno 26 on Linux).
/// This error occurs when trying to execute a file that is currently being written.
const ETXTBSY: i32 = 26;

/// How often a child with a timeout is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn a command with retry logic for ETXTBSY errors.
///
/// ETXTBSY ("Text file busy") can occur on overlay filesystems (like Docker)
/// when executing a script that was just created. A brief retry usually succeeds.
fn spawn_with_etxtbsy_retry<F>(mut spawn_fn: F) -> std::io::Result<Child>
where
    F: FnMut() -> std::io::Result<Child>,
{
    loop {
        match spawn_fn() {
            Ok(child) => return Ok(child),
            Err(e) if e.raw_os_error() == Some(ETXTBSY) => {
                std::thread::sleep(Duration::from_millis(1));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Build the `std::process::Command` for a request.
fn build_command(request: &CommandRequest) -> Result<Command> {
    let mut command = match &request.command {
        CommandLine::Shell(line) => {
            let mut command = Command::new("sh");
            command.arg("-c").arg(line);
            command
        }
        CommandLine::Args { program, args } => {
            let mut command = Command::new(program);
            command.args(args);
            command
        }
    };

    if let Some(cwd) = &request.cwd {
        command.current_dir(cwd.resolve()?);
    }

    // Overlay on the inherited environment rather than replacing it.
    command.envs(&request.extra_env);

    if request.capture {
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
    }
    Ok(command)
}

/// Read a pipe to the end on a helper thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

/// Wait for the child, killing it once `timeout` has elapsed.
///
/// Returns `None` if the child was killed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Real command runner that spawns processes.
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    /// Create a new command runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommandRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput> {
        let mut command = build_command(request)?;
        let mut child = spawn_with_etxtbsy_retry(|| command.spawn())?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match request.timeout {
            Some(timeout) => match wait_with_deadline(&mut child, timeout)? {
                Some(status) => status,
                // Readers are left detached: grandchildren of a shell may
                // still hold the pipes open.
                None => {
                    return Err(Error::CommandTimeout {
                        command: request.command.to_string(),
                        timeout_secs: timeout.as_secs(),
                    })
                }
            },
            None => child.wait()?,
        };

        let collect = |reader: Option<JoinHandle<Vec<u8>>>| {
            reader.and_then(|handle| handle.join().ok()).unwrap_or_default()
        };

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}
