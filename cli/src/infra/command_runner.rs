//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` runs commands with a closed stdin and streams their
//! stdout/stderr into the log line by line as the lines arrive, so output of
//! long-running commands interleaves live with our own log records.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info};

use crate::application::ports::{CommandResult, CommandRunner, CommandSpec};
use crate::domain::CommandError;

/// Production `CommandRunner` backed by `tokio::process`.
///
/// Children are spawned with `kill_on_drop(true)`, so cancelling a run (or
/// hitting the optional timeout) never leaves an orphaned process behind.
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
}

impl TokioCommandRunner {
    /// `timeout` of `None` lets commands run for as long as they need.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn command(cmd: &CommandSpec) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .envs(cmd.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn execute(&self, cmd: &CommandSpec) -> Result<CommandResult, CommandError> {
        let line = cmd.to_string();
        info!("Running {line}");

        let io_err = |source| CommandError::Io {
            command: line.clone(),
            source,
        };

        let mut child = Self::command(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: line.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain both pipes before wait() so a chatty child never blocks on a
        // full pipe buffer.
        let finished = async {
            let output = collect_output(stdout, stderr).await.map_err(io_err)?;
            let status = child.wait().await.map_err(io_err)?;
            Ok(CommandResult {
                status: status.code(),
                output,
            })
        };

        let outcome = match self.timeout {
            None => Some(finished.await),
            Some(limit) => tokio::select! {
                result = finished => Some(result),
                () = tokio::time::sleep(limit) => None,
            },
        };

        match outcome {
            Some(result) => result,
            None => {
                let _ = child.kill().await;
                Err(CommandError::TimedOut {
                    command: line,
                    secs: self.timeout.map_or(0, |t| t.as_secs()),
                })
            }
        }
    }

    async fn run_status(&self, cmd: &CommandSpec) -> Result<Option<i32>, CommandError> {
        let line = cmd.to_string();
        info!("Running {line}");

        let mut child = Self::command(cmd)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: line.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| CommandError::Io {
            command: line,
            source,
        })?;
        Ok(status.code())
    }
}

/// One child pipe read line by line. Partial lines stay in `buf` across
/// cancelled reads.
struct LineSource<R> {
    reader: Option<BufReader<R>>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineSource<R> {
    fn new(pipe: Option<R>) -> Self {
        Self {
            reader: pipe.map(BufReader::new),
            buf: Vec::new(),
        }
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    async fn read_line(&mut self) -> std::io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read_until(b'\n', &mut self.buf).await,
            None => Ok(0),
        }
    }

    /// Record whatever the last read produced; `n == 0` means end of stream.
    ///
    /// At end of stream `buf` may still hold a partial line left by earlier
    /// cancelled reads, so it is flushed before the pipe is closed.
    fn record(&mut self, n: usize, output: &mut String) {
        if !self.buf.is_empty() {
            self.flush(output);
        }
        if n == 0 {
            self.reader = None;
        }
    }

    fn flush(&mut self, output: &mut String) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end_matches(['\n', '\r']);
        debug!("> {text}");
        output.push_str(text);
        output.push('\n');
        self.buf.clear();
    }
}

enum Pipe {
    Stdout,
    Stderr,
}

/// Merge stdout and stderr in arrival order, logging each line at debug level.
async fn collect_output<O, E>(stdout: Option<O>, stderr: Option<E>) -> std::io::Result<String>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out = LineSource::new(stdout);
    let mut err = LineSource::new(stderr);
    let mut output = String::new();

    while out.is_open() || err.is_open() {
        let (pipe, n) = tokio::select! {
            n = out.read_line(), if out.is_open() => (Pipe::Stdout, n?),
            n = err.read_line(), if err.is_open() => (Pipe::Stderr, n?),
        };
        match pipe {
            Pipe::Stdout => out.record(n, &mut output),
            Pipe::Stderr => err.record(n, &mut output),
        }
    }
    Ok(output)
}
