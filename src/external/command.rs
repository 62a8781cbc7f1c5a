//! Process execution harness
//!
//! Runs an external command in a working directory under a timeout, hands
//! stdout/stderr chunks to a caller-supplied sink as they arrive and
//! classifies the finished run. The [`ProcessRunner`] trait is the seam
//! every git helper and concrete command goes through, so tests can swap in
//! a scripted runner.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, error, warn};

/// Timeout applied when an invocation does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

const READ_CHUNK_SIZE: usize = 8 * 1024;

// How long a pipe may stay silent after the child exited before it is left behind.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Which pipe a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    Out,
    Err,
}

impl OutputStream {
    /// Prefix used when echoing a chunk to the terminal.
    pub fn prefix(self) -> &'static str {
        match self {
            OutputStream::Out => "OUT > ",
            OutputStream::Err => "ERR > ",
        }
    }
}

/// A single external command: argv, working directory, timeout and whether a
/// non-zero exit should be reported instead of raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    argv: Vec<String>,
    working_dir: PathBuf,
    timeout: Duration,
    allow_failures: bool,
}

impl ProcessInvocation {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: DEFAULT_TIMEOUT,
            allow_failures: false,
        }
    }

    /// Build an invocation from a space separated command line such as
    /// `git checkout main`. No shell quoting is interpreted.
    pub fn from_line(line: &str) -> Self {
        Self::new(line.split_whitespace())
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn allow_failures(mut self, allow: bool) -> Self {
        self.allow_failures = allow;
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn allows_failures(&self) -> bool {
        self.allow_failures
    }

    /// The argv joined with single spaces, for logs and error messages.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }

    /// Check the invariants that must hold before anything is spawned.
    pub fn validate(&self) -> Result<(), CommandError> {
        if self.argv.is_empty() {
            return Err(CommandError::InvalidInvocation {
                message: "command line is empty".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(CommandError::InvalidInvocation {
                message: format!("timeout for `{}` must be greater than zero", self.command_line()),
            });
        }
        if !self.working_dir.is_dir() {
            return Err(CommandError::WorkingDirectoryNotFound {
                path: self.working_dir.clone(),
            });
        }
        Ok(())
    }
}

/// Everything captured from a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    /// Derived from the exit status only, never from output content.
    pub fn success(&self) -> bool {
        self.status_code == 0
    }

    pub fn trimmed_stdout(&self) -> &str {
        self.stdout.trim()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command `{command}` failed with exit status {status_code}: {stderr}")]
    ExecutionFailed {
        command: String,
        status_code: i32,
        stderr: String,
    },
    #[error("Command `{command}` timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
    #[error("Working directory does not exist: {}", path.display())]
    WorkingDirectoryNotFound { path: PathBuf },
    #[error("Invalid invocation: {message}")]
    InvalidInvocation { message: String },
    #[error("IO error: {message}")]
    Io { message: String },
}

impl CommandError {
    /// Captured stderr of a failed run, if this error carries one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::ExecutionFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Trait for executing external commands
///
/// `run` calls `on_output` on the caller's task for every chunk read from the
/// child, in arrival order. Each stream's chunks keep their own order; no
/// stricter merge across stdout and stderr is promised.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &ProcessInvocation,
        on_output: &mut (dyn for<'s> FnMut(OutputStream, &'s str) + Send),
    ) -> Result<ProcessOutcome, CommandError>;

    /// Same execution as [`ProcessRunner::run`] with output only captured.
    async fn run_silent(&self, invocation: &ProcessInvocation) -> Result<ProcessOutcome, CommandError> {
        self.run(invocation, &mut |_: OutputStream, _: &str| {}).await
    }
}

/// Real implementation on top of `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        invocation: &ProcessInvocation,
        on_output: &mut (dyn for<'s> FnMut(OutputStream, &'s str) + Send),
    ) -> Result<ProcessOutcome, CommandError> {
        invocation.validate()?;
        let command_line = invocation.command_line();
        let program = invocation.program().unwrap_or_default();

        debug!(
            command = %command_line,
            cwd = %invocation.working_dir().display(),
            timeout_ms = invocation.timeout().as_millis() as u64,
            allow_failures = invocation.allows_failures(),
            "Running command"
        );

        let mut child = Command::new(program)
            .args(invocation.args())
            .current_dir(invocation.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CommandError::CommandNotFound {
                        command: program.to_string(),
                    }
                } else {
                    CommandError::Io { message: e.to_string() }
                }
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = tokio::time::timeout(
            invocation.timeout(),
            collect_output(&mut child, stdout, stderr, on_output),
        )
        .await;

        let outcome = match finished {
            Ok(result) => result?,
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                let timeout_ms = invocation.timeout().as_millis() as u64;
                error!(command = %command_line, timeout_ms, "Command timed out and was killed");
                return Err(CommandError::Timeout {
                    command: command_line,
                    timeout_ms,
                });
            }
        };

        if outcome.success() {
            debug!(command = %command_line, "Command succeeded");
            return Ok(outcome);
        }

        if invocation.allows_failures() {
            warn!(
                command = %command_line,
                status_code = outcome.status_code,
                "Command failed, continuing because failures are allowed"
            );
            return Ok(outcome);
        }

        Err(CommandError::ExecutionFailed {
            command: command_line,
            status_code: outcome.status_code,
            stderr: outcome.stderr,
        })
    }
}

/// Read both pipes while waiting for the child, forwarding chunks as they
/// become available.
///
/// Once the child has exited, output already written is drained, but a pipe
/// kept open by a leftover background process is not waited on.
async fn collect_output<O, E>(
    child: &mut Child,
    mut stdout: Option<O>,
    mut stderr: Option<E>,
    on_output: &mut (dyn for<'s> FnMut(OutputStream, &'s str) + Send),
) -> Result<ProcessOutcome, CommandError>
where
    O: AsyncRead + Unpin + Send,
    E: AsyncRead + Unpin + Send,
{
    let mut out = StreamCapture::new(OutputStream::Out, stdout.is_none());
    let mut err = StreamCapture::new(OutputStream::Err, stderr.is_none());
    let mut out_buf = [0u8; READ_CHUNK_SIZE];
    let mut err_buf = [0u8; READ_CHUNK_SIZE];

    let status = loop {
        tokio::select! {
            read = read_chunk(&mut stdout, &mut out_buf), if !out.done => {
                let n = read.map_err(io_error)?;
                out.accept(&out_buf[..n], on_output);
            }
            read = read_chunk(&mut stderr, &mut err_buf), if !err.done => {
                let n = read.map_err(io_error)?;
                err.accept(&err_buf[..n], on_output);
            }
            status = child.wait() => break status.map_err(io_error)?,
        }
    };

    drain(&mut stdout, &mut out, &mut out_buf, on_output).await?;
    drain(&mut stderr, &mut err, &mut err_buf, on_output).await?;

    Ok(ProcessOutcome {
        status_code: status.code().unwrap_or(-1),
        stdout: out.finish(on_output),
        stderr: err.finish(on_output),
    })
}

/// Read what is left in a pipe after the child exited, giving up once the
/// pipe stays silent for [`DRAIN_GRACE`].
async fn drain<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    capture: &mut StreamCapture,
    buf: &mut [u8],
    on_output: &mut (dyn for<'s> FnMut(OutputStream, &'s str) + Send),
) -> Result<(), CommandError> {
    while !capture.done {
        match tokio::time::timeout(DRAIN_GRACE, read_chunk(reader, buf)).await {
            Ok(read) => {
                let n = read.map_err(io_error)?;
                capture.accept(&buf[..n], on_output);
            }
            Err(_) => {
                debug!(stream = ?capture.stream, "Pipe still open after exit, not waiting for it");
                break;
            }
        }
    }
    Ok(())
}

fn io_error(e: std::io::Error) -> CommandError {
    CommandError::Io { message: e.to_string() }
}

async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut Option<R>, buf: &mut [u8]) -> std::io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => Ok(0),
    }
}

/// Accumulates one stream and forwards decoded text.
///
/// A multi-byte character split across two reads is held back until the rest
/// of it arrives, so every forwarded chunk is whole UTF-8.
struct StreamCapture {
    stream: OutputStream,
    captured: Vec<u8>,
    pending: Vec<u8>,
    done: bool,
}

impl StreamCapture {
    fn new(stream: OutputStream, done: bool) -> Self {
        Self {
            stream,
            captured: Vec::new(),
            pending: Vec::new(),
            done,
        }
    }

    /// An empty chunk means EOF.
    fn accept(&mut self, chunk: &[u8], on_output: &mut (dyn for<'s> FnMut(OutputStream, &'s str) + Send)) {
        if chunk.is_empty() {
            self.done = true;
            return;
        }

        self.captured.extend_from_slice(chunk);
        self.pending.extend_from_slice(chunk);

        let ready = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => self.pending.len(),
        };
        if ready > 0 {
            let text: Vec<u8> = self.pending.drain(..ready).collect();
            on_output(self.stream, &String::from_utf8_lossy(&text));
        }
    }

    fn finish(self, on_output: &mut (dyn for<'s> FnMut(OutputStream, &'s str) + Send)) -> String {
        if !self.pending.is_empty() {
            on_output(self.stream, &String::from_utf8_lossy(&self.pending));
        }
        String::from_utf8_lossy(&self.captured).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> ProcessInvocation {
        ProcessInvocation::new(["sh", "-c", script])
    }

    #[tokio::test]
    async fn test_successful_run_captures_stdout() {
        let outcome = TokioProcessRunner.run_silent(&sh("echo hello")).await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.status_code, 0);
        assert_eq!(outcome.stdout, "hello\n");
        assert_eq!(outcome.trimmed_stdout(), "hello");
        assert!(outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_non_zero_exit_raises_with_stderr() {
        let result = TokioProcessRunner
            .run_silent(&sh("echo boom >&2; exit 3"))
            .await;

        match result {
            Err(CommandError::ExecutionFailed { status_code, stderr, .. }) => {
                assert_eq!(status_code, 3);
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("expected ExecutionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported_when_failures_allowed() {
        let invocation = sh("echo partial; echo boom >&2; exit 3").allow_failures(true);
        let outcome = TokioProcessRunner.run_silent(&invocation).await.unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.status_code, 3);
        assert_eq!(outcome.stdout, "partial\n");
        assert_eq!(outcome.stderr, "boom\n");
    }

    #[tokio::test]
    async fn test_stderr_output_does_not_decide_success() {
        let outcome = TokioProcessRunner
            .run_silent(&sh("echo warning >&2; exit 0"))
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stderr, "warning\n");
    }

    #[tokio::test]
    async fn test_timeout_is_fatal_even_when_failures_allowed() {
        for allow_failures in [false, true] {
            let invocation = ProcessInvocation::new(["sleep", "5"])
                .with_timeout(Duration::from_millis(200))
                .allow_failures(allow_failures);

            let started = std::time::Instant::now();
            let result = TokioProcessRunner.run_silent(&invocation).await;

            assert!(
                matches!(result, Err(CommandError::Timeout { timeout_ms: 200, .. })),
                "allow_failures={allow_failures}: {result:?}"
            );
            assert!(started.elapsed() < Duration::from_secs(4));
        }
    }

    #[tokio::test]
    async fn test_exit_is_not_held_up_by_background_child() {
        let invocation = sh("sleep 5 & echo done").with_timeout(Duration::from_secs(2));

        let started = std::time::Instant::now();
        let outcome = TokioProcessRunner.run_silent(&invocation).await.unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout, "done\n");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_output_written_just_before_exit_is_kept() {
        let outcome = TokioProcessRunner
            .run_silent(&sh("printf first; printf second >&2; printf last"))
            .await
            .unwrap();

        assert_eq!(outcome.stdout, "firstlast");
        assert_eq!(outcome.stderr, "second");
    }

    #[tokio::test]
    async fn test_chunks_of_one_stream_arrive_in_order() {
        let mut chunks = Vec::new();
        let outcome = TokioProcessRunner
            .run(&sh("printf A; sleep 0.2; printf B"), &mut |stream: OutputStream, chunk: &str| {
                chunks.push((stream, chunk.to_string()))
            })
            .await
            .unwrap();

        assert_eq!(
            chunks,
            vec![
                (OutputStream::Out, "A".to_string()),
                (OutputStream::Out, "B".to_string())
            ]
        );
        assert_eq!(outcome.stdout, "AB");
    }

    #[tokio::test]
    async fn test_stream_tags_follow_the_pipe() {
        let mut chunks = Vec::new();
        TokioProcessRunner
            .run(&sh("printf out; sleep 0.2; printf err >&2"), &mut |stream: OutputStream, chunk: &str| {
                chunks.push((stream, chunk.to_string()))
            })
            .await
            .unwrap();

        let out: String = chunks
            .iter()
            .filter(|(s, _)| *s == OutputStream::Out)
            .map(|(_, c)| c.as_str())
            .collect();
        let err: String = chunks
            .iter()
            .filter(|(s, _)| *s == OutputStream::Err)
            .map(|(_, c)| c.as_str())
            .collect();
        assert_eq!(out, "out");
        assert_eq!(err, "err");
    }

    #[tokio::test]
    async fn test_runs_in_the_given_working_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        let outcome = TokioProcessRunner
            .run_silent(&ProcessInvocation::new(["pwd", "-P"]).in_dir(dir.path()))
            .await
            .unwrap();

        assert_eq!(outcome.trimmed_stdout(), canonical.to_string_lossy());
    }

    #[tokio::test]
    async fn test_missing_working_directory_is_rejected() {
        let invocation = ProcessInvocation::new(["true"]).in_dir("/definitely/not/here/ghkit");
        let result = TokioProcessRunner.run_silent(&invocation).await;

        assert!(matches!(result, Err(CommandError::WorkingDirectoryNotFound { .. })));
    }

    #[tokio::test]
    async fn test_zero_timeout_and_empty_argv_are_rejected() {
        let zero = ProcessInvocation::new(["true"]).with_timeout(Duration::ZERO);
        assert!(matches!(
            TokioProcessRunner.run_silent(&zero).await,
            Err(CommandError::InvalidInvocation { .. })
        ));

        let empty = ProcessInvocation::new(Vec::<String>::new());
        assert!(matches!(
            TokioProcessRunner.run_silent(&empty).await,
            Err(CommandError::InvalidInvocation { .. })
        ));
    }

    #[tokio::test]
    async fn test_command_not_found() {
        let result = TokioProcessRunner
            .run_silent(&ProcessInvocation::new(["nonexistent_command_xyz"]))
            .await;

        assert!(matches!(result, Err(CommandError::CommandNotFound { .. })));
    }

    #[test]
    fn test_from_line_splits_on_whitespace() {
        let invocation = ProcessInvocation::from_line("git  checkout main");
        assert_eq!(invocation.argv(), ["git", "checkout", "main"]);
        assert_eq!(invocation.program(), Some("git"));
        assert_eq!(invocation.args(), ["checkout", "main"]);
        assert_eq!(invocation.timeout(), DEFAULT_TIMEOUT);
        assert!(!invocation.allows_failures());
    }

    #[test]
    fn test_split_multibyte_character_is_held_back() {
        let mut seen = Vec::new();
        let mut sink = |stream: OutputStream, chunk: &str| seen.push((stream, chunk.to_string()));
        let bytes = "é!".as_bytes();

        let mut capture = StreamCapture::new(OutputStream::Out, false);
        capture.accept(&bytes[..1], &mut sink);
        capture.accept(&bytes[1..], &mut sink);
        capture.accept(&[], &mut sink);
        assert!(capture.done);
        let captured = capture.finish(&mut sink);

        assert_eq!(captured, "é!");
        assert_eq!(seen, vec![(OutputStream::Out, "é!".to_string())]);
    }
}
