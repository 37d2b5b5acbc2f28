//! Interpreter process supervision.
//!
//! A [`ProcessBridge`] runs one interpreter process per call in one of three
//! modes:
//!
//! - **buffered** ([`ProcessBridge::execute`]): wait for exit, then parse the
//!   whole of stdout as one JSON document;
//! - **streaming** ([`ProcessBridge::spawn_stream`]): feed stdin and decode
//!   stdout record by record while the process runs;
//! - **write-only** ([`ProcessBridge::run_write_only`]): feed stdin and report
//!   only whether the process succeeded.
//!
//! Each call owns its child and all three pipes. Nothing is shared between
//! calls.

use crate::config::RegeditConfig;
use crate::encoder::{write_tokens, WIN_EOL};
use crate::error::{RegeditError, Result};
use crate::slicer::{Records, TrailingSlice};
use serde_json::Value;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Keeps `cscript.exe` from opening a console window for GUI hosts.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

type WriterHandle = JoinHandle<io::Result<()>>;

/// Launches and supervises interpreter processes.
#[derive(Debug, Clone)]
pub struct ProcessBridge {
    interpreter: PathBuf,
    launcher_args: Vec<OsString>,
    trailing: TrailingSlice,
}

impl ProcessBridge {
    /// Creates a bridge from configuration.
    pub fn new(config: &RegeditConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            launcher_args: config.launcher_args.clone(),
            trailing: config.trailing_slice,
        }
    }

    fn program(&self) -> String {
        self.interpreter.display().to_string()
    }

    fn command(&self, args: &[OsString]) -> Command {
        debug!(program = %self.interpreter.display(), ?args, "building script command");
        let mut cmd = Command::new(&self.interpreter);
        cmd.args(&self.launcher_args).args(args);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt as _;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }

    /// Runs a script to completion and parses its stdout as one JSON document.
    ///
    /// # Errors
    ///
    /// - [`RegeditError::Spawn`] if the interpreter cannot be started
    /// - [`RegeditError::Script`] or [`RegeditError::UnknownExitCode`] on a
    ///   nonzero exit, whatever stdout holds
    /// - [`RegeditError::Stderr`] if the exit code is zero but stderr is not
    ///   empty
    /// - [`RegeditError::Parse`] if stdout is not valid JSON
    pub fn execute(&self, args: &[OsString]) -> Result<Value> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| RegeditError::spawn(self.program(), e))?;

        debug!(status = ?output.status, "script process exited");

        if !output.status.success() {
            log_diagnostics(&output.stdout, &output.stderr);
            return Err(match output.status.code() {
                Some(code) => RegeditError::from_exit_code(code),
                None => RegeditError::Terminated,
            });
        }

        if !output.stderr.is_empty() {
            return Err(RegeditError::Stderr(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        debug!(bytes = output.stdout.len(), "parsing script output");
        serde_json::from_slice(&output.stdout).map_err(|e| RegeditError::parse(e, &output.stdout))
    }

    /// Starts a script that streams one JSON record per output line.
    ///
    /// `tokens` are written to the script's stdin on a separate thread. The
    /// script's stderr goes straight to this process's stderr.
    ///
    /// # Errors
    ///
    /// Returns [`RegeditError::Spawn`] if the interpreter cannot be started.
    /// Later failures are reported through the returned stream.
    pub fn spawn_stream(&self, args: &[OsString], tokens: Vec<String>) -> Result<RecordStream> {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| RegeditError::spawn(self.program(), e))?;

        let stdin = take_pipe(child.stdin.take(), &mut child, "stdin")?;
        let stdout = take_pipe(child.stdout.take(), &mut child, "stdout")?;
        debug!(pid = child.id(), "streaming script started");

        let writer = thread::spawn(move || write_tokens(&tokens, stdin));

        Ok(RecordStream {
            child,
            records: Records::new(stdout, WIN_EOL, self.trailing),
            writer: Some(writer),
            finished: false,
        })
    }

    /// Runs a script that takes its input on stdin and returns no payload.
    ///
    /// Stdout is discarded. Anything the script writes to stderr is logged.
    ///
    /// # Errors
    ///
    /// Returns [`RegeditError::Spawn`] if the interpreter cannot be started,
    /// otherwise the outcome of [`close_outcome`].
    pub fn run_write_only(&self, args: &[OsString], tokens: Vec<String>) -> Result<()> {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RegeditError::spawn(self.program(), e))?;

        let stdin = take_pipe(child.stdin.take(), &mut child, "stdin")?;
        let mut stderr = take_pipe(child.stderr.take(), &mut child, "stderr")?;
        debug!(pid = child.id(), "write script started");

        let writer = thread::spawn(move || write_tokens(&tokens, stdin));
        let reader = thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });

        let status = child.wait()?;
        debug!(?status, "script process exited");

        let early = join_writer(writer);
        match reader.join() {
            Ok(Ok(buf)) => log_diagnostics(&[], &buf),
            Ok(Err(e)) => debug!(error = %e, "failed to read script stderr"),
            Err(_) => debug!("stderr reader thread panicked"),
        }

        close_outcome(early, status.code())
    }
}

/// Decides how a write-only call ends once its process has closed.
///
/// An early low-level error wins over the exit code. Otherwise a nonzero code
/// is mapped through the error table, falling back to
/// [`RegeditError::UnknownExitCode`]. A missing code means the process was
/// killed by a signal. Early errors are never looked up in the table: OS
/// error numbers share no namespace with script exit codes.
pub fn close_outcome(early_error: Option<io::Error>, exit_code: Option<i32>) -> Result<()> {
    if let Some(e) = early_error {
        debug!(error = %e, "process error");
        return Err(RegeditError::Io(e));
    }

    debug!(?exit_code, "process exit");
    match exit_code {
        Some(0) => Ok(()),
        Some(code) => Err(RegeditError::from_exit_code(code)),
        None => Err(RegeditError::Terminated),
    }
}

/// Lazy sequence of records from a streaming script.
///
/// Yields one item per output line, in the order the script wrote them. After
/// stdout closes the child is reaped; a nonzero exit or a failed stdin write
/// is yielded as one final error. The stream cannot be restarted.
///
/// Dropping the stream before it ends kills the script.
pub struct RecordStream {
    child: Child,
    records: Records<ChildStdout>,
    writer: Option<WriterHandle>,
    finished: bool,
}

impl RecordStream {
    /// Returns the OS process id of the script.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    fn finish(&mut self) -> Result<()> {
        let early = self.writer.take().and_then(join_writer);
        let status = self.child.wait()?;
        close_outcome(early, status.code())
    }
}

impl Iterator for RecordStream {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(record) = self.records.next() {
            return Some(record);
        }
        self.finished = true;
        self.finish().err().map(Err)
    }
}

impl Drop for RecordStream {
    fn drop(&mut self) {
        if !self.finished {
            debug!(pid = self.child.id(), "stream dropped early, killing script");
            if let Err(e) = self.child.kill() {
                debug!(error = %e, "failed to kill script");
            }
            let _ = self.child.wait();
        }
        if let Some(writer) = self.writer.take() {
            let _ = join_writer(writer);
        }
    }
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream")
            .field("pid", &self.child.id())
            .field("finished", &self.finished)
            .finish()
    }
}

/// Waits for a stdin writer. A broken pipe only means the script stopped
/// reading, so it is not reported.
fn join_writer(writer: WriterHandle) -> Option<io::Error> {
    match writer.join() {
        Ok(Ok(())) => None,
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("script closed stdin before all tokens were written");
            None
        }
        Ok(Err(e)) => Some(e),
        Err(_) => Some(io::Error::new(
            io::ErrorKind::Other,
            "stdin writer thread panicked",
        )),
    }
}

fn take_pipe<T>(pipe: Option<T>, child: &mut Child, name: &str) -> Result<T> {
    match pipe {
        Some(pipe) => Ok(pipe),
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(RegeditError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("script {} was not captured", name),
            )))
        }
    }
}

fn log_diagnostics(stdout: &[u8], stderr: &[u8]) {
    if !stdout.is_empty() {
        warn!(stdout = %String::from_utf8_lossy(stdout), "script stdout");
    }
    if !stderr.is_empty() {
        warn!(stderr = %String::from_utf8_lossy(stderr), "script stderr");
    }
}
