//! Spawning the emulator and reading its output.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::process::Child;
use std::process::Stdio;
use std::sync::mpsc;
use std::thread;

use super::command::LaunchCommand;
use crate::EmulatorError;

/// One line of emulator output, tagged with its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Line read from standard output.
    Stdout(String),
    /// Line read from standard error.
    Stderr(String),
}

impl OutputLine {
    /// The line without its stream tag or trailing newline.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Stdout(line) | Self::Stderr(line) => line,
        }
    }

    /// Returns `true` for standard output.
    #[must_use]
    pub const fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout(_))
    }
}

/// Starts processes and hands back their output line by line.
///
/// The verifier and the environment only talk to the emulator through this
/// trait, so tests can substitute a scripted process.
pub trait ProcessSupervisor {
    /// Per-process state.
    type Handle;

    /// Starts `command`.
    fn spawn(&mut self, command: &LaunchCommand) -> Result<Self::Handle, EmulatorError>;

    /// Blocks for the next output line; `None` once both streams are closed.
    fn read_line(&mut self, handle: &mut Self::Handle) -> Option<OutputLine>;

    /// Stops the process and returns its exit code, if it had one.
    fn terminate(&mut self, handle: Self::Handle) -> Result<Option<i32>, EmulatorError>;
}

/// [`ProcessSupervisor`] backed by real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSupervisor;

/// A child process with reader threads draining both pipes.
#[derive(Debug)]
pub struct SystemProcess {
    child: Child,
    lines: mpsc::Receiver<OutputLine>,
    output_closed: bool,
}

impl SystemProcess {
    /// OS process id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl ProcessSupervisor for SystemSupervisor {
    type Handle = SystemProcess;

    fn spawn(&mut self, command: &LaunchCommand) -> Result<SystemProcess, EmulatorError> {
        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EmulatorError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        tracing::info!(pid = child.id(), command = %command, "spawned emulator");

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader("emulator-stdout", stdout, tx.clone(), OutputLine::Stdout)?;
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader("emulator-stderr", stderr, tx, OutputLine::Stderr)?;
        }

        Ok(SystemProcess {
            child,
            lines: rx,
            output_closed: false,
        })
    }

    fn read_line(&mut self, handle: &mut SystemProcess) -> Option<OutputLine> {
        let line = handle.lines.recv().ok();
        if line.is_none() {
            handle.output_closed = true;
        }
        line
    }

    fn terminate(&mut self, mut handle: SystemProcess) -> Result<Option<i32>, EmulatorError> {
        let status = if let Some(status) = handle.child.try_wait()? {
            status
        } else if handle.output_closed {
            // Both pipes hit EOF, so the process is already exiting.
            handle.child.wait()?
        } else {
            if let Err(e) = handle.child.kill() {
                // Already exited between try_wait and kill.
                if e.kind() != std::io::ErrorKind::InvalidInput {
                    return Err(e.into());
                }
            }
            handle.child.wait()?
        };

        tracing::info!(pid = handle.child.id(), code = ?status.code(), "emulator stopped");
        Ok(status.code())
    }
}

fn spawn_reader<R, F>(
    name: &str,
    stream: R,
    tx: mpsc::Sender<OutputLine>,
    tag: F,
) -> Result<(), EmulatorError>
where
    R: Read + Send + 'static,
    F: Fn(String) -> OutputLine + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            for line in BufReader::new(stream).lines() {
                match line {
                    Ok(line) => {
                        if tx.send(tag(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("emulator pipe read failed: {e}");
                        break;
                    }
                }
            }
        })?;
    Ok(())
}

/// Line counts from [`relay_output`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    /// Lines read from standard output.
    pub stdout_lines: usize,
    /// Lines read from standard error.
    pub stderr_lines: usize,
    /// Relaying ended because a stdout line equalled the sentinel.
    pub stopped_by_sentinel: bool,
}

/// Logs emulator output until EOF or until a stdout line equals `stop_on`.
///
/// Standard output goes to `info`, standard error to `warn`. The sentinel is
/// compared after trimming trailing whitespace.
pub fn relay_output<S: ProcessSupervisor>(
    supervisor: &mut S,
    handle: &mut S::Handle,
    stop_on: Option<&str>,
) -> RelaySummary {
    let mut summary = RelaySummary::default();

    while let Some(line) = supervisor.read_line(handle) {
        match line {
            OutputLine::Stdout(ref text) => {
                summary.stdout_lines += 1;
                tracing::info!(target: "emulator", "{text}");
                if stop_on.is_some_and(|sentinel| text.trim_end() == sentinel) {
                    summary.stopped_by_sentinel = true;
                    break;
                }
            }
            OutputLine::Stderr(ref text) => {
                summary.stderr_lines += 1;
                tracing::warn!(target: "emulator", "{text}");
            }
        }
    }

    summary
}
