use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::protocol::Command;
use crate::error::EngineError;

/// Stops an engine from outside the thread blocked on it.
pub type EngineKiller = Box<dyn Fn() + Send>;

/// A bidirectional line stream to an engine.
pub trait EngineTransport: Send {
    /// Write one line (the newline is appended by the transport).
    fn send_line(&mut self, line: &str) -> std::io::Result<()>;

    /// Block until one line arrives. `Ok(None)` means the stream is closed.
    fn read_line(&mut self) -> std::io::Result<Option<String>>;

    /// Whether the other end is still running.
    fn is_alive(&mut self) -> bool;

    /// Release the underlying resource.
    fn shutdown(&mut self) {}

    /// Handle that unblocks a pending `read_line` by ending the engine.
    fn killer(&self) -> Option<EngineKiller> {
        None
    }
}

/// Engine running as a child process speaking over stdin/stdout.
pub struct ProcessTransport {
    path: PathBuf,
    child: Arc<Mutex<Child>>,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessTransport {
    /// Launch the engine executable with the given arguments.
    pub fn spawn(path: &Path, args: &[String]) -> Result<Self, EngineError> {
        let mut child = ProcessCommand::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(EngineError::MissingPipe("stdout"))?;

        info!(path = %path.display(), pid = child.id(), "engine process started");
        Ok(ProcessTransport {
            path: path.to_path_buf(),
            child: Arc::new(Mutex::new(child)),
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

fn lock_child(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EngineTransport for ProcessTransport {
    fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.stdin, "{}", line)?;
        self.stdin.flush()
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut buf = String::new();
        if self.stdout.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf))
    }

    fn is_alive(&mut self) -> bool {
        matches!(lock_child(&self.child).try_wait(), Ok(None))
    }

    fn shutdown(&mut self) {
        let mut child = lock_child(&self.child);
        if let Err(e) = child.kill() {
            debug!(error = %e, "engine already stopped");
        }
        match child.wait() {
            Ok(status) => info!(path = %self.path.display(), %status, "engine process exited"),
            Err(e) => warn!(error = %e, "failed to reap engine process"),
        }
    }

    fn killer(&self) -> Option<EngineKiller> {
        let child = Arc::clone(&self.child);
        Some(Box::new(move || {
            let mut child = lock_child(&child);
            match child.kill() {
                Ok(()) => info!(pid = child.id(), "engine process killed"),
                Err(e) => debug!(error = %e, "engine already stopped"),
            }
        }))
    }
}

/// Strict request/response client: one command out, at most one line back.
///
/// Once the engine is gone every send is a no-op and every read yields an
/// empty string, which callers treat as "nothing happened".
pub struct EngineClient {
    transport: Box<dyn EngineTransport>,
}

impl EngineClient {
    pub fn new(transport: Box<dyn EngineTransport>) -> Self {
        EngineClient { transport }
    }

    /// Spawn a process-backed engine.
    pub fn spawn(path: &Path, args: &[String]) -> Result<Self, EngineError> {
        Ok(Self::new(Box::new(ProcessTransport::spawn(path, args)?)))
    }

    pub fn is_alive(&mut self) -> bool {
        self.transport.is_alive()
    }

    pub fn killer(&self) -> Option<EngineKiller> {
        self.transport.killer()
    }

    /// Send a command that has no reply.
    pub fn notify(&mut self, command: Command) {
        if !self.transport.is_alive() {
            debug!(%command, "engine not running, dropping command");
            return;
        }
        if let Err(e) = self.transport.send_line(&command.to_string()) {
            warn!(%command, error = %e, "failed to write to engine");
        }
    }

    /// Send a command and block for its reply line, trimmed.
    pub fn request(&mut self, command: Command) -> String {
        if !command.expects_reply() {
            self.notify(command);
            return String::new();
        }
        if !self.transport.is_alive() {
            debug!(%command, "engine not running, empty reply");
            return String::new();
        }
        if let Err(e) = self.transport.send_line(&command.to_string()) {
            warn!(%command, error = %e, "failed to write to engine");
            return String::new();
        }
        match self.transport.read_line() {
            Ok(Some(line)) => {
                let line = line.trim().to_string();
                debug!(%command, reply = %line, "engine replied");
                line
            }
            Ok(None) => {
                warn!(%command, "engine closed its output");
                String::new()
            }
            Err(e) => {
                warn!(%command, error = %e, "failed to read from engine");
                String::new()
            }
        }
    }

    /// Ask the engine to exit and release the process.
    pub fn close(&mut self) {
        self.notify(Command::Quit);
        self.transport.shutdown();
    }
}
