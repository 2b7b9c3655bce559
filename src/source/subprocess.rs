use super::{LandmarkSource, Selection};
use crate::{error::Error, frame::Frame, landmark::LandmarkSet};
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError};
use std::{
    io::{self, BufRead, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
    time::Duration,
};
use tracing::{error, info, instrument, warn};

const READY: &str = "READY";

/// How long to wait for the child: once for `READY`, then per reply.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timeouts {
    pub(crate) ready: Duration,
    pub(crate) reply: Duration,
}

/// An estimator running as a child process.
///
/// The child must print `READY` once its model is loaded. Each frame is then
/// written to its stdin as three little-endian `u32`s (width, height,
/// channels) followed by the raw pixel bytes, and the child answers with one
/// record line on stdout.
///
/// Replies are read on a separate thread so a slow child costs a tick, not the
/// loop. While a reply is outstanding no new frame is sent; a reply that misses
/// its tick is used on a later one. The child is killed when this handle drops.
pub(crate) struct Subprocess {
    child: Child,
    stdin: ChildStdin,
    replies: Receiver<io::Result<String>>,
    selection: Selection,
    timeout: Duration,
    awaiting_reply: bool,
    exhausted: bool,
}

impl Subprocess {
    #[instrument(name = "Subprocess::spawn", skip(selection), level = "debug")]
    pub(crate) fn spawn(
        program: &str,
        args: &[String],
        selection: Selection,
        timeouts: Timeouts,
    ) -> Result<Self, Error> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::SpawnEstimator(e, program.to_owned()))?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            (None, _) => return Err(kill_on_error(child, Error::EstimatorPipe("stdin"))),
            (_, None) => return Err(kill_on_error(child, Error::EstimatorPipe("stdout"))),
        };

        let mut estimator = Self {
            child,
            stdin,
            replies: spawn_reader(stdout),
            selection,
            timeout: timeouts.reply,
            awaiting_reply: true,
            exhausted: false,
        };

        let ready = estimator.next_line(timeouts.ready).map_err(|e| match e {
            Error::EstimatorTimeout(after) => Error::EstimatorReadyTimeout(after),
            e => e,
        })?;
        if ready.trim() != READY {
            return Err(Error::EstimatorNotReady(ready));
        }
        info!(message = "landmark estimator ready", program);
        Ok(estimator)
    }

    fn next_line(&mut self, timeout: Duration) -> Result<String, Error> {
        match self.replies.recv_timeout(timeout) {
            Ok(Ok(line)) => {
                self.awaiting_reply = false;
                Ok(line)
            }
            Ok(Err(e)) => {
                self.exhausted = true;
                Err(Error::ReadRecord(e))
            }
            Err(RecvTimeoutError::Timeout) => Err(Error::EstimatorTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                self.exhausted = true;
                Err(Error::EstimatorClosed)
            }
        }
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        for value in [frame.width(), frame.height(), frame.channels()] {
            self.stdin
                .write_all(&value.to_le_bytes())
                .map_err(Error::WriteFrame)?;
        }
        self.stdin
            .write_all(frame.data())
            .map_err(Error::WriteFrame)?;
        self.stdin.flush().map_err(Error::WriteFrame)
    }
}

/// Forward stdout lines until end of file. The channel disconnects when the child closes its output.
fn spawn_reader(stdout: ChildStdout) -> Receiver<io::Result<String>> {
    let (replies_tx, replies_rx) = unbounded();
    std::thread::spawn(move || {
        let mut stdout = BufReader::new(stdout);
        loop {
            let mut line = String::new();
            let reply = match stdout.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => Ok(line),
                Err(e) => Err(e),
            };
            let failed = reply.is_err();
            if replies_tx.send(reply).is_err() || failed {
                break;
            }
        }
    });
    replies_rx
}

fn kill_on_error(mut child: Child, error: Error) -> Error {
    if let Err(kill_error) = child.kill() {
        error!(message = "failed to kill landmark estimator", error = %kill_error);
    }
    error
}

impl LandmarkSource for Subprocess {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, Error> {
        if self.exhausted {
            return Err(Error::EstimatorClosed);
        }

        if !self.awaiting_reply {
            if let Err(e) = self.write_frame(frame) {
                warn!(message = "landmark estimator stopped reading frames");
                self.exhausted = true;
                return Err(e);
            }
            self.awaiting_reply = true;
        }

        let line = self.next_line(self.timeout)?;
        self.selection.parse(&line)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Drop for Subprocess {
    fn drop(&mut self) {
        // the child may already have exited on its own
        let _ = self.child.kill();
        if let Err(error) = self.child.wait() {
            error!(message = "failed to reap landmark estimator", %error);
        }
    }
}
