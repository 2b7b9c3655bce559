//! Camera reads off the render thread.
//!
//! A capture thread owns the frame source and pushes into a single-slot
//! channel, replacing any frame the consumer has not picked up yet. The
//! consumer only ever sees the most recent frame, in capture order.

use crate::{
    error::Error,
    frame::{Frame, FrameSource},
};
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, TrySendError};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::Duration,
};
use tracing::{debug, error};

pub(crate) struct Threaded {
    frames: Receiver<Result<Frame, Error>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    timeout: Duration,
}

impl Threaded {
    /// Move `source` onto a capture thread. `timeout` bounds how long a tick
    /// waits for a frame before giving up on it.
    pub(crate) fn spawn<F>(mut source: F, timeout: Duration) -> Self
    where
        F: FrameSource + Send + 'static,
    {
        let (frames_tx, frames_rx) = bounded(1);
        let stale_rx = frames_rx.clone();
        let running = Arc::new(AtomicBool::new(true));
        let running_capture = running.clone();

        let handle = std::thread::spawn(move || {
            while running_capture.load(Ordering::SeqCst) {
                let mut frame = source.read();
                loop {
                    match frames_tx.try_send(frame) {
                        Ok(()) => break,
                        Err(TrySendError::Full(unsent)) => {
                            if stale_rx.try_recv().is_ok() {
                                debug!(message = "dropped stale frame");
                            }
                            frame = unsent;
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            source.close();
                            return;
                        }
                    }
                }
            }
            source.close();
        });

        Self {
            frames: frames_rx,
            running,
            handle: Some(handle),
            timeout,
        }
    }
}

impl FrameSource for Threaded {
    fn read(&mut self) -> Result<Frame, Error> {
        match self.frames.recv_timeout(self.timeout) {
            Ok(frame) => frame,
            Err(RecvTimeoutError::Timeout) => Err(Error::NoFrameReady),
            Err(RecvTimeoutError::Disconnected) => Err(Error::CaptureDisconnected),
        }
    }

    fn close(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            while self.frames.try_recv().is_ok() {}
            if handle.join().is_err() {
                error!(message = "capture thread panicked");
            }
        }
    }
}

impl Drop for Threaded {
    fn drop(&mut self) {
        self.close();
    }
}
