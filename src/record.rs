//! Microphone capture.
//!
//! [`MicInput`] owns one capture stream and a cancellation pipe. `start`
//! spawns a dedicated thread running the capture loop; `stop` signals the
//! pipe and joins, blocking until the stream is drained. A source whose
//! device failed to open is a permanent no-op.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::alsa_device::{CaptureStream, StreamError, StreamErrorKind};
use crate::cancel::{CancelReceiver, CancelSender, WaitOutcome, cancel_pair};
use crate::sink::{LogicalChannel, MediaPacket, TaskSink};

/// Upper bound on one capture read, in bytes of interleaved frames.
const CAPTURE_CHUNK_BYTES: usize = 1024 * 1024;

/// Microphone capture source.
///
/// Exactly one background thread exists per instance while it is running.
/// While the thread runs it owns the stream and the cancel receiver; both
/// travel back through the join handle so the source can be restarted.
pub struct MicInput {
    stream: Option<Box<dyn CaptureStream>>,
    cancel_rx: Option<CancelReceiver>,
    cancel_tx: Option<CancelSender>,
    worker: Option<JoinHandle<(Box<dyn CaptureStream>, CancelReceiver)>>,
}

impl MicInput {
    pub(crate) fn new(stream: Option<Box<dyn CaptureStream>>) -> Self {
        let idle = Self {
            stream: None,
            cancel_rx: None,
            cancel_tx: None,
            worker: None,
        };
        if stream.is_none() {
            return idle;
        }
        match cancel_pair() {
            Ok((tx, rx)) => Self {
                stream,
                cancel_rx: Some(rx),
                cancel_tx: Some(tx),
                worker: None,
            },
            Err(e) => {
                log::error!("Failed to create cancellation pipe: {}", e);
                idle
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Spawns the capture thread, handing captured buffers to `sink`.
    ///
    /// No-op while already running (a second call never spawns a second
    /// thread) and when the device never opened.
    pub fn start(&mut self, sink: Arc<dyn TaskSink>) {
        if self.worker.is_some() {
            return;
        }
        let (stream, cancel) = match (self.stream.take(), self.cancel_rx.take()) {
            (Some(s), Some(c)) => (s, c),
            _ => return,
        };

        let spawned = thread::Builder::new().name("mic-capture".into()).spawn(
            move || -> (Box<dyn CaptureStream>, CancelReceiver) {
                let mut stream = stream;
                capture_loop(stream.as_mut(), &cancel, sink.as_ref());
                (stream, cancel)
            },
        );
        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => log::error!("Failed to spawn capture thread: {}", e),
        }
    }

    /// Signals cancellation and joins the capture thread, blocking until it
    /// has drained the stream and exited. No-op when idle.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if let Some(tx) = &self.cancel_tx {
            tx.signal();
        }
        match worker.join() {
            Ok((stream, cancel)) => {
                // A loop that ended on an error never consumed this signal.
                cancel.drain();
                self.stream = Some(stream);
                self.cancel_rx = Some(cancel);
            }
            Err(_) => log::error!("Capture thread panicked"),
        }
    }
}

impl Drop for MicInput {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop(stream: &mut dyn CaptureStream, cancel: &CancelReceiver, sink: &dyn TaskSink) {
    stream.begin();

    let geometry = stream.geometry();
    let chunk_bytes = geometry.frames_to_bytes(geometry.bytes_to_frames(CAPTURE_CHUNK_BYTES));

    log::info!(
        "Capture started: channels={}, chunk={} bytes",
        geometry.channels,
        chunk_bytes
    );

    let mut cancelled = false;
    while !cancelled {
        let mut buf = vec![0u8; chunk_bytes];
        let frames = match read_cancellable(stream, cancel, &mut buf, &mut cancelled) {
            Ok(frames) => frames,
            Err(e) if e.kind == StreamErrorKind::Suspended => {
                log::warn!("Capture stream suspended ({}), recovering...", e);
                if !stream.recover() {
                    log::error!("Failed to recover suspended capture stream");
                    break;
                }
                match read_cancellable(stream, cancel, &mut buf, &mut cancelled) {
                    Ok(frames) => frames,
                    Err(e) => {
                        log::error!("Capture read failed after recovery: {}", e);
                        break;
                    }
                }
            }
            Err(e) => {
                log::error!("Capture read failed: {}", e);
                break;
            }
        };

        if cancelled {
            // The wait observed the stop signal; nothing was read and no
            // task is submitted for this iteration.
            break;
        }

        buf.truncate(geometry.frames_to_bytes(frames));
        sink.submit(MediaPacket {
            channel: LogicalChannel::Microphone,
            timestamp: 0,
            data: buf,
        });
    }

    stream.finish();
    log::info!("Capture stopped");
}

/// Waits for readiness or cancellation, then reads. On cancellation sets
/// `cancelled` and returns a zero frame count without touching the stream.
fn read_cancellable(
    stream: &mut dyn CaptureStream,
    cancel: &CancelReceiver,
    buf: &mut [u8],
    cancelled: &mut bool,
) -> Result<usize, StreamError> {
    let outcome = cancel.wait_ready(stream.poll_source());
    match outcome {
        WaitOutcome::Cancelled => {
            *cancelled = true;
            Ok(0)
        }
        WaitOutcome::Ready => stream.read(buf),
    }
}
