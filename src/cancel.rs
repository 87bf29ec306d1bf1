//! Pipe-based cancellation for the capture thread's readiness wait.
//!
//! One byte written to the pipe is one cancellation signal. The reader side
//! is polled alongside the stream's own descriptors, so a thread blocked in
//! [`CancelReceiver::wait_ready`] wakes immediately when
//! [`CancelSender::signal`] is called. A signal sent while nobody is waiting
//! stays in the pipe and is observed by the next wait.

use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;

use alsa::poll::{Descriptors, Flags};

/// Which condition ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    /// The stream has data ready.
    Ready,
    /// The cancellation signal was observed (and consumed).
    Cancelled,
}

pub(crate) struct CancelSender(UnixStream);

pub(crate) struct CancelReceiver(UnixStream);

/// Creates a connected sender/receiver pair. Single writer, single reader.
pub(crate) fn cancel_pair() -> std::io::Result<(CancelSender, CancelReceiver)> {
    let (tx, rx) = UnixStream::pair()?;
    rx.set_nonblocking(true)?;
    Ok((CancelSender(tx), CancelReceiver(rx)))
}

impl CancelSender {
    /// Wakes at most one blocked waiter. Safe to call from any thread,
    /// with or without a waiter present.
    pub fn signal(&self) {
        if let Err(e) = (&self.0).write_all(&[1u8]) {
            log::error!("Failed to signal cancellation: {}", e);
        }
    }
}

impl CancelReceiver {
    /// Blocks until `source` reports data readiness or the channel is
    /// signalled, whichever happens first. No timeout; cancellation is
    /// always eventually deliverable.
    ///
    /// Descriptor or poll failures are logged and reported as `Ready` so
    /// that the caller's next read surfaces the underlying error.
    pub fn wait_ready(&self, source: &dyn Descriptors) -> WaitOutcome {
        let count = source.count();
        let mut fds = vec![
            libc::pollfd {
                fd: -1,
                events: 0,
                revents: 0,
            };
            count + 1
        ];
        let filled = match source.fill(&mut fds[..count]) {
            Ok(n) => n,
            Err(e) => {
                log::error!("Failed to collect stream poll descriptors: {}", e);
                return WaitOutcome::Ready;
            }
        };
        fds.truncate(filled + 1);
        fds[filled] = libc::pollfd {
            fd: self.0.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        loop {
            if let Err(e) = alsa::poll::poll(&mut fds, -1) {
                if e.errno() == libc::EINTR {
                    continue;
                }
                log::error!("Readiness poll failed: {}", e);
                return WaitOutcome::Ready;
            }

            if fds[filled].revents & libc::POLLIN != 0 {
                let mut token = [0u8; 1];
                let _ = (&self.0).read(&mut token);
                return WaitOutcome::Cancelled;
            }

            match source.revents(&fds[..filled]) {
                Ok(flags) if flags.contains(Flags::IN) => return WaitOutcome::Ready,
                Ok(_) => {} // spurious wakeup
                Err(e) => {
                    log::error!("Failed to decode stream poll events: {}", e);
                    return WaitOutcome::Ready;
                }
            }
        }
    }

    /// Discards any signal that was never observed, so the next run cycle
    /// does not start pre-cancelled.
    pub fn drain(&self) {
        let mut token = [0u8; 1];
        while matches!((&self.0).read(&mut token), Ok(n) if n > 0) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::PipeSource;
    use std::time::{Duration, Instant};

    #[test]
    fn signal_before_wait_is_observed() {
        let (tx, rx) = cancel_pair().unwrap();
        let source = PipeSource::new();
        tx.signal();
        assert_eq!(rx.wait_ready(&source), WaitOutcome::Cancelled);
    }

    #[test]
    fn ready_source_wins_without_signal() {
        let (_tx, rx) = cancel_pair().unwrap();
        let source = PipeSource::new();
        source.make_ready();
        assert_eq!(rx.wait_ready(&source), WaitOutcome::Ready);
    }

    #[test]
    fn signal_wakes_blocked_waiter() {
        let (tx, rx) = cancel_pair().unwrap();
        let handle = std::thread::spawn(move || {
            let source = PipeSource::new();
            let started = Instant::now();
            let outcome = rx.wait_ready(&source);
            (outcome, started.elapsed())
        });
        std::thread::sleep(Duration::from_millis(50));
        tx.signal();
        let (outcome, waited) = handle.join().unwrap();
        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(waited >= Duration::from_millis(40));
    }

    #[test]
    fn each_signal_is_consumed_once() {
        let (tx, rx) = cancel_pair().unwrap();
        let source = PipeSource::new();
        tx.signal();
        assert_eq!(rx.wait_ready(&source), WaitOutcome::Cancelled);
        // The consumed signal must not cancel the next wait.
        source.make_ready();
        assert_eq!(rx.wait_ready(&source), WaitOutcome::Ready);
    }

    #[test]
    fn drain_clears_stale_signal() {
        let (tx, rx) = cancel_pair().unwrap();
        let source = PipeSource::new();
        tx.signal();
        rx.drain();
        source.make_ready();
        assert_eq!(rx.wait_ready(&source), WaitOutcome::Ready);
    }
}
