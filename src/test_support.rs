//! Test fixtures shared across unit tests.

use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;

use alsa::poll::{Descriptors, Flags};

/// A pipe-backed stand-in for a PCM's readiness descriptors.
///
/// Writing a byte with [`make_ready`](Self::make_ready) makes the source
/// poll as readable, the way a capture stream does when frames arrive.
pub(crate) struct PipeSource {
    rx: UnixStream,
    tx: UnixStream,
}

impl PipeSource {
    pub fn new() -> Self {
        let (tx, rx) = UnixStream::pair().expect("socketpair");
        rx.set_nonblocking(true).expect("nonblocking");
        Self { rx, tx }
    }

    /// Marks the source as having data ready.
    pub fn make_ready(&self) {
        (&self.tx).write_all(&[1u8]).expect("make_ready");
    }

    /// Consumes one readiness token, as a stream read would.
    pub fn consume_ready(&self) {
        let mut token = [0u8; 1];
        let _ = (&self.rx).read(&mut token);
    }

    /// A second handle to the readiness writer, for tests that hand the
    /// source itself to another thread.
    pub fn ready_writer(&self) -> UnixStream {
        self.tx.try_clone().expect("clone ready writer")
    }
}

pub(crate) fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl Descriptors for PipeSource {
    fn count(&self) -> usize {
        1
    }

    fn fill(&self, p: &mut [libc::pollfd]) -> alsa::Result<usize> {
        p[0] = libc::pollfd {
            fd: self.rx.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        Ok(1)
    }

    fn revents(&self, p: &[libc::pollfd]) -> alsa::Result<Flags> {
        Ok(Flags::from_bits_truncate(p[0].revents))
    }
}
