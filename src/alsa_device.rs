//! ALSA PCM device wrappers for audio capture and playback.
//!
//! The data path talks to streams through the [`PlaybackStream`] and
//! [`CaptureStream`] seams; `AlsaPlayback`/`AlsaCapture` are the hardware
//! implementations. Read/write failures are classified into [`StreamError`]
//! so the loop policies can tell a recoverable xrun or suspend apart from a
//! terminal fault.

use std::fmt;

use alsa::pcm::{Access, Format, HwParams, PCM};
use alsa::poll::Descriptors;
use alsa::{Direction, ValueOr};
use anyhow::{Context, Result};

use crate::config::StreamProfile;
use crate::frame::Geometry;

/// Classification of a failed stream read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamErrorKind {
    /// Buffer underrun or overrun
    Xrun,
    /// Stream suspended by the hardware or power management
    Suspended,
    Other,
}

#[derive(Debug)]
pub(crate) struct StreamError {
    pub kind: StreamErrorKind,
    pub message: String,
}

impl StreamError {
    #[cfg(test)]
    pub fn new(kind: StreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn from_alsa(err: &alsa::Error) -> Self {
        let kind = if err.errno() == libc::EPIPE {
            StreamErrorKind::Xrun
        } else if err.errno() == libc::ESTRPIPE {
            StreamErrorKind::Suspended
        } else {
            StreamErrorKind::Other
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Write path of one open playback stream.
pub(crate) trait PlaybackStream: Send {
    fn geometry(&self) -> Geometry;

    /// Writes interleaved S16LE bytes; returns the number of frames accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError>;

    /// One-shot recovery after a failed write; true when the stream is
    /// usable again.
    fn recover(&mut self) -> bool;
}

/// Read path of one open capture stream.
pub(crate) trait CaptureStream: Send {
    fn geometry(&self) -> Geometry;

    /// Resets the stream to a ready state at the start of a run cycle.
    fn begin(&mut self);

    /// Readiness descriptors for the cancellable wait.
    fn poll_source(&self) -> &dyn Descriptors;

    /// Reads up to `buf.len()` bytes worth of frames; returns the number of
    /// frames read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;

    /// One-shot recovery after a suspended read; true on success.
    fn recover(&mut self) -> bool;

    /// Drops buffered frames at the end of a run cycle, leaving the stream
    /// ready to be restarted or closed.
    fn finish(&mut self);
}

pub(crate) struct AlsaPlayback {
    pcm: PCM,
    geometry: Geometry,
    last_error: Option<alsa::Error>,
}

impl AlsaPlayback {
    pub fn open(device: &str, profile: StreamProfile) -> Result<Self> {
        let pcm = PCM::new(device, Direction::Playback, false)
            .with_context(|| format!("Failed to open PCM device '{device}' for Playback"))?;
        configure(&pcm, profile, "Playback")?;
        pcm.prepare().context("Failed to prepare playback stream")?;

        Ok(Self {
            pcm,
            geometry: profile.geometry(),
            last_error: None,
        })
    }
}

impl PlaybackStream for AlsaPlayback {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, StreamError> {
        match self.pcm.io_bytes().writei(buf) {
            Ok(frames) => Ok(frames),
            Err(e) => {
                let classified = StreamError::from_alsa(&e);
                self.last_error = Some(e);
                Err(classified)
            }
        }
    }

    fn recover(&mut self) -> bool {
        match self.last_error.take() {
            Some(e) => self.pcm.try_recover(e, true).is_ok(),
            None => false,
        }
    }
}

pub(crate) struct AlsaCapture {
    pcm: PCM,
    geometry: Geometry,
    last_error: Option<alsa::Error>,
}

impl AlsaCapture {
    pub fn open(device: &str, profile: StreamProfile) -> Result<Self> {
        // Non-blocking: reads are gated on the poll-based readiness wait.
        let pcm = PCM::new(device, Direction::Capture, true)
            .with_context(|| format!("Failed to open PCM device '{device}' for Capture"))?;
        configure(&pcm, profile, "Capture")?;

        // Park the stream until a run cycle begins.
        pcm.prepare().context("Failed to prepare capture stream")?;
        pcm.drop().context("Failed to park capture stream")?;

        Ok(Self {
            pcm,
            geometry: profile.geometry(),
            last_error: None,
        })
    }
}

impl CaptureStream for AlsaCapture {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn begin(&mut self) {
        if let Err(e) = self.pcm.prepare() {
            log::error!("Failed to prepare capture stream: {}", e);
        }
        if let Err(e) = self.pcm.start() {
            log::error!("Failed to start capture stream: {}", e);
        }
    }

    fn poll_source(&self) -> &dyn Descriptors {
        &self.pcm
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        match self.pcm.io_bytes().readi(buf) {
            Ok(frames) => Ok(frames),
            Err(e) => {
                let classified = StreamError::from_alsa(&e);
                self.last_error = Some(e);
                Err(classified)
            }
        }
    }

    fn recover(&mut self) -> bool {
        match self.last_error.take() {
            Some(e) => self.pcm.try_recover(e, false).is_ok(),
            None => false,
        }
    }

    fn finish(&mut self) {
        if let Err(e) = self.pcm.drop() {
            log::error!("Failed to drop capture stream: {}", e);
        }
    }
}

fn configure(pcm: &PCM, profile: StreamProfile, dir_name: &str) -> Result<()> {
    {
        let hwp = HwParams::any(pcm).with_context(|| "Failed to initialize HwParams")?;
        hwp.set_access(Access::RWInterleaved)?;
        hwp.set_format(Format::S16LE)?;
        hwp.set_channels(profile.channels)?;
        hwp.set_rate_near(profile.sample_rate, ValueOr::Nearest)?;
        hwp.set_buffer_time_near(profile.latency_us, ValueOr::Nearest)?;
        pcm.hw_params(&hwp)?;
    }

    // Read back actual negotiated parameters
    let hwp = pcm.hw_params_current()?;
    log::info!(
        "ALSA {}: rate={}, channels={}, buffer_size={}",
        dir_name,
        hwp.get_rate()?,
        hwp.get_channels()?,
        hwp.get_buffer_size()?,
    );

    Ok(())
}
