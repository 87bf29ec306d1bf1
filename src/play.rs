//! Playback write path.
//!
//! A [`PlaybackSink`] wraps one playback stream and pushes interleaved
//! S16LE bytes to it synchronously, recovering from an xrun at most once
//! per write. [`AudioOutput`] bundles the two independent playback sinks
//! the protocol layer drives.

use crate::alsa_device::PlaybackStream;
use crate::sink::LogicalChannel;

/// Synchronous write path for one playback stream.
///
/// A sink whose device failed to open carries no stream; every write on it
/// is a silent no-op. Calls block the caller for up to the stream's
/// configured buffer latency; there is no internal queueing.
pub struct PlaybackSink {
    channel: LogicalChannel,
    stream: Option<Box<dyn PlaybackStream>>,
}

impl PlaybackSink {
    pub(crate) fn new(channel: LogicalChannel, stream: Option<Box<dyn PlaybackStream>>) -> Self {
        Self { channel, stream }
    }

    /// Writes `buf` to the stream, converted to whole frames.
    ///
    /// A failed write triggers one recovery and, if that succeeds, one
    /// retry; a second failure abandons the buffer. A short write is
    /// logged and otherwise ignored.
    pub fn write(&mut self, buf: &[u8]) {
        if let Some((expected, written)) = self.write_frames(buf) {
            if written < expected {
                log::warn!(
                    "Short write on {} stream (expected {}, wrote {})",
                    self.channel,
                    expected,
                    written
                );
            }
        }
    }

    /// Returns (requested, accepted) frame counts, or `None` when nothing
    /// was written (null handle, empty buffer, or abandoned after a failed
    /// recovery).
    fn write_frames(&mut self, buf: &[u8]) -> Option<(usize, usize)> {
        let stream = self.stream.as_mut()?;
        if buf.is_empty() {
            return None;
        }

        let expected = stream.geometry().bytes_to_frames(buf.len());
        match stream.write(buf) {
            Ok(written) => Some((expected, written)),
            Err(e) => {
                log::warn!("ALSA {} write error: {}, recovering...", self.channel, e);
                if !stream.recover() {
                    log::error!("Failed to recover {} stream", self.channel);
                    return None;
                }
                match stream.write(buf) {
                    Ok(written) => Some((expected, written)),
                    Err(e) => {
                        log::error!("{} write failed after recovery: {}", self.channel, e);
                        None
                    }
                }
            }
        }
    }
}

/// The two playback streams driven by the protocol layer.
///
/// Media and voice are independent devices with different geometries; a
/// buffer destined for one is never written to the other.
pub struct AudioOutput {
    media: PlaybackSink,
    voice: PlaybackSink,
}

impl AudioOutput {
    pub(crate) fn new(media: PlaybackSink, voice: PlaybackSink) -> Self {
        Self { media, voice }
    }

    /// Plays one media chunk. The protocol timestamp is not used for
    /// scheduling.
    pub fn play_media(&mut self, _timestamp: u64, buf: &[u8]) {
        self.media.write(buf);
    }

    /// Plays one voice chunk.
    pub fn play_voice(&mut self, _timestamp: u64, buf: &[u8]) {
        self.voice.write(buf);
    }
}
