//! The process-wide audio subsystem.
//!
//! Owns the device configuration and opens the playback and capture
//! components. Open and configure failures are logged here and yield
//! components with a null handle; they are never surfaced as errors to the
//! caller, which only ever observes whether a handle is live.

use crate::alsa_device::{AlsaCapture, AlsaPlayback};
use crate::config::{AudioConfig, StreamProfile};
use crate::play::{AudioOutput, PlaybackSink};
use crate::record::MicInput;
use crate::sink::LogicalChannel;

pub struct AudioSystem {
    config: AudioConfig,
}

impl AudioSystem {
    pub fn new(config: AudioConfig) -> Self {
        log::info!(
            "AudioSystem: playback=\"{}\", capture=\"{}\"",
            config.playback_device,
            config.capture_device,
        );
        Self { config }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Opens the media and voice playback streams. Each stream that fails
    /// to open leaves its sink as a no-op; the other keeps working.
    pub fn open_output(&self) -> AudioOutput {
        AudioOutput::new(
            self.open_sink(LogicalChannel::Media, StreamProfile::MEDIA),
            self.open_sink(LogicalChannel::Voice, StreamProfile::VOICE),
        )
    }

    /// Opens the microphone capture source, a no-op source on failure.
    pub fn open_input(&self) -> MicInput {
        match AlsaCapture::open(&self.config.capture_device, StreamProfile::MICROPHONE) {
            Ok(stream) => MicInput::new(Some(Box::new(stream))),
            Err(e) => {
                log::error!("Capture open error: {:#}", e);
                MicInput::new(None)
            }
        }
    }

    fn open_sink(&self, channel: LogicalChannel, profile: StreamProfile) -> PlaybackSink {
        match AlsaPlayback::open(&self.config.playback_device, profile) {
            Ok(stream) => PlaybackSink::new(channel, Some(Box::new(stream))),
            Err(e) => {
                log::error!("Playback open error ({}): {:#}", channel, e);
                PlaybackSink::new(channel, None)
            }
        }
    }
}
