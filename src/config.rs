//! Stream profiles and device configuration.

use crate::frame::Geometry;

/// Fixed parameters of one hardware stream: interleaved S16LE at a given
/// channel count and rate, with a target buffer latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamProfile {
    /// Number of interleaved channels
    pub channels: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Target buffer latency in microseconds
    pub latency_us: u32,
}

impl StreamProfile {
    /// Media playback: stereo 48 kHz, 0.5 s buffer.
    pub const MEDIA: Self = Self {
        channels: 2,
        sample_rate: 48_000,
        latency_us: 500_000,
    };

    /// Voice playback: mono 16 kHz, 0.5 s buffer.
    pub const VOICE: Self = Self {
        channels: 1,
        sample_rate: 16_000,
        latency_us: 500_000,
    };

    /// Microphone capture: mono 16 kHz, 0.25 s buffer.
    pub const MICROPHONE: Self = Self {
        channels: 1,
        sample_rate: 16_000,
        latency_us: 250_000,
    };

    pub fn geometry(self) -> Geometry {
        Geometry {
            channels: self.channels as usize,
        }
    }
}

/// Audio subsystem configuration.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// ALSA playback device name (e.g. "default", "plughw:0,0")
    pub playback_device: String,
    /// ALSA capture device name
    pub capture_device: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            playback_device: "default".to_string(),
            capture_device: "default".to_string(),
        }
    }
}
