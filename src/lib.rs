//! headunit-audio - ALSA capture and playback path for a head-unit
//! projection client.
//!
//! Moves raw interleaved S16LE PCM between the hardware and the protocol
//! layer: a cancellable capture loop on a dedicated thread hands microphone
//! chunks to an asynchronous [`TaskSink`], and two independent playback
//! sinks (media and voice) accept buffers synchronously with bounded
//! underrun recovery. Device failures degrade to silent no-ops rather than
//! errors; dropped audio is preferred over crashing or blocking the caller.

mod alsa_device;
mod audio_system;
mod cancel;
mod config;
mod frame;
mod play;
mod record;
mod sink;
#[cfg(test)]
mod test_support;

pub use audio_system::AudioSystem;
pub use config::{AudioConfig, StreamProfile};
pub use frame::{BYTES_PER_SAMPLE, Geometry};
pub use play::{AudioOutput, PlaybackSink};
pub use record::MicInput;
pub use sink::{LogicalChannel, MediaPacket, TaskSink};
