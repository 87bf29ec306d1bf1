//! Handoff of captured audio to the consumer's execution context.

use tokio::sync::mpsc;

/// Logical channel tags understood by the protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalChannel {
    /// Media playback (stereo 48 kHz)
    Media,
    /// Voice playback (mono 16 kHz)
    Voice,
    /// Microphone capture
    Microphone,
}

impl std::fmt::Display for LogicalChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogicalChannel::Media => "media",
            LogicalChannel::Voice => "voice",
            LogicalChannel::Microphone => "microphone",
        })
    }
}

/// One captured audio chunk, handed off with its buffer ownership.
///
/// The buffer is released when the packet is dropped, on every consumer
/// path including an early shutdown of the receiving side.
#[derive(Debug)]
pub struct MediaPacket {
    pub channel: LogicalChannel,
    /// Always zero: the capture path does not timestamp audio. The field is
    /// carried because the protocol layer's media interface expects it.
    pub timestamp: u64,
    /// Interleaved S16LE bytes
    pub data: Vec<u8>,
}

/// Fire-and-forget task submission to the consumer's execution context.
///
/// Implementations must deliver packets from a single producer in
/// submission order; no ordering is required across producers.
pub trait TaskSink: Send + Sync {
    fn submit(&self, packet: MediaPacket);
}

/// The standard handoff: a bounded tokio channel whose receiver lives on
/// the async side. `submit` runs on the capture thread, so the blocking
/// send is safe and preserves FIFO order.
impl TaskSink for mpsc::Sender<MediaPacket> {
    fn submit(&self, packet: MediaPacket) {
        if self.blocking_send(packet).is_err() {
            log::warn!("Dropping captured audio, packet receiver closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpsc_sink_preserves_fifo_order() {
        let (tx, mut rx) = mpsc::channel::<MediaPacket>(8);
        let producer = std::thread::spawn(move || {
            for i in 0..3u8 {
                tx.submit(MediaPacket {
                    channel: LogicalChannel::Microphone,
                    timestamp: 0,
                    data: vec![i; 4],
                });
            }
        });
        producer.join().unwrap();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            for i in 0..3u8 {
                let packet = rx.recv().await.expect("packet");
                assert_eq!(packet.channel, LogicalChannel::Microphone);
                assert_eq!(packet.timestamp, 0);
                assert_eq!(packet.data, vec![i; 4]);
            }
        });
    }

    #[test]
    fn submit_after_receiver_dropped_is_harmless() {
        let (tx, rx) = mpsc::channel::<MediaPacket>(1);
        drop(rx);
        tx.submit(MediaPacket {
            channel: LogicalChannel::Microphone,
            timestamp: 0,
            data: vec![0; 4],
        });
    }
}
