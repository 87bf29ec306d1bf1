//! Byte/frame arithmetic for interleaved S16LE PCM.

/// Sample width of the fixed S16LE format.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Interleaved-frame geometry of one configured stream.
///
/// One frame holds one sample per channel, so a frame occupies
/// `channels * BYTES_PER_SAMPLE` bytes. Conversions are exact in both
/// directions for every buffer size this crate produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub channels: usize,
}

impl Geometry {
    pub const fn frame_bytes(self) -> usize {
        self.channels * BYTES_PER_SAMPLE
    }

    pub const fn bytes_to_frames(self, bytes: usize) -> usize {
        bytes / self.frame_bytes()
    }

    pub const fn frames_to_bytes(self, frames: usize) -> usize {
        frames * self.frame_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_48k_example() {
        // 9600 bytes of stereo S16LE is exactly 2400 frames.
        let g = Geometry { channels: 2 };
        assert_eq!(g.bytes_to_frames(9600), 2400);
        assert_eq!(g.frames_to_bytes(2400), 9600);
    }

    #[test]
    fn mono_frames() {
        let g = Geometry { channels: 1 };
        assert_eq!(g.frame_bytes(), 2);
        assert_eq!(g.bytes_to_frames(320), 160);
        assert_eq!(g.frames_to_bytes(160), 320);
    }

    #[test]
    fn round_trip_is_lossless_for_produced_sizes() {
        for channels in 1..=8 {
            let g = Geometry { channels };
            for frames in [0, 1, 160, 2400, 1024 * 1024 / g.frame_bytes()] {
                let bytes = g.frames_to_bytes(frames);
                assert_eq!(g.bytes_to_frames(bytes), frames);
            }
        }
    }
}
