//! PCM format metadata carried through the audio container unchanged.

use serde::{Deserialize, Serialize};

use crate::error::HacError;

/// The width of one PCM sample. Conventional WAV semantics apply: 8-bit
/// samples are unsigned, 16-bit samples are signed little-endian.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SampleWidth {
    U8,
    I16,
}

impl SampleWidth {
    /// Size of one sample in bytes.
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::U8 => 1,
            SampleWidth::I16 => 2,
        }
    }

    /// Parses the on-disk byte-width field back into the enum.
    pub fn from_byte_count(n: u16) -> Result<Self, HacError> {
        match n {
            1 => Ok(SampleWidth::U8),
            2 => Ok(SampleWidth::I16),
            other => Err(HacError::UnsupportedFormat(format!(
                "sample width of {} bytes (only 1 and 2 are supported)",
                other
            ))),
        }
    }
}

/// Format metadata for a PCM stream. Channels are carried as an opaque
/// interleaved stream; nothing in the codec is channel-aware.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub channels: u16,
    pub sample_width: SampleWidth,
    pub frame_rate: u32,
}

impl AudioFormat {
    /// Bytes per interleaved frame (all channels).
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.sample_width.bytes()
    }

    /// Bytes of PCM per second, used for the WAV header.
    pub fn byte_rate(&self) -> u32 {
        self.frame_rate * self.block_align() as u32
    }
}
