//! The `.hac` audio container: a self-describing header (format metadata,
//! original sample count, valid-bit count, embedded Huffman tree) followed
//! immediately by the packed Huffman payload.
//!
//! Header layout, all integers little-endian:
//!
//! ```text
//! magic "HACA" (4) | version (2) | channels (2) | sample width bytes (2)
//! | frame rate (4) | sample count (8) | valid bits (8) | tree length (4)
//! | serialized tree (tree length) | payload (rest of file)
//! ```

use std::io::Cursor;

use crate::container::{
    expect_preamble, read_u16_le, read_u32_le, read_u64_le, tree,
};
use crate::error::HacError;
use crate::kernels::huffman::HuffmanNode;
use crate::types::{AudioFormat, SampleWidth};

pub const AUDIO_MAGIC: &[u8; 4] = b"HACA";
pub const AUDIO_FORMAT_VERSION: u16 = 1;

/// The fixed-size portion of the header; everything before the tree.
const FIXED_HEADER_LEN: usize = 34;

/// An audio container held in memory: created once by the compression
/// pipeline, written once, read once at decompress time.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioContainer {
    pub format: AudioFormat,
    /// Original PCM sample count (per-channel samples, interleaved stream).
    pub sample_count: u64,
    /// Meaningful bits in `payload`; trailing padding is never decoded.
    pub valid_bits: u64,
    /// The code tree for the token alphabet. `None` only for empty input.
    pub tree: Option<HuffmanNode<i32>>,
    /// The packed Huffman bit stream.
    pub payload: Vec<u8>,
}

impl AudioContainer {
    /// Serializes the container into its canonical byte form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut tree_bytes = Vec::new();
        if let Some(root) = &self.tree {
            tree::serialize(root, &mut tree_bytes);
        }

        let mut out =
            Vec::with_capacity(FIXED_HEADER_LEN + tree_bytes.len() + self.payload.len());
        out.extend_from_slice(AUDIO_MAGIC);
        out.extend_from_slice(&AUDIO_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&self.format.channels.to_le_bytes());
        out.extend_from_slice(&(self.format.sample_width.bytes() as u16).to_le_bytes());
        out.extend_from_slice(&self.format.frame_rate.to_le_bytes());
        out.extend_from_slice(&self.sample_count.to_le_bytes());
        out.extend_from_slice(&self.valid_bits.to_le_bytes());
        out.extend_from_slice(&(tree_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&tree_bytes);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parses a container, validating the header extent before any
    /// variable-length section is touched.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HacError> {
        if bytes.len() < FIXED_HEADER_LEN {
            return Err(HacError::MalformedContainer(format!(
                "audio container shorter than its {}-byte header: {} bytes",
                FIXED_HEADER_LEN,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        expect_preamble(&mut cursor, AUDIO_MAGIC, AUDIO_FORMAT_VERSION)?;

        let channels = read_u16_le(&mut cursor, "channel count")?;
        let sample_width = SampleWidth::from_byte_count(read_u16_le(&mut cursor, "sample width")?)?;
        let frame_rate = read_u32_le(&mut cursor, "frame rate")?;
        let sample_count = read_u64_le(&mut cursor, "sample count")?;
        let valid_bits = read_u64_le(&mut cursor, "valid-bit count")?;
        let tree_len = read_u32_le(&mut cursor, "tree length")? as usize;

        let tree_start = cursor.position() as usize;
        let payload_start = tree_start
            .checked_add(tree_len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                HacError::MalformedContainer(
                    "declared tree length exceeds the container size".to_string(),
                )
            })?;

        let tree = if tree_len == 0 {
            None
        } else {
            let mut tree_cursor = Cursor::new(&bytes[tree_start..payload_start]);
            let root = tree::deserialize::<i32>(&mut tree_cursor)?;
            if tree_cursor.position() as usize != tree_len {
                return Err(HacError::MalformedContainer(
                    "trailing bytes after the serialized tree".to_string(),
                ));
            }
            Some(root)
        };

        Ok(Self {
            format: AudioFormat {
                channels,
                sample_width,
                frame_rate,
            },
            sample_count,
            valid_bits,
            tree,
            payload: bytes[payload_start..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{freq, huffman};

    fn sample_container() -> AudioContainer {
        let tokens = [100i32, 3, -5, 2, 100, 1];
        let table = freq::count(&tokens);
        let root = huffman::build_tree(&table).unwrap();
        AudioContainer {
            format: AudioFormat {
                channels: 1,
                sample_width: SampleWidth::I16,
                frame_rate: 44_100,
            },
            sample_count: 6,
            valid_bits: 17,
            tree: Some(root),
            payload: vec![0xAB, 0xCD, 0b1000_0000],
        }
    }

    #[test]
    fn test_container_roundtrip() {
        let original = sample_container();
        let bytes = original.to_bytes();
        let reconstructed = AudioContainer::from_bytes(&bytes).unwrap();
        assert_eq!(original, reconstructed);
    }

    #[test]
    fn test_empty_input_container_roundtrip() {
        let original = AudioContainer {
            format: AudioFormat {
                channels: 2,
                sample_width: SampleWidth::U8,
                frame_rate: 8_000,
            },
            sample_count: 0,
            valid_bits: 0,
            tree: None,
            payload: Vec::new(),
        };
        let bytes = original.to_bytes();
        assert_eq!(AudioContainer::from_bytes(&bytes).unwrap(), original);
    }

    #[test]
    fn test_short_file_is_rejected() {
        let result = AudioContainer::from_bytes(b"HACA\x01\x00");
        assert!(matches!(result, Err(HacError::MalformedContainer(_))));
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut bytes = sample_container().to_bytes();
        bytes[0] = b'X';
        let result = AudioContainer::from_bytes(&bytes);
        assert!(matches!(result, Err(HacError::MalformedContainer(_))));
    }

    #[test]
    fn test_bad_version_is_rejected() {
        let mut bytes = sample_container().to_bytes();
        bytes[4] = 0xFF;
        let result = AudioContainer::from_bytes(&bytes);
        assert!(matches!(result, Err(HacError::MalformedContainer(_))));
    }

    #[test]
    fn test_truncation_inside_tree_is_rejected() {
        let container = sample_container();
        let bytes = container.to_bytes();
        // Cut after the fixed header but inside the serialized tree.
        let result = AudioContainer::from_bytes(&bytes[..FIXED_HEADER_LEN + 4]);
        assert!(matches!(result, Err(HacError::MalformedContainer(_))));
    }
}
