//! The Huffman tree serializer: converts the owned tree to and from the flat
//! tagged form embedded in the audio container header, so the decoder never
//! needs the original data to rebuild the code tree.
//!
//! Encoding is pre-order: a tag byte (0x00 leaf, 0x01 internal), a u64 LE
//! frequency, then either the fixed-width symbol bytes (leaf) or the left and
//! right sub-records (internal). Frequencies are preserved for diagnostics
//! only and are not re-validated on load; shape and leaf symbols round-trip
//! identically.

use std::io::{Cursor, Read};

use bytemuck::Pod;

use crate::container::{read_u64_le, read_u8};
use crate::error::HacError;
use crate::kernels::huffman::HuffmanNode;

const TAG_LEAF: u8 = 0x00;
const TAG_INTERNAL: u8 = 0x01;

/// Appends the pre-order encoding of `node` to `out`.
pub fn serialize<S>(node: &HuffmanNode<S>, out: &mut Vec<u8>)
where
    S: Pod,
{
    match node {
        HuffmanNode::Leaf { symbol, frequency } => {
            out.push(TAG_LEAF);
            out.extend_from_slice(&frequency.to_le_bytes());
            out.extend_from_slice(bytemuck::bytes_of(symbol));
        }
        HuffmanNode::Internal {
            frequency,
            left,
            right,
        } => {
            out.push(TAG_INTERNAL);
            out.extend_from_slice(&frequency.to_le_bytes());
            serialize(left, out);
            serialize(right, out);
        }
    }
}

/// Reconstructs a structurally identical tree from its pre-order encoding.
/// Unknown tags and truncation are malformed-container errors.
pub fn deserialize<S>(cursor: &mut Cursor<&[u8]>) -> Result<HuffmanNode<S>, HacError>
where
    S: Pod,
{
    let tag = read_u8(cursor, "tree node tag")?;
    let frequency = read_u64_le(cursor, "tree node frequency")?;

    match tag {
        TAG_LEAF => {
            let mut symbol_buf = vec![0u8; std::mem::size_of::<S>()];
            cursor
                .read_exact(&mut symbol_buf)
                .map_err(|_| HacError::MalformedContainer("truncated tree leaf symbol".into()))?;
            let symbol = bytemuck::pod_read_unaligned::<S>(&symbol_buf);
            Ok(HuffmanNode::Leaf { symbol, frequency })
        }
        TAG_INTERNAL => {
            let left = deserialize::<S>(cursor)?;
            let right = deserialize::<S>(cursor)?;
            Ok(HuffmanNode::Internal {
                frequency,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        other => Err(HacError::MalformedContainer(format!(
            "unknown tree node tag 0x{:02x}",
            other
        ))),
    }
}
