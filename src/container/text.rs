//! The text container: a Huffman-only variant that embeds its code table
//! directly instead of the tree.
//!
//! Layout: magic `HACT` (4), version u16 LE, entry count u32 LE, then per
//! entry a symbol byte, a u16 LE code bit-length and the code bytes packed
//! MSB-first; after the table a single pad-bit count byte and the packed
//! payload. The payload's valid bits are `payload_len * 8 - pad_bits`.

use std::io::{Cursor, Read};

use bitvec::prelude::*;

use crate::container::{expect_preamble, read_u16_le, read_u32_le, read_u8};
use crate::error::HacError;
use crate::kernels::huffman::Code;

pub const TEXT_MAGIC: &[u8; 4] = b"HACT";
pub const TEXT_FORMAT_VERSION: u16 = 1;

/// magic(4) + version(2) + entry count(4) + pad bits(1)
const FIXED_HEADER_LEN: usize = 11;

/// A text container in memory: the embedded code table plus the packed
/// stream it decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContainer {
    /// Symbol-to-code mapping, in the encoder's emission order.
    pub code_table: Vec<(u8, Code)>,
    /// Number of padding bits in the final payload byte (0..=7).
    pub pad_bits: u8,
    pub payload: Vec<u8>,
}

impl TextContainer {
    /// Meaningful bits in the payload.
    pub fn valid_bits(&self) -> u64 {
        self.payload.len() as u64 * 8 - self.pad_bits as u64
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(TEXT_MAGIC);
        out.extend_from_slice(&TEXT_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.code_table.len() as u32).to_le_bytes());

        for (symbol, code) in &self.code_table {
            out.push(*symbol);
            out.extend_from_slice(&(code.len() as u16).to_le_bytes());
            let mut packed = code.clone();
            packed.set_uninitialized(false);
            out.extend_from_slice(packed.as_raw_slice());
        }

        out.push(self.pad_bits);
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HacError> {
        if bytes.len() < FIXED_HEADER_LEN {
            return Err(HacError::MalformedContainer(format!(
                "text container shorter than its {}-byte header: {} bytes",
                FIXED_HEADER_LEN,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        expect_preamble(&mut cursor, TEXT_MAGIC, TEXT_FORMAT_VERSION)?;
        let entry_count = read_u32_le(&mut cursor, "code table entry count")?;

        let mut code_table = Vec::with_capacity(entry_count as usize);
        let mut seen = [false; 256];
        for _ in 0..entry_count {
            let symbol = read_u8(&mut cursor, "code table symbol")?;
            if seen[symbol as usize] {
                return Err(HacError::MalformedContainer(format!(
                    "duplicate code table entry for symbol 0x{:02x}",
                    symbol
                )));
            }
            seen[symbol as usize] = true;

            let bit_len = read_u16_le(&mut cursor, "code bit length")? as usize;
            if bit_len == 0 {
                return Err(HacError::MalformedContainer(
                    "zero-length code in code table".to_string(),
                ));
            }

            let mut code_buf = vec![0u8; bit_len.div_ceil(8)];
            cursor
                .read_exact(&mut code_buf)
                .map_err(|_| HacError::MalformedContainer("truncated code bytes".into()))?;
            let code = Code::from_bitslice(&code_buf.view_bits::<Msb0>()[..bit_len]);
            code_table.push((symbol, code));
        }

        let pad_bits = read_u8(&mut cursor, "pad-bit count")?;
        if pad_bits >= 8 {
            return Err(HacError::MalformedContainer(format!(
                "pad-bit count {} is not in 0..=7",
                pad_bits
            )));
        }

        let payload = bytes[cursor.position() as usize..].to_vec();
        if payload.is_empty() && pad_bits != 0 {
            return Err(HacError::MalformedContainer(
                "pad bits declared for an empty payload".to_string(),
            ));
        }

        Ok(Self {
            code_table,
            pad_bits,
            payload,
        })
    }
}
