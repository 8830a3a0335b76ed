//! The image container: the simple RLE-only baseline variant.
//!
//! Layout: magic `HACI` (4), version u16 LE, width u32 BE, height u32 BE,
//! then repeating records of 3 RGB bytes and a u16 BE run length. Runs
//! longer than `u16::MAX` are split across records at write time — the split
//! is invisible after decoding, which re-expands by repetition.

use std::io::Cursor;

use crate::container::{expect_preamble, read_bytes, read_u16_be, read_u32_be};
use crate::error::HacError;
use crate::kernels::rle::RleRun;
use crate::types::Rgb;

pub const IMAGE_MAGIC: &[u8; 4] = b"HACI";
pub const IMAGE_FORMAT_VERSION: u16 = 1;

/// magic(4) + version(2) + width(4) + height(4)
pub(crate) const FIXED_HEADER_LEN: usize = 14;
/// rgb(3) + run length(2)
const RECORD_LEN: usize = 5;

const MAX_RECORD_RUN: u64 = u16::MAX as u64;

/// An image container in memory: declared dimensions plus the run list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContainer {
    pub width: u32,
    pub height: u32,
    pub runs: Vec<RleRun<Rgb>>,
}

impl ImageContainer {
    /// Serializes the container, splitting any run that exceeds the u16
    /// record field rather than wrapping it silently.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FIXED_HEADER_LEN + self.runs.len() * RECORD_LEN);
        out.extend_from_slice(IMAGE_MAGIC);
        out.extend_from_slice(&IMAGE_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());

        for run in &self.runs {
            let mut remaining = run.length;
            while remaining > 0 {
                let piece = remaining.min(MAX_RECORD_RUN);
                out.extend_from_slice(bytemuck::bytes_of(&run.value));
                out.extend_from_slice(&(piece as u16).to_be_bytes());
                remaining -= piece;
            }
        }
        out
    }

    /// Parses a container, validating that the record section is whole and
    /// that the run lengths cover exactly the declared pixel count.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HacError> {
        if bytes.len() < FIXED_HEADER_LEN {
            return Err(HacError::MalformedContainer(format!(
                "image container shorter than its {}-byte header: {} bytes",
                FIXED_HEADER_LEN,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        expect_preamble(&mut cursor, IMAGE_MAGIC, IMAGE_FORMAT_VERSION)?;
        let width = read_u32_be(&mut cursor, "image width")?;
        let height = read_u32_be(&mut cursor, "image height")?;

        let record_section = bytes.len() - FIXED_HEADER_LEN;
        if record_section % RECORD_LEN != 0 {
            return Err(HacError::MalformedContainer(format!(
                "record section of {} bytes is not a whole number of {}-byte records",
                record_section, RECORD_LEN
            )));
        }

        let mut runs = Vec::with_capacity(record_section / RECORD_LEN);
        let mut covered: u64 = 0;
        for _ in 0..record_section / RECORD_LEN {
            let rgb: [u8; 3] = read_bytes(&mut cursor, "pixel value")?;
            let length = read_u16_be(&mut cursor, "run length")? as u64;
            if length == 0 {
                return Err(HacError::MalformedContainer(
                    "zero-length run record".to_string(),
                ));
            }
            covered += length;
            runs.push(RleRun {
                value: Rgb::new(rgb[0], rgb[1], rgb[2]),
                length,
            });
        }

        let pixel_count = width as u64 * height as u64;
        if covered != pixel_count {
            return Err(HacError::MalformedContainer(format!(
                "runs cover {} pixels but the header declares {}x{} = {}",
                covered, width, height, pixel_count
            )));
        }

        Ok(Self {
            width,
            height,
            runs,
        })
    }
}
