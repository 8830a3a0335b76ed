//! The RGB pixel symbol and the in-memory image buffer the image pipeline
//! operates on.

use bytemuck::{Pod, Zeroable};

use crate::error::HacError;

/// One 24-bit RGB pixel. `Pod` so the tree serializer and the image container
/// can treat it as a fixed 3-byte symbol.
#[repr(C)]
#[derive(Pod, Zeroable, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A decoded image: row-major pixels, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl RgbImage {
    /// Builds an image, validating that the pixel count matches the declared
    /// dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, HacError> {
        let expected = width as u64 * height as u64;
        if pixels.len() as u64 != expected {
            return Err(HacError::MalformedContainer(format!(
                "image dimensions {}x{} require {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel sequence, the input to the RLE stage.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}
