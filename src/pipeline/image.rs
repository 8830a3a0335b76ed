//! The image compression pipeline: the RLE-only baseline variant. Pixels are
//! flattened row-major, collapsed into runs, and written as fixed-width
//! records — no Huffman stage.

use std::time::Instant;

use crate::container::image::{ImageContainer, FIXED_HEADER_LEN};
use crate::error::HacError;
use crate::kernels::rle;
use crate::pipeline::Encoded;
use crate::types::RgbImage;

/// Compresses an image into its container bytes.
pub fn compress(image: &RgbImage) -> Result<Encoded, HacError> {
    let started = Instant::now();

    let runs = rle::encode(image.pixels());
    let container = ImageContainer {
        width: image.width(),
        height: image.height(),
        runs,
    };
    let bytes = container.to_bytes();
    let payload_size = bytes.len() - FIXED_HEADER_LEN;

    log::debug!(
        "image compress: {} pixels -> {} record bytes in {:.2}s",
        image.pixels().len(),
        payload_size,
        started.elapsed().as_secs_f64(),
    );
    codec_metric!(
        "event" = "image_compress",
        "pixels" = &image.pixels().len(),
        "runs" = &container.runs.len(),
    );

    Ok(Encoded {
        bytes,
        payload_size,
    })
}

/// Decompresses container bytes back into the original image.
pub fn decompress(bytes: &[u8]) -> Result<RgbImage, HacError> {
    let container = ImageContainer::from_bytes(bytes)?;
    let pixel_count = container.width as u64 * container.height as u64;

    let pixels = rle::decode(&container.runs, pixel_count as usize)?;
    RgbImage::new(container.width, container.height, pixels)
}
