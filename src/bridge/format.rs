// In: src/bridge/format.rs

//! The statistics records returned across the boundary. The callers render
//! these; nothing here prints.

use serde::Serialize;
use std::path::PathBuf;

/// The outcome of a successful file compression.
#[derive(Debug, Clone, Serialize)]
pub struct CompressStats {
    /// Where the container was published.
    pub container_path: PathBuf,
    /// Size of the raw input payload in bytes.
    pub original_size: u64,
    /// Size of the whole container file in bytes.
    pub compressed_size: u64,
    /// Original payload bytes over encoded payload bytes. May be below 1.0
    /// for high-entropy input; that is reported, not treated as an error.
    pub ratio: f64,
}

/// The outcome of a successful file decompression.
#[derive(Debug, Clone, Serialize)]
pub struct DecompressStats {
    /// Where the restored file was published.
    pub restored_path: PathBuf,
    /// Restored element count: samples for audio, pixels for images, bytes
    /// for text.
    pub element_count: u64,
}
