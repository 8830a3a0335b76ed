// In: src/error.rs

//! This module defines the single, unified error type for the entire hac-core
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HacError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// The input path handed to the boundary API does not exist.
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    /// A container (or input file header) failed structural validation:
    /// short header, bad magic, unknown tree tag, or a bit stream that
    /// exhausts mid-traversal during Huffman decode.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// A run is longer than its container field can represent. The encoder
    /// refuses rather than wrapping silently.
    #[error("run length {length} exceeds the field maximum of {max}")]
    RunLengthOverflow { length: u64, max: u64 },

    /// The input file is structurally sound but uses a format this library
    /// does not handle (e.g. compressed WAV, 24-bit samples, P3 PPM).
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === Playback Errors
    // =========================================================================
    /// The output stream could not be opened or written.
    #[error("audio device error: {0}")]
    Device(String),

    /// The playback worker did not exit within the join bound. Logged and
    /// treated as stopped; never fatal.
    #[error("playback worker did not exit within {0:?}")]
    PlaybackJoinTimeout(Duration),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
