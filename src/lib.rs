//! This file is the root of the `hac_codec` Rust crate.
//!
//! The crate packages interchangeable lossless compressors built from two
//! primitive stages — run-length encoding and static Huffman prefix coding —
//! behind three container formats (PCM audio, RGB images, text), plus the
//! playback controller that streams decompressed audio to an output device.
//!
//! The surrounding application (file pickers, buttons, status text) lives
//! elsewhere; it calls into `bridge` with a file path and renders the stats
//! record it gets back.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod container;
pub mod kernels;
pub mod pipeline;
pub mod playback;
pub mod types;

mod error;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{
    compress_file, decompress_file, init_logging, is_playing, start_playback, stop_playback,
    CompressStats, DecompressStats,
};
pub use config::HacConfig;
pub use error::HacError;
pub use playback::PlaybackController;
