//! This module defines the core, strongly-typed data representations used
//! throughout the hac-core pipelines.
//!
//! It includes the canonical `SampleWidth` enum, which replaces fragile
//! integer-width bookkeeping with a safe, serializable enum, the
//! `AudioFormat` record carried through the audio container unchanged, and
//! the `Rgb` pixel symbol used by the image pipeline.

pub mod audio;
pub mod pixel;

// Re-export the main types for easier access.
pub use audio::{AudioFormat, SampleWidth};
pub use pixel::{Rgb, RgbImage};
