// In: src/config.rs

//! The single source of truth for all hac-core runtime configuration.
//!
//! This module defines the unified `HacConfig` struct, which is designed to be
//! created once at the application boundary (e.g., from a GUI settings panel
//! or a config file) and then passed down through the system via a shared,
//! read-only `Arc<HacConfig>`.
//!
//! The codec stages themselves are parameter-free by design; every knob here
//! belongs to the playback subsystem.

use serde::{Deserialize, Serialize};

/// The single, unified configuration for hac-core.
/// This struct is created once and shared throughout the system via an `Arc`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct HacConfig {
    /// **The number of PCM frames written per playback chunk.**
    /// The playback worker polls its cancellation flag between chunk writes,
    /// so this value bounds cancellation latency: one chunk-write duration.
    #[serde(default = "default_playback_chunk_frames")]
    pub playback_chunk_frames: usize,

    /// How long `stop()` waits for the playback worker to exit before giving
    /// up and reporting a (non-fatal) join timeout.
    #[serde(default = "default_playback_join_timeout_ms")]
    pub playback_join_timeout_ms: u64,

    /// Depth of the chunk ring buffer between the playback worker and the
    /// output device callback. Writes block when the ring is full, which is
    /// what paces the worker against real-time output.
    #[serde(default = "default_playback_ring_chunks")]
    pub playback_ring_chunks: usize,
}

impl Default for HacConfig {
    fn default() -> Self {
        Self {
            playback_chunk_frames: default_playback_chunk_frames(),
            playback_join_timeout_ms: default_playback_join_timeout_ms(),
            playback_ring_chunks: default_playback_ring_chunks(),
        }
    }
}

/// Helper for `serde` to provide a default for `playback_chunk_frames`.
fn default_playback_chunk_frames() -> usize {
    1024
}

/// Helper for `serde` to provide a default for `playback_join_timeout_ms`.
fn default_playback_join_timeout_ms() -> u64 {
    2_000
}

/// Helper for `serde` to provide a default for `playback_ring_chunks`.
fn default_playback_ring_chunks() -> usize {
    8
}
