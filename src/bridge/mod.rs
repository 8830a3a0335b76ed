//! The boundary surface the excluded GUI/CLI layers call into: file-level
//! compress/decompress returning statistics records, and the playback
//! facade. Everything here deals in paths and stats; the in-memory work is
//! delegated to `pipeline` and `playback`.

pub mod api;
pub mod format;
pub mod ppm;
pub mod wav;

pub use api::{compress_file, decompress_file, is_playing, start_playback, stop_playback};
pub use format::{CompressStats, DecompressStats};

/// Initializes the `env_logger` backend. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
