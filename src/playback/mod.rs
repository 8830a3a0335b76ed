//! The playback subsystem: the only concurrent component in the crate.
//!
//! `sink` defines the output-device seam and the cpal-backed production
//! implementation; `controller` owns the start/stop/is-playing state machine
//! and the single background worker.

pub mod controller;
pub mod sink;

pub use controller::PlaybackController;
#[cfg(feature = "device")]
pub use sink::CpalDevice;
pub use sink::{OutputDevice, OutputSink};
