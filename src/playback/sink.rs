//! The output-device seam.
//!
//! The controller's worker only ever talks to `OutputSink`, so the device
//! backend is swappable: production playback goes through `CpalDevice`
//! (behind the `device` feature, so headless builds need no system audio
//! libraries), which bridges the worker's blocking chunk writes onto a cpal
//! output stream via a bounded ring, and the controller tests run against
//! an in-memory device.

use crate::error::HacError;
use crate::types::AudioFormat;

#[cfg(feature = "device")]
pub use cpal_backend::CpalDevice;

/// A live output stream. Writes block while the device drains its backlog,
/// which is what paces the playback worker against real time.
pub trait OutputSink {
    /// Writes one chunk of raw interleaved PCM bytes.
    fn write(&mut self, chunk: &[u8]) -> Result<(), HacError>;

    /// Closes the stream. Idempotent; also invoked by dropping the sink.
    fn close(&mut self);
}

/// Opens output streams. Shared across threads (`start()` hands it to the
/// playback worker), hence `Send + Sync`. The sinks it produces stay on the
/// opening thread.
pub trait OutputDevice: Send + Sync {
    fn open(&self, format: &AudioFormat) -> Result<Box<dyn OutputSink>, HacError>;
}

//==================================================================================
// cpal-backed production device
//==================================================================================

#[cfg(feature = "device")]
mod cpal_backend {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, SyncSender};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use super::{OutputDevice, OutputSink};
    use crate::error::HacError;
    use crate::types::{AudioFormat, SampleWidth};

    /// The system's default output device, driven through cpal.
    pub struct CpalDevice {
        ring_chunks: usize,
    }

    impl CpalDevice {
        /// `ring_chunks` bounds how many written-but-unplayed chunks may
        /// queue between the worker and the device callback.
        pub fn new(ring_chunks: usize) -> Self {
            Self { ring_chunks }
        }
    }

    impl OutputDevice for CpalDevice {
        fn open(&self, format: &AudioFormat) -> Result<Box<dyn OutputSink>, HacError> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| HacError::Device("no default output device".to_string()))?;

            let stream_config = cpal::StreamConfig {
                channels: format.channels,
                sample_rate: cpal::SampleRate(format.frame_rate),
                buffer_size: cpal::BufferSize::Default,
            };

            let (sender, receiver) = mpsc::sync_channel::<Vec<i16>>(self.ring_chunks);
            let mut pending: VecDeque<i16> = VecDeque::new();
            let queued = Arc::new(AtomicUsize::new(0));
            let played = Arc::clone(&queued);

            let stream = device
                .build_output_stream(
                    &stream_config,
                    move |out: &mut [i16], _info: &cpal::OutputCallbackInfo| {
                        for slot in out.iter_mut() {
                            if pending.is_empty() {
                                if let Ok(chunk) = receiver.try_recv() {
                                    pending.extend(chunk);
                                }
                            }
                            match pending.pop_front() {
                                Some(sample) => {
                                    *slot = sample;
                                    played.fetch_sub(1, Ordering::Relaxed);
                                }
                                // Underruns play silence rather than
                                // stalling the callback.
                                None => *slot = 0,
                            }
                        }
                    },
                    |err| log::warn!("output stream error: {}", err),
                    None,
                )
                .map_err(|e| HacError::Device(e.to_string()))?;
            stream.play().map_err(|e| HacError::Device(e.to_string()))?;

            Ok(Box::new(CpalSink {
                width: format.sample_width,
                sender: Some(sender),
                stream: Some(stream),
                queued,
            }))
        }
    }

    struct CpalSink {
        width: SampleWidth,
        sender: Option<SyncSender<Vec<i16>>>,
        stream: Option<cpal::Stream>,
        /// Samples handed to the ring but not yet played by the callback.
        queued: Arc<AtomicUsize>,
    }

    /// Upper bound on waiting for the callback to play out queued samples
    /// before the stream is released.
    const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

    impl OutputSink for CpalSink {
        fn write(&mut self, chunk: &[u8]) -> Result<(), HacError> {
            let frames = pcm_bytes_to_i16(chunk, self.width)?;
            let sender = self
                .sender
                .as_ref()
                .ok_or_else(|| HacError::Device("output stream is closed".to_string()))?;
            self.queued.fetch_add(frames.len(), Ordering::Relaxed);
            // Blocks while the ring is full; this is the backpressure that
            // paces the worker.
            sender
                .send(frames)
                .map_err(|_| HacError::Device("output stream is closed".to_string()))
        }

        fn close(&mut self) {
            self.sender.take();
            if let Some(stream) = self.stream.take() {
                // Let the tail of the ring play out before the stream goes
                // away.
                let deadline = Instant::now() + DRAIN_TIMEOUT;
                while self.queued.load(Ordering::Relaxed) > 0 && Instant::now() < deadline {
                    std::thread::sleep(Duration::from_millis(10));
                }
                drop(stream);
            }
        }
    }

    /// Converts raw PCM bytes to the i16 samples cpal plays: 8-bit unsigned
    /// samples are centered and scaled up, 16-bit samples pass through.
    fn pcm_bytes_to_i16(chunk: &[u8], width: SampleWidth) -> Result<Vec<i16>, HacError> {
        match width {
            SampleWidth::U8 => Ok(chunk.iter().map(|&b| ((b as i16) - 128) << 8).collect()),
            SampleWidth::I16 => {
                if chunk.len() % 2 != 0 {
                    return Err(HacError::Device(format!(
                        "16-bit chunk has odd byte length {}",
                        chunk.len()
                    )));
                }
                Ok(chunk
                    .chunks_exact(2)
                    .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                    .collect())
            }
        }
    }

}

//==================================================================================
// In-memory device for the controller tests
//==================================================================================
