//! The playback controller: owns at most one background output session and
//! guarantees clean hand-off between consecutive sessions.
//!
//! State transitions (Idle → Starting → Playing → Stopping → Idle) are
//! serialized under a single mutex. Cancellation is cooperative: the worker
//! polls the running flag between chunk writes, so cancellation latency is
//! bounded by one chunk-write duration. `stop()` joins the worker through a
//! completion channel bounded by the configured timeout; a worker that
//! overstays is reported as a non-fatal warning and playback is considered
//! stopped regardless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::HacConfig;
use crate::error::HacError;
use crate::playback::sink::OutputDevice;
use crate::types::AudioFormat;

/// One active playback session. Destroyed when playback completes
/// naturally, is explicitly stopped, or the controller is torn down.
struct Session {
    running: Arc<AtomicBool>,
    worker: JoinHandle<()>,
    done: Receiver<()>,
}

pub struct PlaybackController {
    device: Arc<dyn OutputDevice>,
    config: Arc<HacConfig>,
    session: Mutex<Option<Session>>,
}

impl PlaybackController {
    pub fn new(device: Arc<dyn OutputDevice>, config: Arc<HacConfig>) -> Self {
        Self {
            device,
            config,
            session: Mutex::new(None),
        }
    }

    /// A controller wired to the system's default output device.
    #[cfg(feature = "device")]
    pub fn with_default_device(config: Arc<HacConfig>) -> Self {
        let device = Arc::new(crate::playback::sink::CpalDevice::new(
            config.playback_ring_chunks,
        ));
        Self::new(device, config)
    }

    /// Starts playing `samples` (raw interleaved PCM bytes). Any active
    /// session is stopped synchronously first — at most one output stream
    /// exists at a time. Returns as soon as the stream is open; playback
    /// itself proceeds on the background worker.
    pub fn start(&self, samples: Vec<u8>, format: AudioFormat) -> Result<(), HacError> {
        if format.block_align() == 0 {
            return Err(HacError::UnsupportedFormat(
                "cannot play a stream with zero channels".to_string(),
            ));
        }

        let mut guard = self.session_guard();
        if let Some(old) = guard.take() {
            self.stop_session(old);
        }

        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), HacError>>();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let device = Arc::clone(&self.device);
        let flag = Arc::clone(&running);
        let chunk_bytes = self.config.playback_chunk_frames.max(1) * format.block_align();

        // The sink is opened on the worker thread (output streams need not
        // be Send); the open result is acked back before start() returns.
        let worker = thread::Builder::new()
            .name("hac-playback".to_string())
            .spawn(move || {
                let mut sink = match device.open(&format) {
                    Ok(sink) => {
                        let _ = ready_tx.send(Ok(()));
                        sink
                    }
                    Err(e) => {
                        flag.store(false, Ordering::SeqCst);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let mut offset = 0usize;
                while offset < samples.len() && flag.load(Ordering::SeqCst) {
                    let end = usize::min(offset + chunk_bytes, samples.len());
                    if let Err(e) = sink.write(&samples[offset..end]) {
                        if flag.load(Ordering::SeqCst) {
                            log::error!("playback write failed: {}", e);
                        }
                        break;
                    }
                    offset = end;
                }

                if offset >= samples.len() && flag.load(Ordering::SeqCst) {
                    log::debug!("playback completed naturally");
                }
                sink.close();
                flag.store(false, Ordering::SeqCst);
                let _ = done_tx.send(());
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(HacError::Device(
                    "playback worker exited before opening the stream".to_string(),
                ));
            }
        }

        *guard = Some(Session {
            running,
            worker,
            done: done_rx,
        });
        Ok(())
    }

    /// Stops the active session, if any: clears the running flag and waits
    /// (bounded by the configured timeout) for the worker to exit. Returns
    /// only once playback is over from the controller's perspective.
    pub fn stop(&self) {
        let mut guard = self.session_guard();
        if let Some(session) = guard.take() {
            self.stop_session(session);
        }
    }

    /// Whether a session is currently playing. May race briefly with
    /// natural completion, but never reports true after `stop()` returns.
    pub fn is_playing(&self) -> bool {
        self.session_guard()
            .as_ref()
            .map(|s| s.running.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    fn stop_session(&self, session: Session) {
        session.running.store(false, Ordering::SeqCst);

        let timeout = Duration::from_millis(self.config.playback_join_timeout_ms);
        match session.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = session.worker.join();
            }
            Err(RecvTimeoutError::Timeout) => {
                // Non-fatal: the worker is left to finish its last write in
                // the background; the flag it polls is already cleared.
                let err = HacError::PlaybackJoinTimeout(timeout);
                log::warn!("{}; playback is considered stopped", err);
            }
        }
    }

    fn session_guard(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}
