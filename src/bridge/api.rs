// In: src/bridge/api.rs

//! The file-level boundary API. Dispatch is by input extension on the
//! compression side (`.wav` audio, `.ppm` image, anything else text) and by
//! container magic on the decompression side, so a `.bin` file never needs
//! caller context to find its decoder.
//!
//! Outputs are published atomically: bytes land in a `.tmp` sibling first
//! and are renamed into place only on full success, so a failed run never
//! leaves a partial container or a partial restored file behind.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bridge::format::{CompressStats, DecompressStats};
use crate::bridge::{ppm, wav};
use crate::container::audio::AUDIO_MAGIC;
use crate::container::image::IMAGE_MAGIC;
use crate::container::text::TEXT_MAGIC;
use crate::error::HacError;
use crate::pipeline::{audio, image, text, Encoded};
use crate::playback::PlaybackController;

/// Compresses the file at `path` into its container sibling, choosing the
/// pipeline from the extension. Returns the published stats record.
pub fn compress_file(path: &Path) -> Result<CompressStats, HacError> {
    if !path.exists() {
        return Err(HacError::InputNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    let (encoded, original_size, container_path) = match extension.as_deref() {
        Some("wav") => {
            let data = wav::read_wav(path)?;
            let encoded = audio::compress(&data.frames, &data.format)?;
            (encoded, data.frames.len() as u64, path.with_extension("hac"))
        }
        Some("ppm") => {
            let img = ppm::read_ppm(path)?;
            let encoded = image::compress(&img)?;
            let original = img.pixels().len() as u64 * 3;
            (encoded, original, path.with_extension("bin"))
        }
        _ => {
            let data = fs::read(path)?;
            let encoded = text::compress(&data)?;
            (encoded, data.len() as u64, path.with_extension("bin"))
        }
    };

    publish(&container_path, &encoded.bytes)?;

    let stats = CompressStats {
        compressed_size: encoded.bytes.len() as u64,
        ratio: ratio(original_size, &encoded),
        original_size,
        container_path,
    };
    log::info!(
        "compressed {} -> {} ({} -> {} bytes, ratio {:.2}:1)",
        path.display(),
        stats.container_path.display(),
        stats.original_size,
        stats.compressed_size,
        stats.ratio,
    );
    Ok(stats)
}

/// Decompresses the container at `path`, dispatching on its magic, and
/// publishes the restored file next to it.
pub fn decompress_file(path: &Path) -> Result<DecompressStats, HacError> {
    if !path.exists() {
        return Err(HacError::InputNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    if bytes.len() < 4 {
        return Err(HacError::MalformedContainer(format!(
            "{} bytes is too short to carry a container magic",
            bytes.len()
        )));
    }

    let magic: [u8; 4] = [bytes[0], bytes[1], bytes[2], bytes[3]];
    let stats = if magic == *AUDIO_MAGIC {
        let (frames, format) = audio::decompress(&bytes)?;
        let restored_path = restored_sibling(path, "wav");
        let element_count = (frames.len() / format.sample_width.bytes()) as u64;
        publish(&restored_path, &wav::wav_to_bytes(&wav::WavData { format, frames }))?;
        DecompressStats {
            restored_path,
            element_count,
        }
    } else if magic == *IMAGE_MAGIC {
        let img = image::decompress(&bytes)?;
        let restored_path = restored_sibling(path, "ppm");
        publish(&restored_path, &ppm::ppm_to_bytes(&img))?;
        DecompressStats {
            restored_path,
            element_count: img.pixels().len() as u64,
        }
    } else if magic == *TEXT_MAGIC {
        let data = text::decompress(&bytes)?;
        let restored_path = restored_sibling(path, "txt");
        let element_count = data.len() as u64;
        publish(&restored_path, &data)?;
        DecompressStats {
            restored_path,
            element_count,
        }
    } else {
        return Err(HacError::MalformedContainer(format!(
            "unknown container magic {:?}",
            magic
        )));
    };

    log::info!(
        "decompressed {} -> {} ({} elements)",
        path.display(),
        stats.restored_path.display(),
        stats.element_count,
    );
    Ok(stats)
}

/// Starts playback of a wave file, or of a `.hac` container by
/// decompressing it to its restored sibling first. Returns `Ok(false)` when
/// the path is missing or unreadable; device failures surface as errors.
pub fn start_playback(path: &Path, controller: &PlaybackController) -> Result<bool, HacError> {
    if !path.exists() {
        log::warn!("cannot play {}: not found", path.display());
        return Ok(false);
    }

    let source = if path.extension().and_then(OsStr::to_str) == Some("hac") {
        match decompress_file(path) {
            Ok(stats) => stats.restored_path,
            Err(e) => {
                log::warn!("cannot play {}: {}", path.display(), e);
                return Ok(false);
            }
        }
    } else {
        path.to_path_buf()
    };

    let data = match wav::read_wav(&source) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("cannot play {}: {}", source.display(), e);
            return Ok(false);
        }
    };

    controller.start(data.frames, data.format)?;
    Ok(true)
}

/// Stops the active playback session, if any.
pub fn stop_playback(controller: &PlaybackController) {
    controller.stop();
}

/// Whether the controller currently has a playing session.
pub fn is_playing(controller: &PlaybackController) -> bool {
    controller.is_playing()
}

//==================================================================================
// Private helpers
//==================================================================================

fn ratio(original_size: u64, encoded: &Encoded) -> f64 {
    if encoded.payload_size == 0 {
        1.0
    } else {
        original_size as f64 / encoded.payload_size as f64
    }
}

/// `foo.hac` -> `foo_restored.<ext>` in the same directory.
fn restored_sibling(path: &Path, ext: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("restored");
    path.with_file_name(format!("{}_restored.{}", stem, ext))
}

/// Writes to a temporary sibling, then renames into place. The rename is
/// the publication point; a failure before it leaves the target untouched.
fn publish(path: &Path, bytes: &[u8]) -> Result<(), HacError> {
    let file_name = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| HacError::InternalError(format!("{} has no file name", path.display())))?;
    let tmp = path.with_file_name(format!("{}.tmp", file_name));

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
