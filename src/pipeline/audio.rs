//! The audio compression pipeline, the deepest path in the crate:
//! frequency count → RLE → Huffman tree/codes → bit packing → container, and
//! the exact reverse on decompression.
//!
//! Samples are widened to `i32` tokens, and the RLE stage's run lengths join
//! the same token alphabet: the Huffman stage sees the interleaved
//! `value, length, value, length, …` stream. That keeps the encode/decode
//! cost proportional to the RLE token count rather than the raw sample
//! count, which is where the win on repetitive audio comes from.

use std::time::Instant;

use crate::container::audio::AudioContainer;
use crate::error::HacError;
use crate::kernels::rle::RleRun;
use crate::kernels::{freq, huffman, rle};
use crate::pipeline::Encoded;
use crate::types::{AudioFormat, SampleWidth};

/// Compresses raw interleaved PCM frame bytes into a `.hac` container.
pub fn compress(frames: &[u8], format: &AudioFormat) -> Result<Encoded, HacError> {
    let started = Instant::now();
    let samples = frames_to_samples(frames, format.sample_width)?;

    let rle_started = Instant::now();
    let runs = rle::encode(&samples);
    let tokens = flatten_runs(&runs)?;
    let rle_secs = rle_started.elapsed().as_secs_f64();

    let huffman_started = Instant::now();
    let table = freq::count(&tokens);
    let tree = huffman::build_tree(&table);
    let (payload, valid_bits) = match &tree {
        Some(root) => {
            let codes = huffman::generate_codes(root);
            huffman::encode(&tokens, &codes)?
        }
        None => (Vec::new(), 0),
    };
    let huffman_secs = huffman_started.elapsed().as_secs_f64();

    let payload_size = payload.len();
    let container = AudioContainer {
        format: *format,
        sample_count: samples.len() as u64,
        valid_bits,
        tree,
        payload,
    };

    log::debug!(
        "audio compress: {} samples -> {} tokens -> {} payload bytes in {:.2}s (rle {:.2}s, huffman {:.2}s)",
        samples.len(),
        tokens.len(),
        payload_size,
        started.elapsed().as_secs_f64(),
        rle_secs,
        huffman_secs,
    );
    codec_metric!(
        "event" = "audio_compress",
        "samples" = &samples.len(),
        "tokens" = &tokens.len(),
        "distinct" = &table.len(),
        "payload_bytes" = &payload_size,
    );

    Ok(Encoded {
        bytes: container.to_bytes(),
        payload_size,
    })
}

/// Decompresses a `.hac` container back to raw PCM frame bytes and the
/// format metadata needed to write them out.
pub fn decompress(bytes: &[u8]) -> Result<(Vec<u8>, AudioFormat), HacError> {
    let started = Instant::now();
    let container = AudioContainer::from_bytes(bytes)?;

    let tokens = match &container.tree {
        Some(root) => huffman::decode(&container.payload, container.valid_bits, root)?,
        None => {
            if container.valid_bits != 0 || container.sample_count != 0 {
                return Err(HacError::MalformedContainer(
                    "container declares data but carries no code tree".to_string(),
                ));
            }
            Vec::new()
        }
    };

    let runs = unflatten_tokens(&tokens)?;
    let samples = rle::decode(&runs, container.sample_count as usize)?;
    let frames = samples_to_frames(&samples, container.format.sample_width)?;

    log::debug!(
        "audio decompress: {} tokens -> {} samples in {:.2}s",
        tokens.len(),
        samples.len(),
        started.elapsed().as_secs_f64(),
    );

    Ok((frames, container.format))
}

//==================================================================================
// Sample/token plumbing
//==================================================================================

/// Widens raw PCM bytes into the `i32` token alphabet. 8-bit samples are
/// unsigned, 16-bit samples signed little-endian, per WAV convention.
fn frames_to_samples(frames: &[u8], width: SampleWidth) -> Result<Vec<i32>, HacError> {
    match width {
        SampleWidth::U8 => Ok(frames.iter().map(|&b| b as i32).collect()),
        SampleWidth::I16 => {
            if frames.len() % 2 != 0 {
                return Err(HacError::UnsupportedFormat(format!(
                    "16-bit PCM data has odd byte length {}",
                    frames.len()
                )));
            }
            Ok(frames
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as i32)
                .collect())
        }
    }
}

/// Narrows decoded tokens back to their original width, refusing values a
/// corrupted stream may have pushed out of range.
fn samples_to_frames(samples: &[i32], width: SampleWidth) -> Result<Vec<u8>, HacError> {
    match width {
        SampleWidth::U8 => {
            let mut frames = Vec::with_capacity(samples.len());
            for &s in samples {
                let b = u8::try_from(s).map_err(|_| out_of_range(s, "u8"))?;
                frames.push(b);
            }
            Ok(frames)
        }
        SampleWidth::I16 => {
            let mut frames = Vec::with_capacity(samples.len() * 2);
            for &s in samples {
                let v = i16::try_from(s).map_err(|_| out_of_range(s, "i16"))?;
                frames.extend_from_slice(&v.to_le_bytes());
            }
            Ok(frames)
        }
    }
}

fn out_of_range(sample: i32, width: &str) -> HacError {
    HacError::MalformedContainer(format!(
        "decoded sample {} does not fit the declared {} width",
        sample, width
    ))
}

/// Interleaves runs into the shared token alphabet. A run longer than
/// `i32::MAX` cannot be represented as a length token and is rejected
/// rather than wrapped.
fn flatten_runs(runs: &[RleRun<i32>]) -> Result<Vec<i32>, HacError> {
    let mut tokens = Vec::with_capacity(runs.len() * 2);
    for run in runs {
        let length = i32::try_from(run.length).map_err(|_| HacError::RunLengthOverflow {
            length: run.length,
            max: i32::MAX as u64,
        })?;
        tokens.push(run.value);
        tokens.push(length);
    }
    Ok(tokens)
}

/// Splits the token stream back into runs, validating its pair structure.
fn unflatten_tokens(tokens: &[i32]) -> Result<Vec<RleRun<i32>>, HacError> {
    if tokens.len() % 2 != 0 {
        return Err(HacError::MalformedContainer(format!(
            "token stream has odd length {}; expected value/length pairs",
            tokens.len()
        )));
    }

    let mut runs = Vec::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks_exact(2) {
        let (value, length) = (pair[0], pair[1]);
        if length < 1 {
            return Err(HacError::MalformedContainer(format!(
                "non-positive run length token {}",
                length
            )));
        }
        runs.push(RleRun {
            value,
            length: length as u64,
        });
    }
    Ok(runs)
}
