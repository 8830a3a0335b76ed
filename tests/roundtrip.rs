//! End-to-end tests over the file-level boundary API: real files in a
//! scratch directory, compressed and restored through the public surface.

use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use hac_codec::bridge::wav::{parse_wav, wav_to_bytes, WavData};
use hac_codec::bridge::{compress_file, decompress_file, ppm};
use hac_codec::types::{AudioFormat, Rgb, RgbImage, SampleWidth};
use hac_codec::HacError;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("hac-core-roundtrip-tests")
        .join(format!("{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn mono_i16(frame_rate: u32) -> AudioFormat {
    AudioFormat {
        channels: 1,
        sample_width: SampleWidth::I16,
        frame_rate,
    }
}

fn i16_frames(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Two seconds of a 440 Hz sine at 44.1 kHz, quantized to i16.
fn sine_samples() -> Vec<i16> {
    (0..88_200)
        .map(|i| {
            let t = i as f64 / 44_100.0;
            (8_000.0 * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as i16
        })
        .collect()
}

#[test]
fn test_audio_end_to_end_is_lossless() {
    let dir = scratch_dir("audio-sine");
    let input = dir.join("tone.wav");
    let original = WavData {
        format: mono_i16(44_100),
        frames: i16_frames(&sine_samples()),
    };
    fs::write(&input, wav_to_bytes(&original)).unwrap();

    let stats = compress_file(&input).unwrap();
    assert_eq!(stats.container_path, dir.join("tone.hac"));
    assert_eq!(stats.original_size, original.frames.len() as u64);

    let restored = decompress_file(&stats.container_path).unwrap();
    assert_eq!(restored.element_count, 88_200);

    let restored_wav = parse_wav(&fs::read(&restored.restored_path).unwrap()).unwrap();
    assert_eq!(restored_wav, original);
}

#[test]
fn test_constant_audio_compresses_below_raw_size() {
    let dir = scratch_dir("audio-constant");
    let input = dir.join("flat.wav");
    let original = WavData {
        format: mono_i16(44_100),
        frames: i16_frames(&vec![1_000i16; 44_100]),
    };
    fs::write(&input, wav_to_bytes(&original)).unwrap();

    let stats = compress_file(&input).unwrap();
    assert!(stats.compressed_size < stats.original_size);
    assert!(stats.ratio > 1.0);

    let restored = decompress_file(&stats.container_path).unwrap();
    let restored_wav = parse_wav(&fs::read(&restored.restored_path).unwrap()).unwrap();
    assert_eq!(restored_wav, original);
}

#[test]
fn test_random_audio_expands_but_does_not_error() {
    let dir = scratch_dir("audio-random");
    let input = dir.join("noise.wav");

    let mut frames = vec![0u8; 4_096];
    StdRng::seed_from_u64(0x5EED).fill_bytes(&mut frames);
    let original = WavData {
        format: AudioFormat {
            channels: 1,
            sample_width: SampleWidth::U8,
            frame_rate: 8_000,
        },
        frames,
    };
    fs::write(&input, wav_to_bytes(&original)).unwrap();

    let stats = compress_file(&input).unwrap();
    // Maximal symbol diversity: no savings expected, only a faithful report.
    assert!(stats.ratio <= 1.0);

    let restored = decompress_file(&stats.container_path).unwrap();
    let restored_wav = parse_wav(&fs::read(&restored.restored_path).unwrap()).unwrap();
    assert_eq!(restored_wav, original);
}

#[test]
fn test_truncated_container_is_rejected_not_a_crash() {
    let dir = scratch_dir("audio-truncated");
    let input = dir.join("tone.wav");
    let original = WavData {
        format: mono_i16(22_050),
        frames: i16_frames(&(0..500).map(|i| (i % 37) as i16).collect::<Vec<_>>()),
    };
    fs::write(&input, wav_to_bytes(&original)).unwrap();

    let stats = compress_file(&input).unwrap();
    let container = fs::read(&stats.container_path).unwrap();

    // Cut after the header but inside the payload.
    let truncated_path = dir.join("tone-truncated.hac");
    fs::write(&truncated_path, &container[..container.len() - 3]).unwrap();

    let result = decompress_file(&truncated_path);
    assert!(matches!(result, Err(HacError::MalformedContainer(_))));
}

#[test]
fn test_uniform_image_reduces_to_one_run() {
    let dir = scratch_dir("image-uniform");
    let input = dir.join("teal.ppm");
    let image = RgbImage::new(120, 80, vec![Rgb::new(0, 128, 128); 9_600]).unwrap();
    ppm::write_ppm(&input, &image).unwrap();

    let stats = compress_file(&input).unwrap();
    // Fixed 14-byte header plus a single 5-byte record.
    assert_eq!(stats.compressed_size, 19);

    let restored = decompress_file(&stats.container_path).unwrap();
    assert_eq!(restored.element_count, 9_600);
    assert_eq!(ppm::read_ppm(&restored.restored_path).unwrap(), image);
}

#[test]
fn test_image_end_to_end_is_lossless() {
    let dir = scratch_dir("image-stripes");
    let input = dir.join("stripes.ppm");
    let pixels: Vec<Rgb> = (0..64 * 64)
        .map(|i| {
            let band = (i / 64 / 8) as u8;
            Rgb::new(band * 30, 255 - band * 30, band)
        })
        .collect();
    let image = RgbImage::new(64, 64, pixels).unwrap();
    ppm::write_ppm(&input, &image).unwrap();

    let stats = compress_file(&input).unwrap();
    let restored = decompress_file(&stats.container_path).unwrap();
    assert_eq!(ppm::read_ppm(&restored.restored_path).unwrap(), image);
    assert_eq!(restored.element_count, 64 * 64);
}

#[test]
fn test_text_end_to_end_is_lossless() {
    let dir = scratch_dir("text");
    let input = dir.join("fable.txt");
    let body = "the north wind and the sun were disputing which was the stronger, \
                when a traveler came along wrapped in a warm cloak.\n"
        .repeat(40);
    fs::write(&input, &body).unwrap();

    let stats = compress_file(&input).unwrap();
    assert!(stats.compressed_size < stats.original_size);

    let restored = decompress_file(&stats.container_path).unwrap();
    assert_eq!(restored.element_count, body.len() as u64);
    assert_eq!(fs::read(&restored.restored_path).unwrap(), body.as_bytes());
}

#[test]
fn test_empty_audio_file_roundtrips() {
    let dir = scratch_dir("audio-empty");
    let input = dir.join("silence.wav");
    let original = WavData {
        format: mono_i16(44_100),
        frames: Vec::new(),
    };
    fs::write(&input, wav_to_bytes(&original)).unwrap();

    let stats = compress_file(&input).unwrap();
    let restored = decompress_file(&stats.container_path).unwrap();
    assert_eq!(restored.element_count, 0);

    let restored_wav = parse_wav(&fs::read(&restored.restored_path).unwrap()).unwrap();
    assert_eq!(restored_wav, original);
}
