//! Criterion benchmarks for the audio codec path, the hottest pipeline in
//! the crate. Run with `cargo bench`.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hac_codec::pipeline::audio;
use hac_codec::types::{AudioFormat, SampleWidth};

fn sine_frames() -> Vec<u8> {
    (0..44_100)
        .map(|i| {
            let t = i as f64 / 44_100.0;
            (6_000.0 * (2.0 * std::f64::consts::PI * 220.0 * t).sin()) as i16
        })
        .flat_map(|s| s.to_le_bytes())
        .collect()
}

fn bench_audio_codec(c: &mut Criterion) {
    let format = AudioFormat {
        channels: 1,
        sample_width: SampleWidth::I16,
        frame_rate: 44_100,
    };
    let frames = sine_frames();

    c.bench_function("audio_compress_1s_sine", |b| {
        b.iter(|| audio::compress(black_box(&frames), &format).unwrap())
    });

    let encoded = audio::compress(&frames, &format).unwrap();
    c.bench_function("audio_decompress_1s_sine", |b| {
        b.iter(|| audio::decompress(black_box(&encoded.bytes)).unwrap())
    });
}

criterion_group!(benches, bench_audio_codec);
criterion_main!(benches);
