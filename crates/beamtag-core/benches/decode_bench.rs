use std::sync::Arc;

use beamtag_core::{Decoder, DecoderConfig, LabelAlphabet, Scheme};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// A sentence of `len` tokens alternating between a confident entity start,
/// an ambiguous continuation and a confident outside token.
fn sentence(alphabet: &LabelAlphabet, len: usize) -> Vec<Vec<f64>> {
    let n = alphabet.len();
    (0..len)
        .map(|i| {
            let mut scores = vec![0.1 / (n - 1) as f64; n];
            let (top, second) = match i % 3 {
                0 => (1, 4),
                1 => (2, 3),
                _ => (0, 0),
            };
            scores[top] = 0.6;
            scores[second] += 0.3;
            let total: f64 = scores.iter().sum();
            scores.iter().map(|s| s / total).collect()
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let alphabet =
        Arc::new(LabelAlphabet::complete(Scheme::Bieou, &["PER", "LOC", "ORG"]).unwrap());
    let short = sentence(&alphabet, 8);
    let long = sentence(&alphabet, 40);

    let beam = Decoder::new(alphabet.clone(), DecoderConfig::default()).unwrap();
    c.bench_function("decode_beam_8_tokens", |b| {
        b.iter(|| beam.decode(black_box(&short)).unwrap());
    });

    // Longer than the default iteration budget: exercises the greedy path.
    c.bench_function("decode_greedy_40_tokens", |b| {
        b.iter(|| beam.decode(black_box(&long)).unwrap());
    });

    let wide = DecoderConfig::unbounded().with_beam_size(Some(8));
    let unbounded = Decoder::new(alphabet, wide).unwrap();
    c.bench_function("decode_wide_beam_40_tokens", |b| {
        b.iter(|| unbounded.decode(black_box(&long)).unwrap());
    });

    let batch: Vec<Vec<Vec<f64>>> = (0..64).map(|_| short.clone()).collect();
    c.bench_function("decode_batch_64x8", |b| {
        b.iter(|| beam.decode_batch(black_box(&batch), 4).unwrap());
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
