//! Mining throughput benchmarks.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use salient::miner::{Miner, MinerConfig};
use salient::tagger::StreamTagger;

/// Deterministic pseudo-text: a small word alphabet with document breaks,
/// so the corpora have realistic repetition without fixture files.
fn synthetic_corpus(words: usize, seed: u32) -> Vec<u8> {
    const VOCABULARY: &[&[u8]] = &[
        b"error", b"warning", b"request", b"timeout", b"connection", b"refused", b"retry",
        b"upstream", b"handler", b"socket",
    ];

    let mut state = seed;
    let mut corpus = Vec::with_capacity(words * 8);

    for i in 0..words {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let word = VOCABULARY[(state >> 16) as usize % VOCABULARY.len()];
        corpus.extend_from_slice(word);
        corpus.push(if i % 40 == 39 { 0 } else { b' ' });
    }

    corpus
}

fn bench_mining(c: &mut Criterion) {
    let mut group = c.benchmark_group("mine");

    for &words in &[1_000usize, 10_000, 50_000] {
        let input0 = synthetic_corpus(words, 1);
        let input1 = synthetic_corpus(words, 2);

        group.bench_with_input(BenchmarkId::new("counts", words), &words, |b, _| {
            b.iter(|| {
                let miner =
                    Miner::new(black_box(&input0), black_box(&input1), MinerConfig::default())
                        .unwrap();
                let mut emitted = 0usize;
                miner
                    .run(&mut |_, _, _, _| {
                        emitted += 1;
                        Ok(())
                    })
                    .unwrap();
                emitted
            })
        });

        group.bench_with_input(BenchmarkId::new("documents", words), &words, |b, _| {
            let config = MinerConfig {
                document_mode: true,
                ..Default::default()
            };
            b.iter(|| {
                let miner =
                    Miner::new(black_box(&input0), black_box(&input1), config.clone()).unwrap();
                let mut emitted = 0usize;
                miner
                    .run(&mut |_, _, _, _| {
                        emitted += 1;
                        Ok(())
                    })
                    .unwrap();
                emitted
            })
        });
    }

    group.finish();
}

fn bench_tagger(c: &mut Criterion) {
    let document = {
        let mut doc = b"From: bench\nSubject: throughput\n\n<html><body>".to_vec();
        for _ in 0..1_000 {
            doc.extend_from_slice(b"<p class=\"x\">text <!-- note --></p>");
        }
        doc.extend_from_slice(b"</body></html>");
        doc
    };

    c.bench_function("tag_document", |b| {
        b.iter(|| {
            let mut tagger = StreamTagger::new();
            let mut checksum = 0u64;
            for &byte in black_box(&document) {
                checksum = checksum.wrapping_add(tagger.classify(byte) as u64);
            }
            checksum
        })
    });
}

criterion_group!(benches, bench_mining, bench_tagger);
criterion_main!(benches);
