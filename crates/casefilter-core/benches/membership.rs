//! Benchmarks for SWAR distance and two-phase membership search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use casefilter_core::params::{MAX_EDIT_DISTANCE, WORD_LEN};
use casefilter_core::{codec, hamming, search, IndexBuilder, KeywordIndex, SearchContext};

fn random_word(rng: &mut StdRng) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    for symbol in &mut word {
        *symbol = b'A' + rng.gen_range(0..10);
    }
    word
}

fn build_index(count: usize, seed: u64) -> (Vec<[u8; WORD_LEN]>, KeywordIndex) {
    let mut rng = StdRng::seed_from_u64(seed);
    let words: Vec<[u8; WORD_LEN]> = (0..count).map(|_| random_word(&mut rng)).collect();
    let mut builder = IndexBuilder::with_capacity(count);
    for word in &words {
        builder.insert(word).unwrap();
    }
    (words, builder.finalize())
}

fn bench_hamming(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let a = codec::encode(&random_word(&mut rng));
    let b = codec::encode(&random_word(&mut rng));

    let mut group = c.benchmark_group("hamming");
    group.throughput(Throughput::Elements(1));
    group.bench_function("word", |bencher| {
        bencher.iter(|| hamming::hamming_word(black_box(a), black_box(b)));
    });
    group.bench_function("deleted", |bencher| {
        bencher.iter(|| {
            hamming::hamming_deleted(
                black_box(codec::delete(a, 7)),
                black_box(codec::delete(b, 7)),
            )
        });
    });
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1_000usize, 10_000] {
        let (words, index) = build_index(size, 42);
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctx = SearchContext::new();

        // Two substitutions into a known word: Phase A hit.
        let mut near = words[size / 2];
        near[1] = if near[1] == b'A' { b'B' } else { b'A' };
        near[8] = if near[8] == b'J' { b'I' } else { b'J' };
        group.bench_with_input(BenchmarkId::new("near_hit", size), &near, |bencher, q| {
            bencher.iter(|| search(&index, &mut ctx, black_box(q), MAX_EDIT_DISTANCE));
        });

        // Random queries mostly miss and walk both phases.
        let miss = random_word(&mut rng);
        group.bench_with_input(BenchmarkId::new("random", size), &miss, |bencher, q| {
            bencher.iter(|| search(&index, &mut ctx, black_box(q), MAX_EDIT_DISTANCE));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hamming, bench_search);
criterion_main!(benches);
