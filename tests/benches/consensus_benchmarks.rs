//! # Consensus Benchmarks
//!
//! Hot-path timings the admission pipeline budget rests on:
//!
//! | Path | Target |
//! |------|--------|
//! | PoIES scoring | < 10µs per bag |
//! | Hash-share verification | < 50µs per envelope |
//! | Header codec round trip | < 5µs |
//! | Fixed-point lottery draw | < 5µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use animica_poies::{
    hash_share_digest, lottery, score_block, ProofRegistry, RawContribution, ScoringPolicy,
    VerifyContext,
};
use shared_types::{wire, BlockHeader, Fixed, PolicyRoots, ProofEnvelope, ProofKind, ProofMetrics};

fn bench_scoring(c: &mut Criterion) {
    let registry = ProofRegistry::mainnet_default();
    let policy = ScoringPolicy::default();
    let mut group = c.benchmark_group("poies-scoring");

    for bag_size in [1usize, 16, 128, 1024] {
        let contributions: Vec<RawContribution> = (0..bag_size)
            .map(|i| RawContribution {
                kind: ProofKind::ALL[i % 5],
                psi_raw: Fixed::from_ratio((i % 7 + 1) as i64, 10),
                nullifier: [(i % 251) as u8; 32],
            })
            .collect();
        group.throughput(Throughput::Elements(bag_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(bag_size),
            &contributions,
            |b, contributions| {
                b.iter(|| {
                    score_block(
                        &registry,
                        &policy,
                        black_box(contributions),
                        Fixed::from_ratio(1, 2),
                        Fixed::from_int(1),
                    )
                })
            },
        );
    }
    group.finish();
}

fn bench_envelope_verification(c: &mut Criterion) {
    let registry = ProofRegistry::mainnet_default();
    let ctx = VerifyContext {
        height: 100,
        beacon_round: 3,
    };
    let producer = [0x42u8; 32];
    let digest = hash_share_digest(&producer, 7);
    let mut payload = Vec::with_capacity(40);
    payload.extend_from_slice(&7u64.to_be_bytes());
    payload.extend_from_slice(&digest);
    let envelope = ProofEnvelope {
        kind: ProofKind::HashShare,
        payload,
        producer,
        nullifier_input: digest.to_vec(),
        metrics: ProofMetrics {
            units: 0,
            quality_millis: 1_000,
        },
    };

    c.bench_function("hash-share-verify", |b| {
        b.iter(|| registry.verify(black_box(&envelope), &ctx).unwrap())
    });
}

fn bench_header_codec(c: &mut Criterion) {
    let header = BlockHeader {
        version: 1,
        height: 1_000_000,
        parent_hash: [0x11; 32],
        timestamp: 1_700_000_000,
        miner: [0x22; 32],
        nonce: 42,
        theta: Fixed::from_ratio(6, 5),
        seed_u: [0x33; 32],
        proof_bag_root: [0x44; 32],
        beacon_round: 512,
        state_root: [0x55; 32],
        receipts_root: [0x66; 32],
        da_root: [0x77; 32],
        policy_roots: PolicyRoots::default(),
        signature: [0x88; 64],
    };

    c.bench_function("header-encode", |b| {
        b.iter(|| wire::encode_header(black_box(&header)))
    });
    let bytes = wire::encode_header(&header);
    c.bench_function("header-decode", |b| {
        b.iter(|| wire::decode_header(black_box(&bytes)).unwrap())
    });
    c.bench_function("header-hash", |b| b.iter(|| black_box(&header).hash()));
}

fn bench_lottery_draw(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let digests: Vec<[u8; 32]> = (0..64)
        .map(|_| {
            let mut d = [0u8; 32];
            rng.fill(&mut d);
            d
        })
        .collect();

    c.bench_function("lottery-draw", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % digests.len();
            lottery::draw(black_box(&digests[i]))
        })
    });
}

criterion_group!(
    benches,
    bench_scoring,
    bench_envelope_verification,
    bench_header_codec,
    bench_lottery_draw
);
criterion_main!(benches);
