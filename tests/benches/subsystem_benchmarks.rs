//! # Marginalia Subsystem Benchmarks
//!
//! Hot paths on every write and read:
//!
//! | Subsystem | Operation |
//! |-----------|-----------|
//! | mg-03 Shard Router | URL normalization and placement |
//! | mg-02 Graph Store | HAM merge of one annotation put |
//! | shared-crypto | Ed25519 verification against a `did:key` |
//! | mg-04 Write Validator | Full local write through the validated store |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mg_02_graph_store::domain::merge;
use mg_03_shard_router::{normalize_url, ShardRouter, ShardingApi};
use mg_tests::harness::{alice, TestNode, NOW};
use shared_crypto::verify_did_signature;
use std::time::Duration;

const URLS: [&str; 4] = [
    "https://example.com/page?utm_source=x",
    "https://https://Example.COM/a/b/c/?ref=1&utm_medium=mail#top",
    "https://google.com/search?q=rust+crdt",
    "not a url/?utm_x=1",
];

fn bench_shard_router(c: &mut Criterion) {
    let mut group = c.benchmark_group("mg-03-shard-router");
    let router = ShardRouter::default();

    for url in URLS {
        group.bench_with_input(BenchmarkId::new("normalize", url), url, |b, url| {
            b.iter(|| black_box(normalize_url(url)))
        });
        group.bench_with_input(BenchmarkId::new("placement", url), url, |b, url| {
            b.iter(|| black_box(router.placement(url)))
        });
    }
    group.finish();
}

fn bench_ham_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("mg-02-graph-store");
    let node = TestNode::standalone();
    let mut put = node.annotation_put(&alice(), URLS[0], "a1", "hello");
    put.stamp(NOW);

    group.bench_function("merge_new_node", |b| {
        b.iter(|| black_box(merge(None, &put, NOW + 600_000)))
    });

    let existing = merge(None, &put, NOW + 600_000).node;
    let mut update = node.annotation_put(&alice(), URLS[0], "a1", "edited");
    update.stamp(NOW + 1);
    group.bench_function("merge_update", |b| {
        b.iter(|| black_box(merge(Some(&existing), &update, NOW + 600_000)))
    });
    group.finish();
}

fn bench_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-crypto");
    group.measurement_time(Duration::from_secs(5));
    let keypair = alice();
    let did = keypair.did();

    for size in [64usize, 512, 4096] {
        let message = vec![0x5a; size];
        let signature = keypair.sign_hex(&message);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("verify_did", size), &message, |b, m| {
            b.iter(|| black_box(verify_did_signature(&did, m, &signature).is_ok()))
        });
    }
    group.finish();
}

fn bench_validated_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("mg-04-write-validator");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let node = TestNode::standalone();
    let author = alice();
    let mut n = 0u64;

    group.bench_function("local_annotation_put", |b| {
        b.iter(|| {
            n += 1;
            // Stay under the per-author rate limit.
            node.container.validator.rate_limiter().purge_idle(u64::MAX);
            let put = node.annotation_put(&author, URLS[0], &format!("b{n}"), "bench");
            black_box(runtime.block_on(node.put(put)))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_shard_router,
    bench_ham_merge,
    bench_signature,
    bench_validated_write
);
criterion_main!(benches);
