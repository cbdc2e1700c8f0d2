//! Benchmarks for the Arbor trace engine
//!
//! Measures recording cost for:
//! - Complete trees of growing size
//! - Left-skewed chains (deepest call stacks)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use arbor_tree::{build_level_order, Tree};
use arbor_trace::Trace;

fn complete_tree(nodes: usize) -> Tree {
    let values: Vec<Option<i32>> = (0..nodes).map(|i| Some((i % 201) as i32 - 100)).collect();
    build_level_order(&values)
}

fn left_chain(nodes: usize) -> Tree {
    // [v, v, null, v, null, ...] keeps every node on the left spine.
    let mut values = vec![Some(0)];
    for i in 1..nodes {
        values.push(Some((i % 100) as i32));
        values.push(None);
    }
    build_level_order(&values)
}

/// Benchmark recording complete trees
fn bench_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_complete");

    for &nodes in &[7usize, 63, 255, 1023] {
        let tree = complete_tree(nodes);
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &tree, |b, tree| {
            b.iter(|| Trace::record(black_box(tree)))
        });
    }
    group.finish();
}

/// Benchmark recording skewed chains
fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_left_chain");

    for &nodes in &[10usize, 100, 500] {
        let tree = left_chain(nodes);
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &tree, |b, tree| {
            b.iter(|| Trace::record(black_box(tree)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_complete, bench_chain);
criterion_main!(benches);
