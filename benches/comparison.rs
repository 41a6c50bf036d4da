// Copyright © SurrealDB Ltd
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Criterion benchmarks comparing Cedartree against other ordered maps.
//!
//! This benchmark suite compares:
//! - `cedartree::Tree` - B+ tree over byte-string keys with a chained leaf level
//! - `crossbeam_skiplist::SkipMap` - Lock-free concurrent skip list
//! - `std::collections::BTreeMap` - Standard library B-tree
//!
//! Keys are 8-byte big-endian encodings of integers, so byte order matches
//! numeric order for every structure. The fanout benchmarks sweep the tree's
//! node capacities to show their effect on insert and lookup cost.
//! Concurrent benchmarks wrap the tree in `SharedTree` and BTreeMap in
//! `parking_lot::RwLock`.

use cedartree::{Config, SharedTree, Tree};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crossbeam_skiplist::SkipMap;
use parking_lot::RwLock;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeMap;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

const SEED: u64 = 42;

// ============================================================================
// Helper Functions
// ============================================================================

fn encode(i: u64) -> [u8; 8] {
	i.to_be_bytes()
}

/// Generate sequential keys from 0 to count-1
fn sequential_keys(count: usize) -> Vec<[u8; 8]> {
	(0..count as u64).map(encode).collect()
}

/// Generate the same keys in a seeded random order
fn random_keys(count: usize) -> Vec<[u8; 8]> {
	let mut rng = StdRng::seed_from_u64(SEED);
	let mut keys = sequential_keys(count);
	keys.shuffle(&mut rng);
	keys
}

/// Generate keys that don't exist in a sequential key set
fn missing_keys(count: usize) -> Vec<[u8; 8]> {
	(0..count as u64).map(|i| encode(u64::MAX - i)).collect()
}

fn populated_tree(keys: &[[u8; 8]], config: Config) -> Tree<u64> {
	let mut tree = Tree::with_config(config).unwrap();
	for (i, k) in keys.iter().enumerate() {
		tree.insert(k, i as u64);
	}
	tree
}

// ============================================================================
// Single-Threaded Insert Benchmarks
// ============================================================================

fn bench_insert(c: &mut Criterion) {
	let mut group = c.benchmark_group("insert");

	for count in [1_000, 10_000, 100_000] {
		group.throughput(Throughput::Elements(count as u64));

		let orders = [("sequential", sequential_keys(count)), ("random", random_keys(count))];
		for (order, keys) in orders {
			group.bench_with_input(
				BenchmarkId::new(format!("cedartree/{order}"), count),
				&keys,
				|b, keys| {
					b.iter_batched(
						Tree::<u64>::default,
						|mut tree| {
							for (i, k) in keys.iter().enumerate() {
								black_box(tree.insert(k, i as u64));
							}
							tree
						},
						criterion::BatchSize::SmallInput,
					)
				},
			);

			group.bench_with_input(
				BenchmarkId::new(format!("skipmap/{order}"), count),
				&keys,
				|b, keys| {
					b.iter_batched(
						SkipMap::new,
						|map| {
							for (i, k) in keys.iter().enumerate() {
								black_box(map.insert(*k, i as u64));
							}
							map
						},
						criterion::BatchSize::SmallInput,
					)
				},
			);

			group.bench_with_input(
				BenchmarkId::new(format!("btreemap/{order}"), count),
				&keys,
				|b, keys| {
					b.iter_batched(
						BTreeMap::new,
						|mut map| {
							for (i, k) in keys.iter().enumerate() {
								black_box(map.insert(*k, i as u64));
							}
							map
						},
						criterion::BatchSize::SmallInput,
					)
				},
			);
		}
	}
	group.finish();
}

// ============================================================================
// Single-Threaded Lookup Benchmarks
// ============================================================================

fn bench_find(c: &mut Criterion) {
	let mut group = c.benchmark_group("find");

	for count in [10_000, 100_000] {
		let keys = sequential_keys(count);
		let hits = random_keys(count);
		let misses = missing_keys(count);

		let tree = populated_tree(&keys, Config::default());
		let skipmap: SkipMap<[u8; 8], u64> = SkipMap::new();
		let mut btreemap: BTreeMap<[u8; 8], u64> = BTreeMap::new();
		for (i, k) in keys.iter().enumerate() {
			skipmap.insert(*k, i as u64);
			btreemap.insert(*k, i as u64);
		}

		group.throughput(Throughput::Elements(count as u64));

		for (kind, probes) in [("hit", &hits), ("miss", &misses)] {
			group.bench_function(BenchmarkId::new(format!("cedartree/{kind}"), count), |b| {
				b.iter(|| {
					for k in probes {
						black_box(tree.find(k));
					}
				})
			});

			group.bench_function(BenchmarkId::new(format!("skipmap/{kind}"), count), |b| {
				b.iter(|| {
					for k in probes {
						black_box(skipmap.get(k).map(|e| *e.value()));
					}
				})
			});

			group.bench_function(BenchmarkId::new(format!("btreemap/{kind}"), count), |b| {
				b.iter(|| {
					for k in probes {
						black_box(btreemap.get(k));
					}
				})
			});
		}
	}
	group.finish();
}

fn bench_fanout(c: &mut Criterion) {
	let mut group = c.benchmark_group("fanout");
	let count = 100_000;
	let keys = random_keys(count);
	group.throughput(Throughput::Elements(count as u64));

	for capacity in [4, 16, 64, 200] {
		let config = Config::new(capacity, capacity);

		group.bench_with_input(BenchmarkId::new("insert", capacity), &keys, |b, keys| {
			b.iter(|| black_box(populated_tree(keys, config)))
		});

		let tree = populated_tree(&keys, config);
		group.bench_with_input(BenchmarkId::new("find", capacity), &keys, |b, keys| {
			b.iter(|| {
				for k in keys {
					black_box(tree.find(k));
				}
			})
		});
	}
	group.finish();
}

// ============================================================================
// Delete Benchmarks
// ============================================================================

fn bench_delete(c: &mut Criterion) {
	let mut group = c.benchmark_group("delete");

	for count in [1_000, 10_000, 100_000] {
		let keys = sequential_keys(count);
		let order = random_keys(count);
		group.throughput(Throughput::Elements(count as u64));

		group.bench_with_input(BenchmarkId::new("cedartree", count), &order, |b, order| {
			b.iter_batched(
				|| populated_tree(&keys, Config::default()),
				|mut tree| {
					for k in order {
						black_box(tree.delete(k));
					}
					tree
				},
				criterion::BatchSize::LargeInput,
			)
		});

		group.bench_with_input(BenchmarkId::new("btreemap", count), &order, |b, order| {
			b.iter_batched(
				|| keys.iter().enumerate().map(|(i, k)| (*k, i as u64)).collect::<BTreeMap<_, _>>(),
				|mut map| {
					for k in order {
						black_box(map.remove(k));
					}
					map
				},
				criterion::BatchSize::LargeInput,
			)
		});
	}
	group.finish();
}

// ============================================================================
// Range Benchmarks
// ============================================================================

fn bench_range(c: &mut Criterion) {
	let mut group = c.benchmark_group("range");

	for count in [10_000, 100_000, 1_000_000] {
		let keys = sequential_keys(count);

		let tree = populated_tree(&keys, Config::default());
		let skipmap: SkipMap<[u8; 8], u64> = SkipMap::new();
		let mut btreemap: BTreeMap<[u8; 8], u64> = BTreeMap::new();
		for (i, k) in keys.iter().enumerate() {
			skipmap.insert(*k, i as u64);
			btreemap.insert(*k, i as u64);
		}

		// Range covers 10% of entries in the middle
		let range_size = count / 10;
		let start = encode((count / 2 - range_size / 2) as u64);
		let end = encode((count / 2 + range_size / 2) as u64);

		group.throughput(Throughput::Elements(range_size as u64));

		group.bench_function(BenchmarkId::new("cedartree", count), |b| {
			b.iter(|| {
				let values = tree.find_range(start, end);
				let sum = values.into_iter().fold(0u64, |acc, v| acc.wrapping_add(*v));
				black_box(sum)
			})
		});

		group.bench_function(BenchmarkId::new("skipmap", count), |b| {
			b.iter(|| {
				let mut sum = 0u64;
				for entry in skipmap.range(start..=end) {
					sum = sum.wrapping_add(*entry.value());
				}
				black_box(sum)
			})
		});

		group.bench_function(BenchmarkId::new("btreemap", count), |b| {
			b.iter(|| {
				let mut sum = 0u64;
				for (_, &v) in btreemap.range(start..=end) {
					sum = sum.wrapping_add(v);
				}
				black_box(sum)
			})
		});
	}
	group.finish();
}

// ============================================================================
// Concurrent Benchmarks
// ============================================================================

fn bench_concurrent_readers(c: &mut Criterion) {
	let mut group = c.benchmark_group("concurrent_readers");

	let cpu_cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(8);
	let thread_counts = [1, 4, cpu_cores];

	for count in [10_000, 100_000] {
		let keys = sequential_keys(count);
		let lookup_count = 1000;
		let lookup_keys: Vec<[u8; 8]> = random_keys(count)[..lookup_count].to_vec();

		let tree = Arc::new(SharedTree::from(populated_tree(&keys, Config::default())));
		let skipmap: Arc<SkipMap<[u8; 8], u64>> = Arc::new(SkipMap::new());
		let btreemap: Arc<RwLock<BTreeMap<[u8; 8], u64>>> = Arc::new(RwLock::new(BTreeMap::new()));
		for (i, k) in keys.iter().enumerate() {
			skipmap.insert(*k, i as u64);
			btreemap.write().insert(*k, i as u64);
		}

		for &num_threads in &thread_counts {
			let total_ops = lookup_count * num_threads;
			group.throughput(Throughput::Elements(total_ops as u64));

			group.bench_with_input(
				BenchmarkId::new(format!("cedartree/{}t", num_threads), count),
				&lookup_keys,
				|b, keys| {
					b.iter(|| {
						let handles: Vec<_> = (0..num_threads)
							.map(|_| {
								let tree = Arc::clone(&tree);
								let keys = keys.clone();
								thread::spawn(move || {
									for k in &keys {
										black_box(tree.get(k));
									}
								})
							})
							.collect();
						for h in handles {
							h.join().unwrap();
						}
					})
				},
			);

			group.bench_with_input(
				BenchmarkId::new(format!("skipmap/{}t", num_threads), count),
				&lookup_keys,
				|b, keys| {
					b.iter(|| {
						let handles: Vec<_> = (0..num_threads)
							.map(|_| {
								let map = Arc::clone(&skipmap);
								let keys = keys.clone();
								thread::spawn(move || {
									for k in &keys {
										black_box(map.get(k).map(|e| *e.value()));
									}
								})
							})
							.collect();
						for h in handles {
							h.join().unwrap();
						}
					})
				},
			);

			group.bench_with_input(
				BenchmarkId::new(format!("btreemap_rwlock/{}t", num_threads), count),
				&lookup_keys,
				|b, keys| {
					b.iter(|| {
						let handles: Vec<_> = (0..num_threads)
							.map(|_| {
								let map = Arc::clone(&btreemap);
								let keys = keys.clone();
								thread::spawn(move || {
									for k in &keys {
										black_box(map.read().get(k).copied());
									}
								})
							})
							.collect();
						for h in handles {
							h.join().unwrap();
						}
					})
				},
			);
		}
	}
	group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
	single_threaded_benches,
	bench_insert,
	bench_find,
	bench_fanout,
	bench_delete,
	bench_range,
);

criterion_group!(concurrent_benches, bench_concurrent_readers);

criterion_main!(single_threaded_benches, concurrent_benches);
