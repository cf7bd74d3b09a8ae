use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use quadprobe::Table;
use quadprobe::prime::next_prime;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;

const SIZES: &[usize] = &[
    (1 << 8),
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
];

/// Starting capacity for tables that grow on their own.
const SMALL_PRIME: usize = 7;

fn random_keys(count: usize, seed: u64) -> Vec<u32> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut keys = Vec::with_capacity(count);
    let mut seen = hashbrown::HashSet::with_capacity(count);
    while keys.len() < count {
        let key = rng.random_range(1..=u32::MAX);
        if seen.insert(key) {
            keys.push(key);
        }
    }
    keys
}

/// Capacity that holds `count` entries without growing.
fn presized_capacity(count: usize) -> usize {
    next_prime(count * 2 + 3).unwrap()
}

fn filled_table(keys: &[u32]) -> Table<u64> {
    let mut table = Table::new(presized_capacity(keys.len())).unwrap();
    for &key in keys {
        table.insert(key, key as u64).unwrap();
    }
    table
}

fn filled_map(keys: &[u32]) -> HashbrownMap<u32, u64> {
    keys.iter().map(|&key| (key, key as u64)).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = random_keys(size, size as u64);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("quadprobe/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut table = Table::new(SMALL_PRIME).unwrap();
                    for key in keys {
                        table.insert(key, key as u64).unwrap();
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = HashbrownMap::new();
                    for key in keys {
                        map.insert(key, key as u64);
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_hit_miss");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = random_keys(size * 2, size as u64);
        let (present, absent) = keys.split_at(size);
        let table = filled_table(present);
        let map = filled_map(present);

        let mut lookups: Vec<u32> = present.iter().chain(absent).copied().collect();
        lookups.shuffle(&mut SmallRng::seed_from_u64(!(size as u64)));

        group.throughput(Throughput::Elements(lookups.len() as u64));
        group.bench_function(format!("quadprobe/{size}"), |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(table.get(*key));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &lookups {
                    black_box(map.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let keys = random_keys(size, size as u64);
        let table = filled_table(&keys);
        let map = filled_map(&keys);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("quadprobe/{size}"), |b| {
            b.iter_batched(
                || table.clone(),
                |mut table| {
                    for key in &keys {
                        black_box(table.remove(*key).unwrap());
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || map.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(key).unwrap());
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Inserts, lookups and removals drawn from a Zipf distribution, so a few
/// keys churn through removed slots repeatedly.
fn bench_mixed_zipf(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_zipf");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES {
        let key_distr = Zipf::new(size as f64, 1.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(size as u64);
        let ops: Vec<(u8, u32)> = (0..size)
            .map(|_| (rng.random_range(0..3u8), rng.sample(key_distr) as u32))
            .collect();
        group.throughput(Throughput::Elements(ops.len() as u64));

        group.bench_function(format!("quadprobe/{size}"), |b| {
            b.iter(|| {
                let mut table = Table::new(SMALL_PRIME).unwrap();
                for &(op, key) in &ops {
                    match op {
                        0 => {
                            let _ = black_box(table.insert(key, key as u64));
                        }
                        1 => {
                            black_box(table.get(key));
                        }
                        _ => {
                            let _ = black_box(table.remove(key));
                        }
                    }
                }
                black_box(table)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut map = HashbrownMap::new();
                for &(op, key) in &ops {
                    match op {
                        0 => {
                            black_box(map.entry(key).or_insert(key as u64));
                        }
                        1 => {
                            black_box(map.get(&key));
                        }
                        _ => {
                            black_box(map.remove(&key));
                        }
                    }
                }
                black_box(map)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_find,
    bench_remove,
    bench_mixed_zipf,
);

criterion_main!(benches);
