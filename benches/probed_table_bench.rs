use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use hashbrown::HashMap;
use probed_table::ProbedTable;
use std::time::Duration;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

/// Random alphanumeric strings of 5 to 20 characters.
fn random_strings(seed: u64, n: usize) -> Vec<String> {
    let mut rng = lcg(seed);
    (0..n)
        .map(|_| {
            let len = 5 + (rng.next().unwrap() >> 33) as usize % 16;
            (0..len)
                .map(|_| CHARSET[(rng.next().unwrap() >> 33) as usize % CHARSET.len()] as char)
                .collect()
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let keys: Vec<_> = lcg(1).take(10_000).map(key).collect();
    let mut group = c.benchmark_group("insert_10k");
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("probed_table", |b| {
        b.iter_batched(
            ProbedTable::new,
            |mut t| {
                for k in &keys {
                    t.insert(k, k).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("hashbrown", |b| {
        b.iter_batched(
            HashMap::<String, String>::new,
            |mut m| {
                for k in &keys {
                    m.insert(k.clone(), k.clone());
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
    let mut t = ProbedTable::new();
    for k in &keys {
        t.insert(k, k).unwrap();
    }

    c.bench_function("probed_table_get_hit", |b| {
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });
    c.bench_function("probed_table_get_miss", |b| {
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(t.get(&k));
        })
    });
}

fn bench_remove(c: &mut Criterion) {
    let keys: Vec<_> = lcg(11).take(10_000).map(key).collect();
    c.bench_function("probed_table_remove_10k", |b| {
        b.iter_batched(
            || {
                let mut t = ProbedTable::new();
                for k in &keys {
                    t.insert(k, k).unwrap();
                }
                t
            },
            |mut t| {
                for k in &keys {
                    black_box(t.remove(k).unwrap());
                }
                t
            },
            BatchSize::LargeInput,
        )
    });
}

/// Insert random pairs, overwrite half of them, look all of them up, then
/// delete a third.
fn bench_mixed_workload(c: &mut Criterion) {
    let keys = random_strings(42, 5_000);
    let values = random_strings(43, 5_000);
    c.bench_function("probed_table_mixed_5k", |b| {
        b.iter_batched(
            ProbedTable::new,
            |mut t| {
                for (k, v) in keys.iter().zip(&values) {
                    t.insert(k, v).unwrap();
                }
                for (k, v) in keys.iter().zip(values.iter().rev()).step_by(2) {
                    t.insert(k, v).unwrap();
                }
                for k in &keys {
                    black_box(t.get(k));
                }
                for k in keys.iter().step_by(3) {
                    t.remove(k).unwrap();
                }
                black_box(t)
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get, bench_remove, bench_mixed_workload
}
criterion_main!(benches);
