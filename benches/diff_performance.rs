use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use driftwatch::fragment::Fragment;
use driftwatch::store::diff;

/// Fixture generators for realistic snapshot shapes
mod fixtures {
    use super::*;

    /// Mapping of n string keys, like an env_vars category
    pub fn flat_mapping(n: usize) -> Fragment {
        Fragment::mapping((0..n).map(|i| {
            (
                format!("VAR_{i:04}"),
                Fragment::from(format!("value-{i}")),
            )
        }))
    }

    /// Sequence of n process-shaped mappings
    pub fn process_list(n: usize, offset: usize) -> Fragment {
        Fragment::Sequence(
            (0..n)
                .map(|i| {
                    Fragment::mapping([
                        ("pid", Fragment::from((i + offset) as i64)),
                        ("name", Fragment::from(format!("proc-{}", i + offset))),
                        ("cpu", Fragment::from(0.5)),
                        ("mem_mb", Fragment::from((i % 512) as f64)),
                    ])
                })
                .collect(),
        )
    }

    /// Two-level mapping, like a packages category
    pub fn nested_mapping(managers: usize, packages: usize) -> Fragment {
        Fragment::mapping((0..managers).map(|m| {
            (
                format!("manager-{m}"),
                Fragment::mapping((0..packages).map(|p| {
                    (format!("package-{p:04}"), Fragment::from(format!("1.{p}")))
                })),
            )
        }))
    }
}

/// Worst case for the multiset matcher: every element matches, so every
/// lookup scans the unmatched prefix
fn bench_identical_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_identical_sequences");

    for n in [100, 500, 1000] {
        group.bench_with_input(BenchmarkId::new("items", n), &n, |b, &n| {
            let old = fixtures::process_list(n, 0);
            let new = fixtures::process_list(n, 0);

            b.iter(|| {
                let diff = diff::diff_fragments(black_box(&old), black_box(&new));
                black_box(diff);
            });
        });
    }

    group.finish();
}

fn bench_churned_sequences(c: &mut Criterion) {
    c.bench_function("diff_sequences_10pct_churn", |b| {
        // 10% of pids rotated out, like process turnover between captures
        let old = fixtures::process_list(1000, 0);
        let new = fixtures::process_list(1000, 100);

        b.iter(|| {
            let diff = diff::diff_fragments(black_box(&old), black_box(&new));
            black_box(diff);
        });
    });
}

fn bench_flat_mappings(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_flat_mappings");

    for n in [100, 1000, 5000] {
        group.bench_with_input(BenchmarkId::new("keys", n), &n, |b, &n| {
            let old = fixtures::flat_mapping(n);
            let new = fixtures::flat_mapping(n);

            b.iter(|| {
                let diff = diff::diff_fragments(black_box(&old), black_box(&new));
                black_box(diff);
            });
        });
    }

    group.finish();
}

fn bench_nested_mappings(c: &mut Criterion) {
    c.bench_function("diff_nested_mappings", |b| {
        let old = fixtures::nested_mapping(5, 400);
        let new = fixtures::nested_mapping(5, 400);

        b.iter(|| {
            let diff = diff::diff_fragments(black_box(&old), black_box(&new));
            black_box(diff);
        });
    });
}

criterion_group!(
    benches,
    bench_identical_sequences,
    bench_churned_sequences,
    bench_flat_mappings,
    bench_nested_mappings,
);

criterion_main!(benches);
