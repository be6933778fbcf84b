use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use biobj_logger::archive::{Archive, ArchiveNode};
use biobj_logger::indicator::{Indicator, IndicatorKind};
use biobj_logger::pareto::RegionOfInterest;

/// Points scattered around the front `y1 = 1 - y0`, most of them dominated.
fn stream(n: usize, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..n)
        .map(|_| {
            let t = rng.f64();
            let noise = rng.f64() * 0.2;
            [t + noise, 1.0 - t + rng.f64() * 0.2]
        })
        .collect()
}

/// A strictly improving front: every point survives.
fn antichain(n: usize) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            [t, 1.0 - t]
        })
        .collect()
}

fn feed(points: &[[f64; 2]], roi: &RegionOfInterest) -> usize {
    let mut archive = Archive::new(1);
    let mut indicators = vec![Indicator::new(IndicatorKind::Hypervolume, 1.0)];
    for (t, &y) in points.iter().enumerate() {
        let node = ArchiveNode::new(&[], y, t as u64 + 1, 1);
        let _ = archive.update(node, &mut indicators, roi);
        archive.purge_pending();
    }
    archive.len()
}

fn bench_archive_update(c: &mut Criterion) {
    let roi = RegionOfInterest::new([0.0, 0.0], [1.5, 1.5]).unwrap();
    let mut group = c.benchmark_group("archive_update");
    group.sample_size(20);

    for n in [1_000, 10_000, 100_000] {
        let noisy = stream(n, 42);
        group.bench_with_input(BenchmarkId::new("noisy", n), &noisy, |b, points| {
            b.iter(|| feed(points, &roi));
        });

        let front = antichain(n);
        group.bench_with_input(BenchmarkId::new("antichain", n), &front, |b, points| {
            b.iter(|| feed(points, &roi));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_archive_update);
criterion_main!(benches);
