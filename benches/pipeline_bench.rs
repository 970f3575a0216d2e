use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use wifiloc::engine::pipeline::LocationPipeline;
use wifiloc::engine::triangulation;
use wifiloc::ingest::frame;
use wifiloc::model::access_point::{AccessPointRecord, MacAddress, ResolvedAccessPoint};
use wifiloc::resolver::MemoryResolver;
use wifiloc::storage::HistoryLog;

/// Frame with `n` records, MACs 00:00:00:00:xx:yy, RSSI cycling -40..-95
fn scan_frame(n: usize) -> Vec<u8> {
    (0..n)
        .flat_map(|i| {
            let rssi = -40i8 - (i % 56) as i8;
            [0, 0, 0, 0, (i >> 8) as u8, i as u8, rssi as u8]
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let raw = scan_frame(32);
    c.bench_function("decode_32_records", |b| {
        b.iter(|| frame::decode(black_box(&raw)))
    });
}

fn bench_estimate(c: &mut Criterion) {
    let points: Vec<ResolvedAccessPoint> = frame::decode(&scan_frame(32))
        .into_iter()
        .enumerate()
        .map(|(i, obs)| {
            ResolvedAccessPoint::new(
                obs,
                AccessPointRecord {
                    lat: 48.8 + i as f64 * 0.001,
                    lon: 2.3 + i as f64 * 0.001,
                    label: format!("ap-{}", i),
                },
            )
        })
        .collect();

    c.bench_function("estimate_32_points", |b| {
        b.iter(|| triangulation::estimate(black_box(&points)))
    });
}

fn bench_locate(c: &mut Criterion) {
    let raw = scan_frame(16);
    let resolver = MemoryResolver::new();
    for i in 0..8u8 {
        let mac = MacAddress::new([0, 0, 0, 0, 0, i]);
        resolver.insert(
            &mac.to_string(),
            AccessPointRecord {
                lat: 48.8 + f64::from(i) * 0.01,
                lon: 2.3,
                label: format!("ap-{}", i),
            },
        );
    }
    let history = Arc::new(HistoryLog::new());
    let pipeline = LocationPipeline::new(Arc::new(resolver), history.clone());

    c.bench_function("locate_16_records", |b| {
        b.iter(|| {
            let outcome = pipeline.locate(black_box(&raw));
            history.clear();
            outcome
        })
    });
}

criterion_group!(benches, bench_decode, bench_estimate, bench_locate);
criterion_main!(benches);
