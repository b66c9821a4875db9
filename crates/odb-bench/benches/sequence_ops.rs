//! Criterion benchmarks for protosequence generation (C4).

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use odb_bench::{flamingos2_long_slit_profile, gmos_imaging_profile, gmos_long_slit_profile};
use odb_core::{AtomStream, ObservationId};
use odb_instruments::for_mode;
use odb_itc::{ItcClient, ItcClientConfig};
use odb_test_utils::fixtures::ConstantItcBackend;

fn itc(exposure_count: u32) -> Arc<ItcClient> {
    Arc::new(ItcClient::init(
        Arc::new(ConstantItcBackend::new(odb_core::TimeSpan::from_seconds(60.0), exposure_count)),
        ItcClientConfig::default(),
    ))
}

fn bench_gmos_long_slit_1000_atoms(c: &mut Criterion) {
    let params = gmos_long_slit_profile(ObservationId(1), 1000);
    let mode = for_mode(&params.mode, itc(1000));

    c.bench_function("gmos_long_slit_proto_science_1000_atoms", |b| {
        b.iter(|| {
            let mut stream = mode.proto_science(&params).unwrap();
            black_box(stream.take(1000));
        });
    });
}

fn bench_gmos_imaging_1000_atoms(c: &mut Criterion) {
    let params = gmos_imaging_profile(ObservationId(1), 1000);
    let mode = for_mode(&params.mode, itc(1000));

    c.bench_function("gmos_imaging_proto_science_1000_atoms", |b| {
        b.iter(|| {
            let mut stream = mode.proto_science(&params).unwrap();
            black_box(stream.take(1000));
        });
    });
}

fn bench_flamingos2_long_slit_1000_atoms(c: &mut Criterion) {
    let params = flamingos2_long_slit_profile(ObservationId(1), 1000);
    let mode = for_mode(&params.mode, itc(1000));

    c.bench_function("flamingos2_long_slit_proto_science_1000_atoms", |b| {
        b.iter(|| {
            let mut stream = mode.proto_science(&params).unwrap();
            black_box(stream.take(1000));
        });
    });
}

fn bench_gmos_long_slit_acquisition(c: &mut Criterion) {
    let params = gmos_long_slit_profile(ObservationId(1), 1);
    let mode = for_mode(&params.mode, itc(1));

    c.bench_function("gmos_long_slit_proto_acquisition", |b| {
        b.iter(|| {
            let mut stream = mode.proto_acquisition(&params).unwrap();
            black_box(stream.take(1));
        });
    });
}

criterion_group!(
    benches,
    bench_gmos_long_slit_1000_atoms,
    bench_gmos_imaging_1000_atoms,
    bench_flamingos2_long_slit_1000_atoms,
    bench_gmos_long_slit_acquisition,
);
criterion_main!(benches);
