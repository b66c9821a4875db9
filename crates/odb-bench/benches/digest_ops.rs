//! Criterion benchmarks for execution-digest folding and time estimation
//! (C5's digest half and C6).

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use odb_bench::gmos_long_slit_profile;
use odb_core::{AtomStream, ObservationId};
use odb_digest::{categorized_time, compute_digest};
use odb_instruments::for_mode;
use odb_itc::{ItcClient, ItcClientConfig};
use odb_test_utils::fixtures::ConstantItcBackend;

fn thousand_atoms() -> Vec<odb_core::ConcreteAtom> {
    let itc = Arc::new(ItcClient::init(
        Arc::new(ConstantItcBackend::new(odb_core::TimeSpan::from_seconds(60.0), 1000)),
        ItcClientConfig::default(),
    ));
    let params = gmos_long_slit_profile(ObservationId(1), 1000);
    let mode = for_mode(&params.mode, itc);
    let mut stream = mode.proto_science(&params).unwrap();
    stream.take(1000)
}

fn bench_compute_digest_1000_atoms(c: &mut Criterion) {
    let atoms = thousand_atoms();
    c.bench_function("compute_digest_1000_atoms", |b| {
        b.iter(|| black_box(compute_digest(&atoms).unwrap()));
    });
}

fn bench_categorized_time_1000_atoms(c: &mut Criterion) {
    let atoms = thousand_atoms();
    c.bench_function("categorized_time_1000_atoms", |b| {
        b.iter(|| black_box(categorized_time(&atoms).unwrap()));
    });
}

criterion_group!(benches, bench_compute_digest_1000_atoms, bench_categorized_time_1000_atoms);
criterion_main!(benches);
