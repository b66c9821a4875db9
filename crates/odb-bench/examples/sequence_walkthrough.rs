//! Walk a GMOS-North long-slit protosequence by hand, printing each
//! atom's steps — a readable companion to the `sequence_ops` benchmark.

use std::sync::Arc;

use odb_bench::gmos_long_slit_profile;
use odb_core::{AtomStream, ObservationId};
use odb_instruments::for_mode;
use odb_itc::{ItcClient, ItcClientConfig};
use odb_test_utils::fixtures::ConstantItcBackend;

fn main() {
    tracing_subscriber::fmt::init();

    let params = gmos_long_slit_profile(ObservationId(1), 6);
    let itc = Arc::new(ItcClient::init(
        Arc::new(ConstantItcBackend::new(odb_core::TimeSpan::from_seconds(300.0), 6)),
        ItcClientConfig::default(),
    ));
    let mode = for_mode(&params.mode, itc);

    println!("static config: {:#?}", mode.static_config(&params));

    println!("\nacquisition:");
    let mut acquisition = mode.proto_acquisition(&params).expect("valid mode");
    for atom in acquisition.take(10) {
        print_atom(&atom);
    }

    println!("\nscience:");
    let mut science = mode.proto_science(&params).expect("valid mode");
    for atom in science.take(10) {
        print_atom(&atom);
    }
}

fn print_atom(atom: &odb_core::ConcreteAtom) {
    println!("  atom {} ({:?}): {}", atom.id, atom.sequence_type, atom.description);
    for step in &atom.steps {
        println!(
            "    step {} [{:?}] offset=({:.1},{:.1}) guiding={:?}",
            step.id, step.step_config, step.telescope_config.offset.p, step.telescope_config.offset.q,
            step.telescope_config.guiding,
        );
    }
}
