// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests
#![allow(dead_code)]

use parlik::{Backend, RuntimeExecutor, RuntimeSpecBuilder};
use tracing_subscriber::EnvFilter;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

/// forward log messages to the test harness (filtered by `RUST_LOG`)
pub fn init_tracing() {
    // only the first call in a test binary succeeds
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// every executor configuration that we want to exercise
pub fn all_executors() -> Vec<(&'static str, RuntimeExecutor)> {
    init_tracing();
    let mut out = vec![(
        "serial",
        RuntimeSpecBuilder::new()
            .backend(Backend::Serial)
            .build()
            .build_executor()
            .unwrap(),
    )];
    if cfg!(feature = "threads") {
        out.push((
            "threads-global",
            RuntimeSpecBuilder::new()
                .backend(Backend::Threads)
                .build()
                .build_executor()
                .unwrap(),
        ));
        out.push((
            "threads-4",
            RuntimeSpecBuilder::new()
                .backend(Backend::Threads)
                .num_threads(4)
                .unwrap()
                .build()
                .build_executor()
                .unwrap(),
        ));
    }
    out
}
