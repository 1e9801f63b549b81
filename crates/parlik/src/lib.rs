/*!
Provides fork-join routines for evaluating likelihoods in parallel without
changing their mathematical result.

# High-Level

Many statistical models have a log-likelihood that is a sum of independent
per-observation (or per-group) terms. This crate offers 2 ways of spreading
such a computation over multiple threads:

- [`parallel_reduce_sum`] partitions an inclusive, 1-based index range into
  sub-ranges holding no more than `grainsize` indices, evaluates a partial
  sum for each sub-range, and adds the partial sums together.
- [`parallel_map`] evaluates a function independently for each element of a
  sequence and returns the outputs in input order.

The results match a sequential evaluation up to floating-point
reassociation. For a fixed grain size, every backend combines the partial
sums in the same order, so the serial and threaded backends give bitwise
identical results.

The [`hierarchical`] entry points bind the data of a hierarchical model to a
likelihood callback; [`poisson`] provides callbacks for a Poisson model with
a log link.

# Backends

The work is executed by a type implementing [`Executor`]:
- [`SerialExecutor`] runs everything on the calling thread.
- `ThreadPoolExecutor` runs on a rayon thread pool (requires the `threads`
  feature, which is on by default).
- [`RuntimeSpec`] describes the choice at runtime (and can be read from the
  environment).

# Developer Guide

The partitioning policy and the [`Executor`] contract live in
`parlik_nostd_internal`.

*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the crates in this package
mod apply;
mod diagnostics;
mod error;
pub mod hierarchical;
mod parallel_serial;
#[cfg(feature = "threads")]
mod parallel_threads;
pub mod poisson;
mod real;
mod runtime;

// pull in symbols that visible outside of the package
pub use apply::{parallel_map, parallel_reduce_sum};
pub use diagnostics::DiagnosticStream;
pub use error::Error;
pub use hierarchical::{parallel_hierarchical_map, parallel_hierarchical_reduce};
pub use parallel_serial::SerialExecutor;
#[cfg(feature = "threads")]
pub use parallel_threads::ThreadPoolExecutor;
pub use parlik_nostd_internal::{Executor, GrainSize, IndexRange, Scalar, visit_leaves};
pub use poisson::{
    ln_factorial, poisson_hierarchical_map, poisson_hierarchical_reduce, poisson_log_lpmf,
};
pub use real::{Dual, Real};
pub use runtime::{
    BACKEND_ENV_VAR, Backend, NUM_THREADS_ENV_VAR, RuntimeExecutor, RuntimeSpec,
    RuntimeSpecBuilder,
};
