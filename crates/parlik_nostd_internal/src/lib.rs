//! The `no_std` core of `parlik`.
//!
//! This crate holds everything about a fork-join reduction that doesn't
//! require the standard library: the description of the scalar values being
//! combined, the index ranges that get partitioned, the partitioning policy,
//! and the [`Executor`] contract that a parallelism backend must satisfy.
//!
//! Backends themselves (and the error type users see) live in the `parlik`
//! crate.
#![no_std]
mod parallel;
mod range;
mod scalar;

pub use parallel::{Executor, fold_bisection_tree};
pub use range::{GrainSize, IndexRange, visit_leaves};
pub use scalar::Scalar;
