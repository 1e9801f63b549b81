//! The contract between the partitioning logic and a parallelism backend
//!
//! We are interested in 2 kinds of fork-join calculations:
//! - a _reduction_, where an index range is broken into leaves (see
//!   [`IndexRange::bisect`]), a partial sum is computed for each leaf, and
//!   the partial sums are added together.
//! - a _map_, where a function is independently evaluated for each element
//!   of a sequence and the outputs are stored in the same order as the
//!   inputs.
//!
//! In both cases, the units of work are totally independent of each other,
//! so they can be executed in any order (or at the same time). The thing that
//! actually executes them is an [`Executor`]. This crate doesn't provide any
//! (they need the standard library). The idea is that each backend (serial,
//! thread pool, ...) implements [`Executor`] so we have a uniform interface
//! for switching between them.
//!
//! # Reproducibility
//! A backend is free to evaluate the leaves of a reduction in whatever order
//! it likes, but it must combine the partial sums following the shape of the
//! bisection tree (i.e. `left + right` at each node), and it must add the
//! tree's total to the caller's zero value last. That way, all backends
//! produce bitwise identical results for a given grain size.
//! [`fold_bisection_tree`] is the reference implementation of this order.

use crate::range::{GrainSize, IndexRange};
use crate::scalar::Scalar;

/// a trait for expressing how to launch a reduction or a map
///
/// Implementations own the execution substrate (e.g. a thread pool). The
/// calling thread blocks until every dispatched unit of work is done.
///
/// Both methods are fail-fast: once a callback reports an error, the backend
/// should avoid starting units of work that haven't begun, and it must return
/// an error that some callback actually reported. A partial sum from a failed
/// leaf is never combined.
pub trait Executor {
    /// a short name for the backend (used in log messages)
    fn backend_name(&self) -> &'static str;

    /// Computes `zero + Σ partial_fn(leaf)` over the leaves of `range`.
    fn drive_reduce<S, E, F>(
        &self,
        range: IndexRange,
        grain: GrainSize,
        zero: S,
        partial_fn: &F,
    ) -> Result<S, E>
    where
        S: Scalar,
        E: Send,
        F: Fn(IndexRange) -> Result<S, E> + Sync;

    /// Stores `item_fn(&items[i])` in `out[i]` for every `i`.
    ///
    /// When an error is returned, the contents of `out` are unspecified.
    ///
    /// # Panics
    /// Implementations panic if `items` and `out` have different lengths
    /// (before calling `item_fn`). `parlik::parallel_map` allocates `out`
    /// itself, so it never trips this.
    fn drive_map<T, S, E, F>(&self, items: &[T], out: &mut [S], item_fn: &F) -> Result<(), E>
    where
        T: Sync,
        S: Send,
        E: Send,
        F: Fn(&T) -> Result<S, E> + Sync;
}

/// Sequentially computes the sum over the leaves of `range`, combining the
/// partial sums in the order that every backend must follow.
///
/// The caller's zero value isn't involved here (it gets added afterwards).
pub fn fold_bisection_tree<S, E, F>(
    range: IndexRange,
    grain: GrainSize,
    partial_fn: &F,
) -> Result<S, E>
where
    S: Scalar,
    F: Fn(IndexRange) -> Result<S, E>,
{
    match range.bisect(grain) {
        None => partial_fn(range),
        Some((left, right)) => {
            let left_sum = fold_bisection_tree(left, grain, partial_fn)?;
            let right_sum = fold_bisection_tree(right, grain, partial_fn)?;
            Ok(left_sum + right_sum)
        }
    }
}
