//! The generic entry points: a grain-partitioned reduce and an elementwise map

use parlik_nostd_internal::{Executor, GrainSize, IndexRange, Scalar};
use tracing::{debug, warn};

use crate::Error;

/// Validate the arguments describing a reduction
fn reduction_bounds(
    start: usize,
    end: usize,
    grainsize: usize,
) -> Result<(IndexRange, GrainSize), Error> {
    if start > end {
        return Err(Error::index_range(start, end));
    }
    let range = IndexRange::new(start, end).map_err(Error::internal_legacy_adhoc)?;
    let grain = GrainSize::new(grainsize)
        .map_err(|_| Error::integer_range("grainsize", grainsize as u64, 1, u64::MAX))?;
    Ok((range, grain))
}

/// Computes `zero + Σ partial_fn(sub_start, sub_end)` over a partition of the
/// inclusive range `[start, end]`.
///
/// The range is recursively bisected until each sub-range holds no more than
/// `grainsize` indices, and `partial_fn` is called once per sub-range
/// (potentially concurrently). `partial_fn(sub_start, sub_end)` must return
/// the contribution of exactly the indices `sub_start..=sub_end`.
///
/// When `end - start + 1 <= grainsize`, `partial_fn` is called exactly once,
/// with the whole range.
///
/// # Errors
/// Fails without calling `partial_fn` if `start > end` or `grainsize == 0`.
/// If any call to `partial_fn` fails, that error is returned and no result is
/// produced.
pub fn parallel_reduce_sum<S, F>(
    executor: &impl Executor,
    start: usize,
    end: usize,
    zero: S,
    partial_fn: F,
    grainsize: usize,
) -> Result<S, Error>
where
    S: Scalar,
    F: Fn(usize, usize) -> Result<S, Error> + Sync,
{
    let (range, grain) = reduction_bounds(start, end, grainsize)?;
    debug!(
        start,
        end,
        grainsize,
        n_leaves = range.n_leaves(grain),
        backend = executor.backend_name(),
        "dispatching reduction"
    );
    let leaf_fn = |leaf: IndexRange| partial_fn(leaf.start(), leaf.end());
    executor
        .drive_reduce(range, grain, zero, &leaf_fn)
        .inspect_err(|err| warn!("reduction over [{start}, {end}] failed: {err}"))
}

/// Computes `item_fn(&items[i])` for every element of `items` (potentially
/// concurrently) and returns the outputs in the same order as `items`.
///
/// Each element is evaluated independently (duplicated elements are
/// evaluated once per occurrence). An empty `items` produces an empty vector
/// without dispatching any work.
///
/// # Errors
/// If any call to `item_fn` fails, that error is returned and no outputs are
/// produced.
pub fn parallel_map<T, S, F>(
    executor: &impl Executor,
    items: &[T],
    item_fn: F,
) -> Result<Vec<S>, Error>
where
    T: Sync,
    S: Scalar,
    F: Fn(&T) -> Result<S, Error> + Sync,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }
    debug!(
        n_items = items.len(),
        backend = executor.backend_name(),
        "dispatching map"
    );
    let mut out = vec![S::zero(); items.len()];
    executor
        .drive_map(items, &mut out, &item_fn)
        .inspect_err(|err| warn!("map over {} items failed: {err}", items.len()))?;
    Ok(out)
}
