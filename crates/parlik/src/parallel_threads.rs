//! Implements the thread-pool backend (on top of rayon)
//!
//! A reduction is driven by recursively bisecting the index range and
//! forking each pair of halves with [`rayon::join`]. The partial sums of the
//! halves are added together on the way back up, which reproduces the
//! combination order of [`parlik_nostd_internal::fold_bisection_tree`].
//!
//! A map hands each worker a disjoint output slot (via `par_iter_mut`), so no
//! locking is needed.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};

use parlik_nostd_internal::{Executor, GrainSize, IndexRange, Scalar};
use rayon::prelude::*;
use tracing::trace;

use crate::Error;

/// Executes work on a rayon thread pool.
///
/// When the executor doesn't own a pool, work runs on rayon's global pool.
pub struct ThreadPoolExecutor {
    pool: Option<rayon::ThreadPool>,
}

impl ThreadPoolExecutor {
    /// An executor that uses rayon's global thread pool
    pub fn global() -> Self {
        ThreadPoolExecutor { pool: None }
    }

    /// An executor that owns a dedicated pool with `n_threads` workers
    pub fn new(n_threads: NonZeroUsize) -> Result<Self, Error> {
        Self::with_builder(rayon::ThreadPoolBuilder::new().num_threads(n_threads.get()))
    }

    pub(crate) fn with_builder(builder: rayon::ThreadPoolBuilder) -> Result<Self, Error> {
        let pool = builder
            .build()
            .map_err(|err| Error::thread_pool(err.to_string()))?;
        Ok(ThreadPoolExecutor { pool: Some(pool) })
    }

    /// the number of worker threads that will execute dispatched work
    pub fn current_num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Why a subtree of the reduction didn't produce a partial sum
enum LeafFailure<E> {
    /// a callback reported this error
    Reported(E),
    /// the leaves were never evaluated because some other leaf failed
    Skipped,
}

fn reduce_subtree<S, E, F>(
    range: IndexRange,
    grain: GrainSize,
    partial_fn: &F,
    failed: &AtomicBool,
) -> Result<S, LeafFailure<E>>
where
    S: Scalar,
    E: Send,
    F: Fn(IndexRange) -> Result<S, E> + Sync,
{
    match range.bisect(grain) {
        None => {
            if failed.load(Ordering::Relaxed) {
                return Err(LeafFailure::Skipped);
            }
            trace!(start = range.start(), end = range.end(), "evaluating leaf");
            partial_fn(range).map_err(|err| {
                failed.store(true, Ordering::Relaxed);
                LeafFailure::Reported(err)
            })
        }
        Some((left, right)) => {
            let (left_sum, right_sum) = rayon::join(
                || reduce_subtree(left, grain, partial_fn, failed),
                || reduce_subtree(right, grain, partial_fn, failed),
            );
            match (left_sum, right_sum) {
                (Ok(left_sum), Ok(right_sum)) => Ok(left_sum + right_sum),
                (Err(LeafFailure::Reported(err)), _) | (_, Err(LeafFailure::Reported(err))) => {
                    Err(LeafFailure::Reported(err))
                }
                _ => Err(LeafFailure::Skipped),
            }
        }
    }
}

impl Executor for ThreadPoolExecutor {
    fn backend_name(&self) -> &'static str {
        "threads"
    }

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
        F: Fn(IndexRange) -> Result<S, E> + Sync,
    {
        let failed = AtomicBool::new(false);
        let total = self.install(|| reduce_subtree(range, grain, partial_fn, &failed));
        match total {
            Ok(total) => Ok(zero + total),
            Err(LeafFailure::Reported(err)) => Err(err),
            // the flag is only raised alongside a Reported error, and a
            // Reported error always wins over Skipped when combining halves
            Err(LeafFailure::Skipped) => {
                unreachable!("a leaf can only be skipped after another leaf fails")
            }
        }
    }

    fn drive_map<T, S, E, F>(&self, items: &[T], out: &mut [S], item_fn: &F) -> Result<(), E>
    where
        T: Sync,
        S: Send,
        E: Send,
        F: Fn(&T) -> Result<S, E> + Sync,
    {
        assert_eq!(items.len(), out.len());
        // try_for_each stops handing out new elements once an error shows up
        self.install(|| {
            out.par_iter_mut()
                .zip(items.par_iter())
                .enumerate()
                .try_for_each(|(i, (slot, item))| {
                    trace!(index = i, "evaluating item");
                    *slot = item_fn(item)?;
                    Ok(())
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn two_threads() -> ThreadPoolExecutor {
        ThreadPoolExecutor::new(NonZeroUsize::new(2).unwrap()).unwrap()
    }

    #[test]
    fn owned_pool_size() {
        assert_eq!(two_threads().current_num_threads(), 2);
    }

    #[test]
    fn reduce_integer_valued_sum() {
        let partial_fn = |leaf: IndexRange| -> Result<f64, ()> {
            Ok((leaf.start()..=leaf.end()).map(|i| i as f64).sum())
        };
        let range = IndexRange::new(1, 1000).unwrap();
        for executor in [two_threads(), ThreadPoolExecutor::global()] {
            for grain in [1, 7, 1000] {
                let total = executor
                    .drive_reduce(range, GrainSize::new(grain).unwrap(), 0.0, &partial_fn)
                    .unwrap();
                assert_eq!(total, 500500.0);
            }
        }
    }

    fn one_thread() -> ThreadPoolExecutor {
        ThreadPoolExecutor::new(NonZeroUsize::new(1).unwrap()).unwrap()
    }

    #[test]
    fn reduce_reports_failure() {
        // with 2 workers, whether the other leaves start is a race, but the
        // call has to report the failure
        let partial_fn = |leaf: IndexRange| -> Result<f64, usize> {
            if leaf.start() == 1 { Err(1) } else { Ok(1.0) }
        };
        let result = two_threads().drive_reduce(
            IndexRange::new(1, 10_000).unwrap(),
            GrainSize::new(1).unwrap(),
            0.0,
            &partial_fn,
        );
        assert_eq!(result, Err(1));
    }

    #[test]
    fn reduce_skips_work_after_failure() {
        // a lone worker runs the left side of every join first, so the
        // failing leaf (index 1) is the first one evaluated
        let n_calls = AtomicUsize::new(0);
        let partial_fn = |leaf: IndexRange| -> Result<f64, usize> {
            n_calls.fetch_add(1, Ordering::Relaxed);
            if leaf.start() == 1 { Err(1) } else { Ok(1.0) }
        };
        let result = one_thread().drive_reduce(
            IndexRange::new(1, 10_000).unwrap(),
            GrainSize::new(1).unwrap(),
            0.0,
            &partial_fn,
        );
        assert_eq!(result, Err(1));
        assert_eq!(n_calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn map_skips_work_after_failure() {
        let n_calls = AtomicUsize::new(0);
        let items: Vec<usize> = (0..10_000).collect();
        let mut out = vec![0.0; items.len()];
        let item_fn = |item: &usize| -> Result<f64, usize> {
            n_calls.fetch_add(1, Ordering::Relaxed);
            if *item == 0 { Err(0) } else { Ok(1.0) }
        };
        let result = one_thread().drive_map(&items, &mut out, &item_fn);
        assert_eq!(result, Err(0));
        assert_eq!(n_calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn map_preserves_order() {
        let items: Vec<usize> = (0..257).collect();
        let mut out = vec![0.0; items.len()];
        let item_fn = |item: &usize| -> Result<f64, ()> { Ok((*item * 2) as f64) };
        two_threads().drive_map(&items, &mut out, &item_fn).unwrap();
        for (i, value) in out.iter().enumerate() {
            assert_eq!(*value, (2 * i) as f64);
        }
    }

    #[test]
    #[should_panic]
    fn map_rejects_mismatched_lengths() {
        let item_fn = |item: &usize| -> Result<f64, ()> { Ok(*item as f64) };
        let mut out = [0.0; 2];
        let _ = two_threads().drive_map(&[1, 2, 3], &mut out, &item_fn);
    }
}
