//! Implements the "serial" backend
//!
//! Everything runs on the calling thread. The leaves of a reduction are
//! combined in exactly the same order as in the threaded backend, so the two
//! produce bitwise identical results for a given grain size.

use parlik_nostd_internal::{Executor, GrainSize, IndexRange, Scalar, fold_bisection_tree};
use tracing::trace;

#[derive(Clone, Copy, Debug, Default)]
pub struct SerialExecutor;

impl Executor for SerialExecutor {
    fn backend_name(&self) -> &'static str {
        "serial"
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
        let traced_fn = |leaf: IndexRange| {
            trace!(start = leaf.start(), end = leaf.end(), "evaluating leaf");
            partial_fn(leaf)
        };
        let total = fold_bisection_tree(range, grain, &traced_fn)?;
        Ok(zero + total)
    }

    fn drive_map<T, S, E, F>(&self, items: &[T], out: &mut [S], item_fn: &F) -> Result<(), E>
    where
        T: Sync,
        S: Send,
        E: Send,
        F: Fn(&T) -> Result<S, E> + Sync,
    {
        assert_eq!(items.len(), out.len());
        for (i, (slot, item)) in out.iter_mut().zip(items).enumerate() {
            trace!(index = i, "evaluating item");
            *slot = item_fn(item)?;
        }
        Ok(())
    }
}
