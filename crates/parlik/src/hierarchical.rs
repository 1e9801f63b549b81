//! Entry points used by the statistical-model layer
//!
//! These bind the data of a hierarchical model to a user-provided likelihood
//! callback, and hand the callback to [`parallel_reduce_sum`] or
//! [`parallel_map`]. The data is captured by reference: nothing is copied per
//! task.
//!
//! The callbacks in [`crate::poisson`] have the required signatures.

use ndarray::ArrayView1;
use parlik_nostd_internal::Executor;
use tracing::debug;

use crate::{DiagnosticStream, Error, Real, parallel_map, parallel_reduce_sum};

/// Computes the total log-likelihood of the observations `y` by summing
/// `hierarchical_reduce(start, end, y, log_lambda_group, gidx, pstream)` over
/// a partition of the 1-based observation indices `[1, y.len()]`.
///
/// `gidx[i]` is the (0-based) group of observation `i`, so it must index into
/// `log_lambda_group`. Sub-ranges hold no more than `grainsize` observations.
/// When there aren't any observations, the result is zero (and the callback
/// isn't called).
///
/// # Errors
/// Before any work is dispatched, this checks that `y` and `gidx` have the
/// same length, that every entry of `gidx` is a valid group, and that
/// `grainsize` is positive. Errors from the callback are propagated as is.
pub fn parallel_hierarchical_reduce<S, F>(
    executor: &impl Executor,
    y: &[i64],
    log_lambda_group: ArrayView1<S>,
    gidx: &[usize],
    grainsize: usize,
    pstream: DiagnosticStream,
    hierarchical_reduce: F,
) -> Result<S, Error>
where
    S: Real,
    F: Fn(usize, usize, &[i64], ArrayView1<S>, &[usize], DiagnosticStream) -> Result<S, Error>
        + Sync,
{
    if gidx.len() != y.len() {
        return Err(Error::length_mismatch("gidx", y.len(), gidx.len()));
    }
    let n_groups = log_lambda_group.len();
    if let Some(&bad) = gidx.iter().find(|&&g| g >= n_groups) {
        return Err(Error::integer_range(
            "an entry of gidx",
            bad as u64,
            0,
            (n_groups as u64).saturating_sub(1),
        ));
    }
    if grainsize == 0 {
        return Err(Error::integer_range("grainsize", 0, 1, u64::MAX));
    }
    if y.is_empty() {
        debug!("no observations to reduce over");
        return Ok(S::zero());
    }

    parallel_reduce_sum(
        executor,
        1,
        y.len(),
        S::zero(),
        |start, end| hierarchical_reduce(start, end, y, log_lambda_group, gidx, pstream),
        grainsize,
    )
}

/// Computes `hierarchical_map(g, log_lambda, yg, pstream)` for each group id
/// `g` in `group` and returns the results in the same order as `group`.
///
/// Group ids are 0-based and must index into both `log_lambda` and `yg`. A
/// group id may appear several times (it gets evaluated each time).
///
/// # Errors
/// Before any work is dispatched, this checks that every group id is valid.
/// Errors from the callback are propagated as is.
pub fn parallel_hierarchical_map<S, F>(
    executor: &impl Executor,
    group: &[usize],
    log_lambda: ArrayView1<S>,
    yg: &[Vec<i64>],
    pstream: DiagnosticStream,
    hierarchical_map: F,
) -> Result<Vec<S>, Error>
where
    S: Real,
    F: Fn(usize, ArrayView1<S>, &[Vec<i64>], DiagnosticStream) -> Result<S, Error> + Sync,
{
    let n_groups = log_lambda.len().min(yg.len());
    if let Some(&bad) = group.iter().find(|&&g| g >= n_groups) {
        return Err(Error::integer_range(
            "a group id",
            bad as u64,
            0,
            (n_groups as u64).saturating_sub(1),
        ));
    }

    parallel_map(executor, group, |&g: &usize| {
        hierarchical_map(g, log_lambda, yg, pstream)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SerialExecutor, poisson_hierarchical_map, poisson_hierarchical_reduce};
    use ndarray::array;

    #[test]
    fn reduce_precondition_errors() {
        let log_lambda_group = array![0.0, 0.0];
        let pstream = DiagnosticStream::none();

        // mismatched lengths
        let err = parallel_hierarchical_reduce(
            &SerialExecutor,
            &[1, 2, 3],
            log_lambda_group.view(),
            &[0, 1],
            1,
            pstream,
            poisson_hierarchical_reduce,
        )
        .unwrap_err();
        assert!(err.is_invalid_input());

        // group index out of bounds
        let err = parallel_hierarchical_reduce(
            &SerialExecutor,
            &[1, 2],
            log_lambda_group.view(),
            &[0, 2],
            1,
            pstream,
            poisson_hierarchical_reduce,
        )
        .unwrap_err();
        assert!(err.is_invalid_input());

        // zero grainsize
        let err = parallel_hierarchical_reduce(
            &SerialExecutor,
            &[1, 2],
            log_lambda_group.view(),
            &[0, 1],
            0,
            pstream,
            poisson_hierarchical_reduce,
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn reduce_no_observations() {
        let log_lambda_group = array![0.0];
        let total = parallel_hierarchical_reduce(
            &SerialExecutor,
            &[],
            log_lambda_group.view(),
            &[],
            4,
            DiagnosticStream::none(),
            poisson_hierarchical_reduce,
        )
        .unwrap();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn map_precondition_errors() {
        let log_lambda = array![0.0, 0.0];
        let yg = vec![vec![1], vec![2], vec![3]];
        // log_lambda only covers 2 groups
        let err = parallel_hierarchical_map(
            &SerialExecutor,
            &[0, 2],
            log_lambda.view(),
            &yg,
            DiagnosticStream::none(),
            poisson_hierarchical_map,
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }
}
