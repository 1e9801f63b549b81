//! Reference likelihood callbacks for a hierarchical Poisson model with a
//! log link.
//!
//! Observation `i` is a count `y[i]` drawn from
//! `Poisson(exp(log_lambda_group[gidx[i]]))`. The functions in this module
//! have exactly the signatures expected by
//! [`crate::parallel_hierarchical_reduce`] and
//! [`crate::parallel_hierarchical_map`], so they can be passed straight in.
//!
//! Group ids and the entries of `gidx` are 0-based. The `start` & `end`
//! arguments of [`poisson_hierarchical_reduce`] are 1-based and inclusive.

use ndarray::ArrayView1;
use statrs::function::gamma::ln_gamma;

use crate::{DiagnosticStream, Error, Real};

/// `ln(n!)`, evaluated as `ln Γ(n + 1)` so the cost doesn't grow with `n`
pub fn ln_factorial(n: u64) -> f64 {
    // 0! = 1! = 1, exactly
    if n < 2 { 0.0 } else { ln_gamma(n as f64 + 1.0) }
}

/// The Poisson log-pmf of the count `y` for a rate of `exp(log_lambda)`:
/// `y·log_lambda − exp(log_lambda) − ln(y!)`
pub fn poisson_log_lpmf<S: Real>(y: i64, log_lambda: S) -> Result<S, Error> {
    if y < 0 {
        return Err(Error::domain(format!(
            "a Poisson count must be non-negative, not {y}"
        )));
    }
    if log_lambda.value().is_nan() {
        return Err(Error::domain("the log-rate of a Poisson distribution is NaN"));
    }
    let y_promoted = S::from_f64(y as f64);
    let norm = S::from_f64(ln_factorial(y as u64));
    Ok(y_promoted * log_lambda - log_lambda.exp() - norm)
}

/// Sum of the log-pmf over observations `start..=end` (1-based)
pub fn poisson_hierarchical_reduce<S: Real>(
    start: usize,
    end: usize,
    y: &[i64],
    log_lambda_group: ArrayView1<S>,
    gidx: &[usize],
    pstream: DiagnosticStream,
) -> Result<S, Error> {
    if start == 0 || end > y.len() || end > gidx.len() {
        return Err(Error::integer_range(
            "a 1-based observation index",
            if start == 0 { 0 } else { end as u64 },
            1,
            y.len().min(gidx.len()) as u64,
        ));
    }
    let mut lpmf = S::zero();
    for i in (start - 1)..end {
        let Some(&log_lambda) = log_lambda_group.get(gidx[i]) else {
            return Err(Error::integer_range(
                "a group index",
                gidx[i] as u64,
                0,
                (log_lambda_group.len() as u64).saturating_sub(1),
            ));
        };
        lpmf = lpmf + poisson_log_lpmf(y[i], log_lambda).inspect_err(|err| {
            pstream.print(format_args!("observation {}: {err}", i + 1));
        })?;
    }
    Ok(lpmf)
}

/// Sum of the log-pmf over every count observed in group `g` (0-based)
pub fn poisson_hierarchical_map<S: Real>(
    g: usize,
    log_lambda: ArrayView1<S>,
    yg: &[Vec<i64>],
    pstream: DiagnosticStream,
) -> Result<S, Error> {
    let (Some(&group_log_lambda), Some(counts)) = (log_lambda.get(g), yg.get(g)) else {
        return Err(Error::integer_range(
            "a group id",
            g as u64,
            0,
            (log_lambda.len().min(yg.len()) as u64).saturating_sub(1),
        ));
    };
    let mut lpmf = S::zero();
    for &y in counts {
        lpmf = lpmf + poisson_log_lpmf(y, group_log_lambda).inspect_err(|err| {
            pstream.print(format_args!("group {g}: {err}"));
        })?;
    }
    Ok(lpmf)
}
