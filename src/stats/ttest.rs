//! Independent two-sample t-test with Cohen's D and Šídák correction.
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | t | `(x̄₁ - x̄₂) / sqrt(s²_p (1/n₁ + 1/n₂))`, pooled sample variance |
//! | df | `n₁ + n₂ - 2` |
//! | p | two-sided Student's t |
//! | corrected p | `1 - (1 - p)^k`, k = number of comparisons |
//! | D | `(x̄₁ - x̄₂) / pooled_sd(σ₁, σ₂, n₁, n₂)`, population σ |

use serde::Serialize;

use super::distributions::student_t_two_sided;
use crate::comparison::MeasureSlot;
use crate::error::StatsError;

/// Outcome of one schedule-vs-schedule t-test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestResult {
    pub schedule_a: usize,
    pub schedule_b: usize,
    pub measure: MeasureSlot,
    pub t_statistic: f64,
    pub p_value: f64,
    pub corrected_p_value: f64,
    pub cohens_d: f64,
    pub degrees_of_freedom: f64,
    pub mean_a: f64,
    pub mean_b: f64,
    pub n_a: usize,
    pub n_b: usize,
}

/// Statistics of a two-sample comparison, independent of where the samples
/// came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleT {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
    pub cohens_d: f64,
    pub mean_a: f64,
    pub mean_b: f64,
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sum of squared deviations from the mean.
fn sum_sq_dev(xs: &[f64], m: f64) -> f64 {
    xs.iter().map(|x| (x - m) * (x - m)).sum()
}

/// Population (ddof = 0) standard deviation.
pub fn population_sd(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    (sum_sq_dev(xs, mean(xs)) / xs.len() as f64).sqrt()
}

/// `sqrt(((n₁-1)s₁² + (n₂-1)s₂²) / (n₁+n₂-2))`.
pub fn pooled_sd(s1: f64, s2: f64, n1: usize, n2: usize) -> Result<f64, StatsError> {
    if s1 <= 0.0 || s2 <= 0.0 {
        return Err(StatsError::DegenerateSample("standard deviation is not positive"));
    }
    if n1 == 0 || n2 == 0 {
        return Err(StatsError::DegenerateSample("empty sample"));
    }
    if n1 + n2 <= 2 {
        return Err(StatsError::DegenerateSample("no degrees of freedom"));
    }
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let pooled = ((n1f - 1.0) * s1 * s1 + (n2f - 1.0) * s2 * s2) / (n1f + n2f - 2.0);
    if pooled <= 0.0 {
        return Err(StatsError::DegenerateSample("pooled standard deviation is zero"));
    }
    Ok(pooled.sqrt())
}

/// Cohen's D of `a` relative to `b`.
pub fn cohens_d(a: &[f64], b: &[f64]) -> Result<f64, StatsError> {
    let sd = pooled_sd(population_sd(a), population_sd(b), a.len(), b.len())?;
    Ok((mean(a) - mean(b)) / sd)
}

/// Šídák-style family-wise correction: `1 - (1 - p)^comparisons`.
pub fn sidak_correction(p: f64, comparisons: usize) -> f64 {
    1.0 - (1.0 - p).powf(comparisons as f64)
}

/// Two-sided pooled-variance t-test of `a` against `b`.
pub fn two_sample_t(a: &[f64], b: &[f64]) -> Result<TwoSampleT, StatsError> {
    let (n1, n2) = (a.len(), b.len());
    if n1 == 0 || n2 == 0 {
        return Err(StatsError::DegenerateSample("empty sample"));
    }
    if n1 + n2 <= 2 {
        return Err(StatsError::DegenerateSample("no degrees of freedom"));
    }

    let (mean_a, mean_b) = (mean(a), mean(b));
    let df = (n1 + n2 - 2) as f64;
    let pooled_var = (sum_sq_dev(a, mean_a) + sum_sq_dev(b, mean_b)) / df;
    let se = (pooled_var * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    if se.is_nan() || se <= 0.0 {
        return Err(StatsError::DegenerateSample("both samples are constant"));
    }

    let t = (mean_a - mean_b) / se;
    Ok(TwoSampleT {
        t_statistic: t,
        p_value: student_t_two_sided(t, df),
        degrees_of_freedom: df,
        cohens_d: cohens_d(a, b)?,
        mean_a,
        mean_b,
    })
}
