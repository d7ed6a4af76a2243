//! Linear mixed-effects regression of a comparison measure on the schedule
//! flag, with a random intercept per time step.
//!
//! Model for row (t, j), j = SCH ∈ {0, 1}:
//!
//! ```text
//! y_tj = β₀ + β₁·j + u_t + e_tj,   u_t ~ N(0, σ²_u),  e_tj ~ N(0, σ²_e)
//! ```
//!
//! The fitting engine sits behind [`MixedModelFitter`]. The built-in
//! [`RandomInterceptFitter`] handles the balanced paired design produced by
//! the comparison builder (exactly one A and one B row per time step), where
//! the REML estimates have a closed form:
//!
//! | Estimate | Formula (d_t = y_t1 - y_t0, m_t = (y_t0 + y_t1)/2, T groups) |
//! |----------|-------------------------------------------------------------|
//! | β₁ | `mean(d)` |
//! | β₀ | `mean(y_t0)` |
//! | σ²_e | `var(d) / 2` |
//! | σ²_u | `(2·var(m) - σ²_e) / 2` |
//! | SE(β₁) | `sqrt(2σ²_e / T)` |
//!
//! `var` is the sample variance (T - 1 denominator). When `2·var(m)` does
//! not exceed `var(d) / 2` the σ²_u estimate sits on its zero boundary; the
//! fit then reduces to ordinary least squares and σ²_e pools both strata,
//! `RSS / (2T - 2) = (var(d) / 2 + 2·var(m)) / 2`, before SE(β₁) is taken.
//! The coefficient is reported with a Wald z test.

use std::fmt;

use serde::Serialize;

use super::distributions::normal_two_sided;
use crate::comparison::{ComparisonDataset, MeasureSlot};
use crate::constants::{SCHEDULE_COLUMN, TIME_COLUMN};
use crate::error::FitError;

/// `<measure> ~ SCH` with random intercepts grouped by `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixedFormula {
    pub response: MeasureSlot,
}

impl MixedFormula {
    pub fn new(response: MeasureSlot) -> Self {
        Self { response }
    }

    pub fn group(&self) -> &'static str {
        TIME_COLUMN
    }
}

impl fmt::Display for MixedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.response.column(), SCHEDULE_COLUMN)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedFit {
    pub formula: String,
    pub group: &'static str,
    pub intercept: f64,
    /// Fixed effect of `SCH` (B relative to A).
    pub schedule_coefficient: f64,
    pub std_error: f64,
    pub z_value: f64,
    pub p_value: f64,
    pub group_variance: f64,
    pub residual_variance: f64,
    pub groups: usize,
    pub observations: usize,
}

/// Four fits (`Y1`, `Y2`, `DIFF`, `RATIO`) for one schedule pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedEffectsReport {
    pub schedule_a: usize,
    pub schedule_b: usize,
    pub fits: Vec<MixedFit>,
}

impl MixedEffectsReport {
    pub fn fit(&self, slot: MeasureSlot) -> Option<&MixedFit> {
        let column = slot.column();
        self.fits
            .iter()
            .find(|f| f.formula.split_whitespace().next() == Some(column))
    }
}

/// Boundary to a mixed-model estimation engine.
pub trait MixedModelFitter {
    fn fit(&self, data: &ComparisonDataset, formula: &MixedFormula) -> Result<MixedFit, FitError>;
}

/// Closed-form fitter for balanced paired data.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomInterceptFitter;

impl MixedModelFitter for RandomInterceptFitter {
    fn fit(&self, data: &ComparisonDataset, formula: &MixedFormula) -> Result<MixedFit, FitError> {
        let slot = formula.response;
        let column = slot.column();
        let (group_a, group_b) = (data.group(0), data.group(1));
        if group_a.len() != group_b.len() {
            let time = group_a.len().min(group_b.len());
            return Err(FitError::UnbalancedGroup { time });
        }

        let groups = group_a.len();
        if groups < 2 {
            return Err(FitError::TooFewGroups(groups));
        }

        let mut ya = Vec::with_capacity(groups);
        let mut diffs = Vec::with_capacity(groups);
        let mut means = Vec::with_capacity(groups);
        for (ra, rb) in group_a.iter().zip(group_b) {
            if ra.time != rb.time {
                return Err(FitError::UnbalancedGroup { time: ra.time });
            }
            let a = ra.get(slot).ok_or(FitError::MissingValue {
                column,
                time: ra.time,
            })?;
            let b = rb.get(slot).ok_or(FitError::MissingValue {
                column,
                time: rb.time,
            })?;
            ya.push(a);
            diffs.push(b - a);
            means.push((a + b) / 2.0);
        }

        let t = groups as f64;
        let within = sample_variance(&diffs) / 2.0;
        let between = 2.0 * sample_variance(&means);
        let (group_variance, residual_variance) = if between > within {
            ((between - within) / 2.0, within)
        } else {
            // σ²_u on its boundary: the model is OLS, σ²_e = RSS / (2T - 2).
            (0.0, (within + between) / 2.0)
        };
        if !(residual_variance.is_finite() && residual_variance > 0.0) {
            return Err(FitError::Singular("zero residual variance"));
        }

        let slope = diffs.iter().sum::<f64>() / t;
        let std_error = (2.0 * residual_variance / t).sqrt();
        let z_value = slope / std_error;

        Ok(MixedFit {
            formula: formula.to_string(),
            group: formula.group(),
            intercept: ya.iter().sum::<f64>() / t,
            schedule_coefficient: slope,
            std_error,
            z_value,
            p_value: normal_two_sided(z_value),
            group_variance,
            residual_variance,
            groups,
            observations: 2 * groups,
        })
    }
}

fn sample_variance(xs: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let m = xs.iter().sum::<f64>() / n;
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1.0)
}
