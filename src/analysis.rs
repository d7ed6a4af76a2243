//! Statistical comparisons on a [`LearningProcess`].
//!
//! Single-pair tests run on the stored comparison dataset (see
//! [`LearningProcess::build_comparison`]). Batch drivers require a regular
//! schedule family and compare every schedule `0..n-1` against the
//! all-control baseline `n-1`.
//!
//! Measure slots and result types are indices into `Y1, Y2, DIFF, RATIO`.

use tracing::{debug, info, warn};

use crate::comparison::MeasureSlot;
use crate::error::StatsError;
use crate::process::LearningProcess;
use crate::stats::{
    sidak_correction, two_sample_t, MixedEffectsReport, MixedFit, MixedFormula, MixedModelFitter,
    RandomInterceptFitter, TTestResult,
};

impl LearningProcess {
    /// Two-sided pooled t-test of schedule A against schedule B on one
    /// measure slot of the current comparison dataset.
    ///
    /// The corrected p-value accounts for `schedule_count - 1` comparisons.
    pub fn t_test(&self, slot: usize) -> Result<TTestResult, StatsError> {
        let ds = self.comparison.as_ref().ok_or(StatsError::NoDatasetReady)?;
        let measure = MeasureSlot::try_from(slot).map_err(StatsError::InvalidMeasureSlot)?;

        let a = ds.values(measure, 0)?;
        let b = ds.values(measure, 1)?;
        let r = two_sample_t(&a, &b)?;
        let comparisons = self.schedule_count.saturating_sub(1);

        Ok(TTestResult {
            schedule_a: ds.schedule_a,
            schedule_b: ds.schedule_b,
            measure,
            t_statistic: r.t_statistic,
            p_value: r.p_value,
            corrected_p_value: sidak_correction(r.p_value, comparisons),
            cohens_d: r.cohens_d,
            degrees_of_freedom: r.degrees_of_freedom,
            mean_a: r.mean_a,
            mean_b: r.mean_b,
            n_a: a.len(),
            n_b: b.len(),
        })
    }

    /// Fit `Y1 ~ SCH`, `Y2 ~ SCH`, `DIFF ~ SCH` and `RATIO ~ SCH` with random
    /// intercepts per time step, using the built-in fitter.
    pub fn mixed_effects_test(&self) -> Result<MixedEffectsReport, StatsError> {
        self.mixed_effects_test_with(&RandomInterceptFitter)
    }

    pub fn mixed_effects_test_with(
        &self,
        fitter: &dyn MixedModelFitter,
    ) -> Result<MixedEffectsReport, StatsError> {
        let ds = self.comparison.as_ref().ok_or(StatsError::NoDatasetReady)?;
        let fits = MeasureSlot::ALL
            .iter()
            .map(|&slot| self.fit_one(fitter, MixedFormula::new(slot)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MixedEffectsReport {
            schedule_a: ds.schedule_a,
            schedule_b: ds.schedule_b,
            fits,
        })
    }

    /// Regression-based comparison. Not available.
    pub fn regression_test(&self, _slot: usize) -> Result<TTestResult, StatsError> {
        Err(StatsError::NotImplemented("regression comparison"))
    }

    /// t-test every regular schedule against the baseline.
    ///
    /// The batch is also kept on the process (see
    /// [`regular_t_results`](Self::regular_t_results)).
    pub fn compare_all_schedules_t(
        &mut self,
        m1: usize,
        m2: usize,
        result_type: usize,
    ) -> Result<Vec<TTestResult>, StatsError> {
        self.check_batch(m1, m2, result_type)?;
        let baseline = self.schedule_count - 1;
        info!(m1, m2, result_type, comparisons = baseline, "t-test batch");

        let mut results = Vec::with_capacity(baseline);
        for i in 0..baseline {
            self.batch_comparison(i, baseline, m1, m2)?;
            let result = self.t_test(result_type).map_err(|e| {
                warn!(schedule = i, error = %e, "t-test failed");
                StatsError::TestFailed {
                    schedule: i,
                    source: Box::new(e),
                }
            })?;
            debug!(schedule = i, t = result.t_statistic, p = result.p_value, "t-test");
            results.push(result);
        }

        self.regular_t_results = results.clone();
        Ok(results)
    }

    /// Mixed-model fit of the selected measure for every regular schedule
    /// against the baseline, using the built-in fitter.
    pub fn compare_all_schedules_mixed(
        &mut self,
        m1: usize,
        m2: usize,
        result_type: usize,
    ) -> Result<Vec<MixedFit>, StatsError> {
        self.compare_all_schedules_mixed_with(m1, m2, result_type, &RandomInterceptFitter)
    }

    pub fn compare_all_schedules_mixed_with(
        &mut self,
        m1: usize,
        m2: usize,
        result_type: usize,
        fitter: &dyn MixedModelFitter,
    ) -> Result<Vec<MixedFit>, StatsError> {
        let measure = self.check_batch(m1, m2, result_type)?;
        let baseline = self.schedule_count - 1;
        let formula = MixedFormula::new(measure);
        info!(m1, m2, %formula, comparisons = baseline, "mixed-model batch");

        let mut fits = Vec::with_capacity(baseline);
        for i in 0..baseline {
            self.batch_comparison(i, baseline, m1, m2)?;
            let fit = self.fit_one(fitter, formula).map_err(|e| {
                warn!(schedule = i, error = %e, "mixed-model fit failed");
                StatsError::TestFailed {
                    schedule: i,
                    source: Box::new(e),
                }
            })?;
            fits.push(fit);
        }
        Ok(fits)
    }

    /// Regression batch. Not available.
    pub fn compare_all_schedules_regression(
        &mut self,
        _m1: usize,
        _m2: usize,
        _result_type: usize,
    ) -> Result<Vec<TTestResult>, StatsError> {
        Err(StatsError::NotImplemented("regression batch comparison"))
    }

    /// Batch preconditions, in order: regular family, m1, m2, result type.
    fn check_batch(
        &self,
        m1: usize,
        m2: usize,
        result_type: usize,
    ) -> Result<MeasureSlot, StatsError> {
        if !self.is_regular() {
            return Err(StatsError::RegularScheduleRequired);
        }
        for measure in [m1, m2] {
            if measure >= self.state_size {
                return Err(StatsError::MeasureOutOfRange {
                    measure,
                    state_size: self.state_size,
                });
            }
        }
        MeasureSlot::try_from(result_type).map_err(StatsError::InvalidResultType)
    }

    fn batch_comparison(
        &mut self,
        schedule: usize,
        baseline: usize,
        m1: usize,
        m2: usize,
    ) -> Result<(), StatsError> {
        self.build_comparison(schedule, baseline, m1, m2)
            .map(|_| ())
            .map_err(|source| {
                warn!(schedule, error = %source, "comparison build failed");
                StatsError::ComparisonBuildFailed { schedule, source }
            })
    }

    fn fit_one(
        &self,
        fitter: &dyn MixedModelFitter,
        formula: MixedFormula,
    ) -> Result<MixedFit, StatsError> {
        let ds = self.comparison.as_ref().ok_or(StatsError::NoDatasetReady)?;
        fitter
            .fit(ds, &formula)
            .map_err(|source| StatsError::FitFailed {
                formula: formula.to_string(),
                source,
            })
    }
}

/// Compare two processes run under different engines. Not available.
pub fn compare_processes(
    _a: &LearningProcess,
    _b: &LearningProcess,
) -> Result<Vec<TTestResult>, StatsError> {
    Err(StatsError::NotImplemented("cross-process comparison"))
}
