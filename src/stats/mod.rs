//! Statistical comparison of two schedules' trajectories.
//!
//! - [`ttest`]: pooled two-sample t-test, Cohen's D, Šídák correction.
//! - [`mixed`]: random-intercept mixed model behind the [`MixedModelFitter`] seam.
//! - [`distributions`]: the special functions both rely on.

pub mod distributions;
pub mod mixed;
pub mod ttest;

pub use mixed::{
    MixedEffectsReport, MixedFit, MixedFormula, MixedModelFitter, RandomInterceptFitter,
};
pub use ttest::{cohens_d, pooled_sd, sidak_correction, two_sample_t, TTestResult, TwoSampleT};
