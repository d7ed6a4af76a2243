//! Intervention schedule generators.
//!
//! A schedule assigns one condition index to every time step of the
//! horizon. These helpers build the schedule families used in the Han et al.
//! simulations:
//!
//! - [`regular_schedules`]: treatment every k-th step for k = 1..=horizon/2,
//!   plus an all-control baseline as the last schedule.
//! - [`cyclic_schedule`]: a repeating condition pattern, e.g. `[1, 0, 2]`.
//! - [`expanding_interval_schedule`]: treatment with steadily growing gaps.

use crate::constants::regular_schedule_count;
use crate::error::ProcessError;

/// Build the regular schedule family over `horizon` steps.
///
/// Returns `horizon / 2 + 1` schedules. Schedule `i` (for all but the last)
/// applies `treatment` at every `t` with `t % (i + 1) == 0` and `control`
/// otherwise; the last schedule is constant `control`.
pub fn regular_schedules(horizon: usize, treatment: usize, control: usize) -> Vec<Vec<usize>> {
    let count = regular_schedule_count(horizon);
    let mut schedules: Vec<Vec<usize>> = (0..count - 1)
        .map(|i| {
            (0..horizon)
                .map(|t| if t % (i + 1) == 0 { treatment } else { control })
                .collect()
        })
        .collect();
    schedules.push(vec![control; horizon]);
    schedules
}

/// Repeat `pattern` until `horizon` steps are filled.
pub fn cyclic_schedule(horizon: usize, pattern: &[usize]) -> Result<Vec<usize>, ProcessError> {
    if pattern.is_empty() {
        return Err(ProcessError::EmptyPattern);
    }
    Ok(pattern.iter().copied().cycle().take(horizon).collect())
}

/// Treatment at t = 0 and t = 2, then after gaps that widen by `increment`
/// each time, with `control` everywhere else.
///
/// `increment = 0` alternates treatment and control (`1010...`) and
/// `increment = 1` gives `101001000100001...`. For `increment >= 2` the
/// third treatment lands at `2 + 2·increment` and later gaps are
/// `3·increment`, `4·increment`, ...
pub fn expanding_interval_schedule(
    horizon: usize,
    increment: usize,
    treatment: usize,
    control: usize,
) -> Vec<usize> {
    let mut schedule = vec![control; horizon];
    let mut treat_next = true;
    let mut gap = 1;
    let mut last = 0;
    for (t, slot) in schedule.iter_mut().enumerate() {
        if treat_next {
            *slot = treatment;
            treat_next = false;
            last = t;
            gap += increment;
        } else if t + 1 == last + gap {
            treat_next = true;
        } else if increment == 0 && t % 2 == 1 {
            treat_next = true;
        } else if last == 0 && t == 1 {
            // Second treatment is always at t = 2; the next gap shrinks by one.
            treat_next = true;
            gap -= 1;
        }
    }
    schedule
}
