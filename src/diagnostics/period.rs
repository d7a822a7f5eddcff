//! Orbital period estimate for on-screen readouts
//!
//! A closed orbit reverses each velocity component twice per revolution.
//! Counting sign changes of one component gives the number of half periods
//! elapsed, and `period = 2 t / half_periods`.

use crate::simulation::states::Body;

/// Velocity component watched for sign changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeriodEstimator {
    axis: Axis,
    half_periods: u32,
    period: Option<f64>,
}

impl PeriodEstimator {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            half_periods: 0,
            period: None,
        }
    }

    /// Feed one tick: the component before and after it, and the simulated
    /// time at the start of the tick. A zero on either side is not a sign
    /// change.
    pub fn observe(&mut self, before: f64, after: f64, time: f64) {
        if before * after < 0.0 {
            self.half_periods += 1;
            self.period = Some(time * 2.0 / self.half_periods as f64);
        }
    }

    /// Same as [`PeriodEstimator::observe`] reading the watched axis of a body
    pub fn observe_body(&mut self, before: &Body, after: &Body, time: f64) {
        let i = self.axis.index();
        self.observe(before.v[i], after.v[i], time);
    }

    pub fn half_periods(&self) -> u32 {
        self.half_periods
    }

    /// `None` until the first sign change
    pub fn period(&self) -> Option<f64> {
        self.period
    }
}

impl Default for PeriodEstimator {
    fn default() -> Self {
        Self::new(Axis::X)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_strict_sign_changes() {
        let mut p = PeriodEstimator::default();
        p.observe(0.0, -1.0, 0.5);
        assert_eq!(p.period(), None);
        p.observe(-1.0, 2.0, 5.0);
        assert_eq!(p.half_periods(), 1);
        assert_eq!(p.period(), Some(10.0));
        p.observe(2.0, -0.5, 10.0);
        assert_eq!(p.period(), Some(10.0));
    }
}
