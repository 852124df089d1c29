//! Speed-adjustment tokens.
//!
//! The coordination engine never sets a robot's speed directly.  It sends a
//! stream of signed steps which the physical engine applies one at a time,
//! so speed ramps toward the target instead of jumping.

use std::collections::VecDeque;

use crate::Kinematics;

/// One speed adjustment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedStep {
    /// `+accel_step` (100 at the reference scale).
    Accelerate,
    /// `-decel_step` (50 at the reference scale).
    Decelerate,
}

impl SpeedStep {
    /// Signed speed change of this step.
    #[inline]
    pub fn delta(self, k: &Kinematics) -> i64 {
        match self {
            SpeedStep::Accelerate => k.accel_step,
            SpeedStep::Decelerate => -k.decel_step,
        }
    }
}

/// An ordered run of [`SpeedStep`]s, consumed from the front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenStream {
    steps: VecDeque<SpeedStep>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps that take a robot from `from` to exactly `to`.
    ///
    /// Accelerating uses whole accelerate steps and then trims the overshoot
    /// with decelerate steps; decelerating uses decelerate steps only.  A
    /// remainder smaller than one step (only possible off the speed quantum)
    /// is dropped.
    pub fn between(from: i64, to: i64, k: &Kinematics) -> Self {
        let delta = to - from;
        let mut steps = VecDeque::new();
        if delta > 0 {
            let accel = (delta as u64).div_ceil(k.accel_step as u64) as i64;
            let overshoot = accel * k.accel_step - delta;
            steps.extend(std::iter::repeat_n(SpeedStep::Accelerate, accel as usize));
            steps.extend(std::iter::repeat_n(
                SpeedStep::Decelerate,
                (overshoot / k.decel_step) as usize,
            ));
        } else if delta < 0 {
            steps.extend(std::iter::repeat_n(
                SpeedStep::Decelerate,
                (-delta / k.decel_step) as usize,
            ));
        }
        Self { steps }
    }

    /// Sum of all step deltas.
    pub fn signed_total(&self, k: &Kinematics) -> i64 {
        self.steps.iter().map(|s| s.delta(k)).sum()
    }

    /// Append `other` after the steps already queued.
    pub fn extend<I: IntoIterator<Item = SpeedStep>>(&mut self, other: I) {
        self.steps.extend(other);
    }

    /// Take the next step.
    #[inline]
    pub fn pop(&mut self) -> Option<SpeedStep> {
        self.steps.pop_front()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SpeedStep> + '_ {
        self.steps.iter().copied()
    }
}

impl FromIterator<SpeedStep> for TokenStream {
    fn from_iter<I: IntoIterator<Item = SpeedStep>>(iter: I) -> Self {
        Self { steps: iter.into_iter().collect() }
    }
}
