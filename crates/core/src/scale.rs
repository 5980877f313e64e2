use serde::{Deserialize, Serialize};

/// One clamp range for every scale gesture. Wheel and button steps differ
/// only in size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalePolicy {
    pub min: f64,
    pub max: f64,
    pub wheel_step: f64,
    pub button_step: f64,
}

impl Default for ScalePolicy {
    fn default() -> Self {
        Self {
            min: 0.3,
            max: 3.0,
            wheel_step: 0.05,
            button_step: 0.1,
        }
    }
}

/// Direction of a single scale gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleStep {
    Grow,
    Shrink,
}

impl ScaleStep {
    /// Wheel convention: scrolling up (negative delta) grows the item.
    pub fn from_wheel_delta(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(Self::Grow)
        } else if delta_y > 0.0 {
            Some(Self::Shrink)
        } else {
            None
        }
    }

    fn sign(self) -> f64 {
        match self {
            Self::Grow => 1.0,
            Self::Shrink => -1.0,
        }
    }
}

impl ScalePolicy {
    /// Bring `scale` into range. Inverted bounds are swapped; non-finite
    /// bounds are ignored.
    pub fn clamp(&self, scale: f64) -> f64 {
        let scale = if scale.is_finite() { round_hundredths(scale) } else { 1.0 };
        let (lo, hi) = self.bounds();
        scale.max(lo).min(hi)
    }

    fn bounds(&self) -> (f64, f64) {
        let lo = if self.min.is_finite() { self.min } else { f64::NEG_INFINITY };
        let hi = if self.max.is_finite() { self.max } else { f64::INFINITY };
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }

    pub fn apply_wheel(&self, scale: f64, step: ScaleStep) -> f64 {
        self.clamp(scale + step.sign() * self.wheel_step)
    }

    pub fn apply_button(&self, scale: f64, step: ScaleStep) -> f64 {
        self.clamp(scale + step.sign() * self.button_step)
    }
}

// Steps are multiples of 0.05, so hundredths keep repeated steps exact.
fn round_hundredths(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_button_shrinks_land_on_point_seven() {
        let policy = ScalePolicy::default();
        let mut scale = 1.0;
        for _ in 0..3 {
            scale = policy.apply_button(scale, ScaleStep::Shrink);
        }
        assert_eq!(scale, 0.7);
    }

    #[test]
    fn steps_never_leave_range() {
        let policy = ScalePolicy::default();
        let mut scale = 1.0;
        for _ in 0..100 {
            scale = policy.apply_wheel(scale, ScaleStep::Grow);
        }
        assert_eq!(scale, 3.0);
        for _ in 0..100 {
            scale = policy.apply_button(scale, ScaleStep::Shrink);
        }
        assert_eq!(scale, 0.3);
    }

    #[test]
    fn wheel_delta_direction() {
        assert_eq!(ScaleStep::from_wheel_delta(-120.0), Some(ScaleStep::Grow));
        assert_eq!(ScaleStep::from_wheel_delta(3.0), Some(ScaleStep::Shrink));
        assert_eq!(ScaleStep::from_wheel_delta(0.0), None);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let policy = ScalePolicy { min: 2.0, max: 1.0, ..ScalePolicy::default() };
        assert_eq!(policy.apply_button(1.0, ScaleStep::Grow), 1.1);
        assert_eq!(policy.apply_button(2.0, ScaleStep::Grow), 2.0);
        assert_eq!(policy.clamp(0.2), 1.0);

        let unbounded = ScalePolicy { min: f64::NAN, max: f64::NAN, ..ScalePolicy::default() };
        assert_eq!(unbounded.clamp(5.0), 5.0);
    }

    #[test]
    fn non_finite_resets_to_unit() {
        assert_eq!(ScalePolicy::default().clamp(f64::NAN), 1.0);
    }
}
