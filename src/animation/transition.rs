//! Frame-driven progress clocks
//!
//! A transition moves a single `progress` scalar toward 0 (scattered) or
//! 1 (tree-formed). Two approach strategies are offered:
//! - damped: frame-rate independent exponential smoothing
//! - linear: a plain lerp by `rate * dt`, cheap enough for particle fields
//!
//! Both are asymptotic and never overshoot the target. A non-positive or
//! non-finite `dt` leaves progress untouched.

use super::easing::ease;

/// Progress value for the tree-formed state when `tree_form` is set, else scattered
pub fn target_for(tree_form: bool) -> f32 {
    if tree_form {
        1.0
    } else {
        0.0
    }
}

/// Exponential approach: `current + (target - current) * (1 - e^(-lambda * dt))`
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    if !(dt > 0.0) {
        return current;
    }
    let factor = 1.0 - (-lambda * dt).exp();
    step_toward(current, target, factor)
}

/// Linear-rate approach: `lerp(current, target, rate * dt)` with the factor capped at 1
pub fn lerp_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    if !(dt > 0.0) {
        return current;
    }
    step_toward(current, target, rate * dt)
}

fn step_toward(current: f32, target: f32, factor: f32) -> f32 {
    if factor.is_nan() {
        return current;
    }
    let factor = factor.clamp(0.0, 1.0);
    let next = current + (target - current) * factor;
    // Keep rounding from carrying the value past the target
    if current <= target {
        next.clamp(current, target)
    } else {
        next.clamp(target, current)
    }
}

/// How a transition closes the gap to its target each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Approach {
    /// Exponential smoothing with the given rate (lambda)
    Damped { rate: f32 },
    /// Lerp by `rate * dt` per frame
    Linear { rate: f32 },
}

impl Approach {
    fn apply(&self, current: f32, target: f32, dt: f32) -> f32 {
        match *self {
            Approach::Damped { rate } => damp(current, target, rate, dt),
            Approach::Linear { rate } => lerp_toward(current, target, rate, dt),
        }
    }
}

/// Mutable progress owned by one element or one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    progress: f32,
    approach: Approach,
}

impl TransitionState {
    /// Fresh scattered state (progress 0)
    pub fn new(approach: Approach) -> Self {
        Self {
            progress: 0.0,
            approach,
        }
    }

    pub fn damped(rate: f32) -> Self {
        Self::new(Approach::Damped { rate })
    }

    pub fn linear(rate: f32) -> Self {
        Self::new(Approach::Linear { rate })
    }

    /// Start from an arbitrary progress, clamped to [0, 1]
    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = progress.clamp(0.0, 1.0);
        self
    }

    /// Raw progress (0.0 = scattered, 1.0 = tree-formed)
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress passed through the shared easing curve
    pub fn eased(&self) -> f32 {
        ease(self.progress)
    }

    pub fn approach(&self) -> Approach {
        self.approach
    }

    /// Pure update: the state one frame later
    pub fn advanced(self, tree_form: bool, dt: f32) -> Self {
        let target = target_for(tree_form);
        Self {
            progress: self.approach.apply(self.progress, target, dt).clamp(0.0, 1.0),
            approach: self.approach,
        }
    }

    pub fn advance(&mut self, tree_form: bool, dt: f32) {
        *self = self.advanced(tree_form, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dt_is_noop() {
        assert_eq!(damp(0.37, 1.0, 2.0, 0.0), 0.37);
        assert_eq!(lerp_toward(0.37, 1.0, 1.5, 0.0), 0.37);

        let state = TransitionState::damped(2.0).with_progress(0.42);
        assert_eq!(state.advanced(true, 0.0).progress(), 0.42);
        assert_eq!(state.advanced(false, 0.0).progress(), 0.42);
    }

    #[test]
    fn test_negative_and_nan_dt_are_noops() {
        assert_eq!(damp(0.5, 1.0, 2.0, -0.1), 0.5);
        assert_eq!(lerp_toward(0.5, 0.0, 1.5, -3.0), 0.5);
        assert_eq!(damp(0.5, 1.0, 2.0, f32::NAN), 0.5);
        assert_eq!(lerp_toward(0.5, 1.0, 1.5, f32::NAN), 0.5);
    }

    #[test]
    fn test_huge_dt_settles_on_target() {
        assert_eq!(damp(0.2, 1.0, 1.5, 1e6), 1.0);
        assert_eq!(damp(0.8, 0.0, 1.5, f32::INFINITY), 0.0);
        assert_eq!(lerp_toward(0.2, 1.0, 1.5, 100.0), 1.0);
        assert_eq!(lerp_toward(0.9, 0.0, 1.5, 100.0), 0.0);
    }

    #[test]
    fn test_damped_convergence_is_monotonic() {
        let mut state = TransitionState::damped(2.0);
        let mut prev = state.progress();
        for _ in 0..2000 {
            state.advance(true, 1.0 / 60.0);
            assert!(state.progress() >= prev);
            assert!(state.progress() <= 1.0);
            prev = state.progress();
        }
        assert!((1.0 - state.progress()) < 1e-3);
    }

    #[test]
    fn test_linear_convergence_is_monotonic() {
        let mut state = TransitionState::linear(1.5);
        let mut prev = state.progress();
        for _ in 0..2000 {
            state.advance(true, 1.0 / 60.0);
            assert!(state.progress() >= prev);
            assert!(state.progress() <= 1.0);
            prev = state.progress();
        }
        assert!((1.0 - state.progress()) < 1e-3);
    }

    #[test]
    fn test_reversal_is_continuous() {
        let dt = 1.0 / 60.0;
        let mut state = TransitionState::damped(1.5);
        for _ in 0..60 {
            state.advance(true, dt);
        }
        let before = state.progress();
        assert!(before > 0.0 && before < 1.0);

        state.advance(false, dt);
        let after = state.progress();
        assert!(after < before);
        // A single frame can move at most (1 - e^(-lambda * dt)) of the gap
        assert!(before - after <= before * (1.0 - (-1.5f32 * dt).exp()) + 1e-6);
    }

    #[test]
    fn test_heavier_rate_settles_faster() {
        let mut light = TransitionState::damped(1.5);
        let mut heavy = TransitionState::damped(2.0);
        for _ in 0..30 {
            light.advance(true, 1.0 / 60.0);
            heavy.advance(true, 1.0 / 60.0);
        }
        assert!(heavy.progress() > light.progress());
    }

    #[test]
    fn test_eased_tracks_progress() {
        let state = TransitionState::damped(2.0).with_progress(0.5);
        assert_eq!(state.eased(), 0.5);
        assert_eq!(TransitionState::linear(1.5).eased(), 0.0);
    }

    #[test]
    fn test_with_progress_clamps() {
        assert_eq!(TransitionState::damped(1.0).with_progress(3.0).progress(), 1.0);
        assert_eq!(TransitionState::damped(1.0).with_progress(-1.0).progress(), 0.0);
    }
}
