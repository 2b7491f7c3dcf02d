//! Animation module for the scatter/tree morph
//!
//! Provides the shared easing curve and the progress clocks every
//! element animator advances once per frame.

mod easing;
mod transition;

pub use easing::{ease, lerp, smoothstep};
pub use transition::{damp, lerp_toward, target_for, Approach, TransitionState};
