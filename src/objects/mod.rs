//! Discrete scene objects with their own transition clock
//!
//! Bows and the topper each own one damped progress value. Their rotation
//! switches between a loose tumble and a locked, settled pose depending on
//! how far the eased progress has come.

pub mod bows;
pub mod topper;

pub use bows::{Bow, BowProfile, BowSet};
pub use topper::Topper;

use crate::math::{Mat4, Vec3};

/// Eased progress at which an object stops tumbling
pub const LOCK_THRESHOLD: f32 = 0.95;

/// Rotation regime of a discrete object for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Loose,
    Locked,
}

impl RotationPhase {
    /// Recomputed every frame; never latched
    pub fn from_eased(eased: f32) -> Self {
        if eased >= LOCK_THRESHOLD {
            RotationPhase::Locked
        } else {
            RotationPhase::Loose
        }
    }

    pub fn is_locked(&self) -> bool {
        *self == RotationPhase::Locked
    }
}

/// Per-frame transform of a discrete object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vec3,
    pub scale: f32,
}

impl ObjectTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_transform(self.position, self.rotation, Vec3::splat(self.scale))
    }
}
