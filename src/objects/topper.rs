//! Star at the apex of the tree

use rand::Rng;
use crate::animation::{lerp, TransitionState};
use crate::config::TopperConfig;
use crate::geometry::scatter_position;
use crate::math::Vec3;
use super::{ObjectTransform, RotationPhase};

const CHAOTIC_SPIN: f32 = 2.0;
const MAJESTIC_SPIN: f32 = 0.5;
const LEVEL_RATE: f32 = 4.0;

/// The single topper element
#[derive(Debug, Clone)]
pub struct Topper {
    scatter: Vec3,
    tree: Vec3,
    scattered_scale: f32,
    halo_scale: f32,
    transition: TransitionState,
    rotation: Vec3,
    transform: ObjectTransform,
    phase: RotationPhase,
}

impl Topper {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &TopperConfig, scatter_radius: f32) -> Self {
        Self::new(scatter_position(rng, scatter_radius), config)
    }

    pub fn new(scatter: Vec3, config: &TopperConfig) -> Self {
        Self {
            scatter,
            tree: config.position,
            scattered_scale: config.scattered_scale,
            halo_scale: config.halo_scale,
            transition: TransitionState::damped(config.damping_rate),
            rotation: Vec3::ZERO,
            transform: ObjectTransform {
                position: scatter,
                rotation: Vec3::ZERO,
                scale: config.scattered_scale,
            },
            phase: RotationPhase::Loose,
        }
    }

    pub fn update(&mut self, tree_form: bool, dt: f32, _elapsed: f32) {
        self.transition.advance(tree_form, dt);
        let eased = self.transition.eased();

        // Rotation integrates dt directly; a rewinding clock must not spin it back
        let step = if dt > 0.0 { dt } else { 0.0 };

        let phase = RotationPhase::from_eased(eased);
        if phase != self.phase {
            log::trace!("topper rotation {:?} -> {:?} at eased {:.3}", self.phase, phase, eased);
        }
        self.phase = phase;

        // Wrapped into [-π, π), so levelling takes the short way back to 0
        self.rotation = match phase {
            RotationPhase::Loose => self.rotation + Vec3::splat(CHAOTIC_SPIN * step),
            RotationPhase::Locked => {
                let level = (step * LEVEL_RATE).min(1.0);
                Vec3::new(
                    lerp(self.rotation.x, 0.0, level),
                    self.rotation.y + step * MAJESTIC_SPIN,
                    lerp(self.rotation.z, 0.0, level),
                )
            }
        }
        .wrap_angles();

        self.transform = ObjectTransform {
            position: self.scatter.lerp(&self.tree, eased),
            rotation: self.rotation,
            scale: lerp(self.scattered_scale, 1.0, eased),
        };
    }

    pub fn transform(&self) -> ObjectTransform {
        self.transform
    }

    /// Glow shell around the star, same pose at a larger scale
    pub fn halo_transform(&self) -> ObjectTransform {
        ObjectTransform {
            scale: self.transform.scale * self.halo_scale,
            ..self.transform
        }
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    pub fn scatter_point(&self) -> Vec3 {
        self.scatter
    }

    pub fn tree_point(&self) -> Vec3 {
        self.tree
    }

    pub fn progress(&self) -> f32 {
        self.transition.progress()
    }

    pub fn eased(&self) -> f32 {
        self.transition.eased()
    }
}
