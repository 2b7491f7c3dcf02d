//! Ribbon bows hung on the tree body

use std::f32::consts::PI;
use rand::Rng;
use crate::animation::{lerp, TransitionState};
use crate::config::BowConfig;
use crate::geometry::{push_outward, scatter_position, tree_position, TreeShape};
use crate::math::Vec3;
use crate::particles::MATRIX_STRIDE;
use super::{ObjectTransform, RotationPhase};

const TREE_JITTER: f32 = 0.5;
const PHASE_SPREAD: f32 = 10.0;
const SETTLED_BOB: f32 = 0.05;

/// Static data for one bow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BowProfile {
    pub scatter: Vec3,
    pub tree: Vec3,
    /// Scale once settled on the tree
    pub target_scale: f32,
    /// Scale while scattered
    pub scattered_scale: f32,
    /// Tumble and bob phase in [0, 10)
    pub phase: f32,
    /// Loose rotation offsets, each in [0, π)
    pub rotation_offset: Vec3,
}

impl BowProfile {
    fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        config: &BowConfig,
        shape: &TreeShape,
        scatter_radius: f32,
    ) -> Self {
        let scatter = scatter_position(rng, scatter_radius);

        // Keep bows off the skirt and away from the star
        let y_ratio = config.min_height + rng.gen::<f32>() * config.height_span;
        let tree = push_outward(
            tree_position(rng, shape, y_ratio, TREE_JITTER),
            config.outward_push,
            0.0,
        );

        Self {
            scatter,
            tree,
            target_scale: config.scale,
            scattered_scale: config.scattered_scale,
            phase: rng.gen::<f32>() * PHASE_SPREAD,
            rotation_offset: Vec3::new(
                rng.gen::<f32>() * PI,
                rng.gen::<f32>() * PI,
                rng.gen::<f32>() * PI,
            ),
        }
    }

    /// Transform for a progress value at a point in time
    pub fn pose(&self, progress: f32, eased: f32, elapsed: f32) -> (ObjectTransform, RotationPhase) {
        let mut position = self.scatter.lerp(&self.tree, eased);
        let phase = RotationPhase::from_eased(eased);

        let rotation = match phase {
            RotationPhase::Loose => {
                let loose = 1.0 - progress;
                let off = self.rotation_offset;
                Vec3::new(
                    off.x + (elapsed + self.phase).sin() * loose,
                    off.y + elapsed * 0.5 * loose,
                    off.z + (elapsed + self.phase).cos() * loose,
                )
            }
            RotationPhase::Locked => {
                // Face outward from the trunk with a gentle bob
                position.y = self.tree.y + (elapsed * 1.5 + self.phase).sin() * SETTLED_BOB;
                Vec3::new(0.0, self.tree.azimuth(), 0.0)
            }
        };

        let transform = ObjectTransform {
            position,
            rotation,
            scale: lerp(self.scattered_scale, self.target_scale, eased),
        };
        (transform, phase)
    }
}

/// One bow and its own transition clock
#[derive(Debug, Clone)]
pub struct Bow {
    profile: BowProfile,
    transition: TransitionState,
    transform: ObjectTransform,
    phase: RotationPhase,
}

impl Bow {
    pub fn new(profile: BowProfile, damping_rate: f32) -> Self {
        let transition = TransitionState::damped(damping_rate);
        let (transform, phase) = profile.pose(0.0, 0.0, 0.0);
        Self {
            profile,
            transition,
            transform,
            phase,
        }
    }

    pub fn update(&mut self, tree_form: bool, dt: f32, elapsed: f32) {
        self.transition.advance(tree_form, dt);
        let (transform, phase) =
            self.profile
                .pose(self.transition.progress(), self.transition.eased(), elapsed);
        self.transform = transform;
        self.phase = phase;
    }

    pub fn profile(&self) -> &BowProfile {
        &self.profile
    }

    pub fn transform(&self) -> ObjectTransform {
        self.transform
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.transition.progress()
    }

    pub fn eased(&self) -> f32 {
        self.transition.eased()
    }
}

/// All bows in the scene plus their batched matrices
pub struct BowSet {
    bows: Vec<Bow>,
    matrices: Vec<f32>,
}

impl BowSet {
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        config: &BowConfig,
        shape: &TreeShape,
        scatter_radius: f32,
    ) -> Self {
        let bows = (0..config.count)
            .map(|_| {
                let profile = BowProfile::generate(rng, config, shape, scatter_radius);
                Bow::new(profile, config.damping_rate)
            })
            .collect();
        Self::from_bows(bows)
    }

    pub fn from_bows(bows: Vec<Bow>) -> Self {
        let mut set = Self {
            matrices: vec![0.0; bows.len() * MATRIX_STRIDE],
            bows,
        };
        set.write_matrices();
        set
    }

    /// Advance every bow's own clock and refresh the matrix batch
    pub fn update(&mut self, tree_form: bool, dt: f32, elapsed: f32) {
        for bow in &mut self.bows {
            bow.update(tree_form, dt, elapsed);
        }
        self.write_matrices();
    }

    fn write_matrices(&mut self) {
        for (bow, out) in self.bows.iter().zip(self.matrices.chunks_exact_mut(MATRIX_STRIDE)) {
            out.copy_from_slice(bow.transform.matrix().as_slice());
        }
    }

    pub fn bows(&self) -> &[Bow] {
        &self.bows
    }

    /// Column-major matrices, 16 floats per bow
    pub fn matrices(&self) -> &[f32] {
        &self.matrices
    }

    pub fn count(&self) -> usize {
        self.bows.len()
    }

    pub fn all_locked(&self) -> bool {
        self.bows.iter().all(|b| b.phase().is_locked())
    }
}
