//! Instanced ornament categories
//!
//! All instances of one category share a single damped progress value and
//! write their matrices into one batched instance buffer per frame.

use std::f32::consts::{PI, TAU};
use rand::Rng;
use crate::animation::TransitionState;
use crate::config::{OrnamentCategoryConfig, OrnamentKind};
use crate::geometry::{push_outward, scatter_position, tree_position, TreeShape};
use crate::math::{Mat4, Vec3};

/// Floats per instance in the matrix buffer (column-major 4x4)
pub const MATRIX_STRIDE: usize = 16;

const TREE_JITTER: f32 = 0.5;
const OUTWARD_PUSH: f32 = 1.1;
const OUTWARD_MIN_RADIUS: f32 = 0.1;
const FLOAT_SCATTERED: f32 = 0.5;
const FLOAT_FORMED: f32 = 0.05;
const SWIRL_STRENGTH: f32 = 10.0;
const SCATTERED_SHRINK: f32 = 0.3;

/// Static data for one ornament instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrnamentProfile {
    pub scatter: Vec3,
    pub tree: Vec3,
    /// Per-instance scale in [0.5, 1)
    pub scale: f32,
    /// Per-frame spin added on each axis, each in [0, 0.02)
    pub rotation_speed: Vec3,
    /// Float bob phase in [0, 2π)
    pub phase: f32,
}

impl OrnamentProfile {
    fn generate<R: Rng + ?Sized>(rng: &mut R, shape: &TreeShape, scatter_radius: f32) -> Self {
        let scatter = scatter_position(rng, scatter_radius);

        // Sit on the needles rather than inside the cone
        let y_ratio = rng.gen::<f32>();
        let tree = push_outward(
            tree_position(rng, shape, y_ratio, TREE_JITTER),
            OUTWARD_PUSH,
            OUTWARD_MIN_RADIUS,
        );

        Self {
            scatter,
            tree,
            scale: rng.gen::<f32>() * 0.5 + 0.5,
            rotation_speed: Vec3::new(
                rng.gen::<f32>() * 0.02,
                rng.gen::<f32>() * 0.02,
                rng.gen::<f32>() * 0.02,
            ),
            phase: rng.gen::<f32>() * TAU,
        }
    }
}

/// Transform of one instance for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl InstanceTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_transform(self.position, self.rotation, Vec3::splat(self.scale))
    }
}

/// Shared per-frame inputs for every instance of a category
#[derive(Debug, Clone, Copy)]
pub struct OrnamentFrame {
    pub progress: f32,
    pub eased: f32,
    pub tree_form: bool,
    pub elapsed: f32,
}

/// Swirl angle for the instance at `index`; later instances swirl less
///
/// Only active while `0.05 < progress < 0.95`.
pub fn swirl_angle(progress: f32, index: usize) -> Option<f32> {
    if progress > 0.05 && progress < 0.95 {
        let swirl = (progress * PI).sin() * SWIRL_STRENGTH;
        Some(swirl / (index as f32 * 0.01 + 1.0))
    } else {
        None
    }
}

/// Position and scale of one instance; rotation is carried separately
pub fn place_instance(
    profile: &OrnamentProfile,
    index: usize,
    category_scale: f32,
    frame: &OrnamentFrame,
) -> (Vec3, f32) {
    let mut position = profile.scatter.lerp(&profile.tree, frame.eased);

    let amplitude = if frame.tree_form { FLOAT_FORMED } else { FLOAT_SCATTERED };
    position.y += (frame.elapsed + profile.phase).sin() * amplitude;

    if let Some(angle) = swirl_angle(frame.progress, index) {
        position = position.swirl_xz(angle);
    }

    // Scattered ornaments read slightly smaller, as if further away
    let scale = profile.scale * category_scale * (1.0 - (1.0 - frame.eased) * SCATTERED_SHRINK);

    (position, scale)
}

/// Spin after one more frame, wrapped into [-π, π)
pub fn spin(rotation: Vec3, speed: Vec3, tree_form: bool) -> Vec3 {
    let tumble = if tree_form { 0.0 } else { 0.01 };
    Vec3::new(
        rotation.x + speed.x + tumble,
        rotation.y + speed.y + 0.01,
        rotation.z + speed.z,
    )
    .wrap_angles()
}

/// One ornament category: shared progress over an arena of instance profiles
pub struct OrnamentCategory {
    name: String,
    kind: OrnamentKind,
    color: Vec3,
    scale: f32,
    profiles: Vec<OrnamentProfile>,
    transforms: Vec<InstanceTransform>,
    transition: TransitionState,
    matrices: Vec<f32>,
    needs_update: bool,
    version: u64,
}

impl OrnamentCategory {
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        config: &OrnamentCategoryConfig,
        shape: &TreeShape,
        scatter_radius: f32,
    ) -> Self {
        let profiles = (0..config.count)
            .map(|_| OrnamentProfile::generate(rng, shape, scatter_radius))
            .collect();
        Self::from_profiles(config, profiles)
    }

    pub fn from_profiles(config: &OrnamentCategoryConfig, profiles: Vec<OrnamentProfile>) -> Self {
        // Before the first frame every instance rests at its scatter point
        let transforms: Vec<InstanceTransform> = profiles
            .iter()
            .map(|p| InstanceTransform {
                position: p.scatter,
                rotation: Vec3::ZERO,
                scale: p.scale * config.scale * (1.0 - SCATTERED_SHRINK),
            })
            .collect();
        let matrices = transforms
            .iter()
            .flat_map(|t| t.matrix().data)
            .collect();

        Self {
            name: config.name.clone(),
            kind: config.kind,
            color: config.color,
            scale: config.scale,
            profiles,
            transforms,
            transition: TransitionState::damped(config.damping_rate),
            matrices,
            needs_update: false,
            version: 0,
        }
    }

    /// Advance the shared progress and rewrite every instance matrix
    pub fn update(&mut self, tree_form: bool, dt: f32, elapsed: f32) {
        self.transition.advance(tree_form, dt);

        let frame = OrnamentFrame {
            progress: self.transition.progress(),
            eased: self.transition.eased(),
            tree_form,
            elapsed,
        };

        for (index, ((profile, transform), out)) in self
            .profiles
            .iter()
            .zip(self.transforms.iter_mut())
            .zip(self.matrices.chunks_exact_mut(MATRIX_STRIDE))
            .enumerate()
        {
            let (position, scale) = place_instance(profile, index, self.scale, &frame);
            *transform = InstanceTransform {
                position,
                rotation: spin(transform.rotation, profile.rotation_speed, tree_form),
                scale,
            };
            out.copy_from_slice(transform.matrix().as_slice());
        }

        // One upload per frame, however many instances changed
        self.needs_update = true;
        self.version += 1;
    }

    /// Transform of one instance as of the last update
    pub fn instance(&self, index: usize) -> Option<InstanceTransform> {
        self.transforms.get(index).copied()
    }

    /// Batched instance matrices, 16 floats per instance
    pub fn matrices(&self) -> &[f32] {
        &self.matrices
    }

    /// Whether the batch changed since the renderer last consumed it
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Called by the renderer after uploading the batch
    pub fn mark_uploaded(&mut self) {
        self.needs_update = false;
    }

    /// Number of batch rewrites so far
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn profiles(&self) -> &[OrnamentProfile] {
        &self.profiles
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OrnamentKind {
        self.kind
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn progress(&self) -> f32 {
        self.transition.progress()
    }

    pub fn eased(&self) -> f32 {
        self.transition.eased()
    }

    pub fn count(&self) -> usize {
        self.profiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn config(count: usize) -> OrnamentCategoryConfig {
        OrnamentCategoryConfig {
            name: "test-baubles".to_string(),
            kind: OrnamentKind::Sphere,
            count,
            scale: 0.35,
            color: Vec3::ONE,
            damping_rate: 2.0,
        }
    }

    fn category(count: usize, seed: u64) -> OrnamentCategory {
        let mut rng = SmallRng::seed_from_u64(seed);
        OrnamentCategory::generate(&mut rng, &config(count), &TreeShape::default(), 25.0)
    }

    fn profile() -> OrnamentProfile {
        OrnamentProfile {
            scatter: Vec3::new(10.0, 0.0, 0.0),
            tree: Vec3::new(2.0, 1.0, 0.0),
            scale: 0.8,
            rotation_speed: Vec3::new(0.01, 0.005, 0.002),
            phase: 0.0,
        }
    }

    #[test]
    fn test_swirl_window_and_index_falloff() {
        assert!(swirl_angle(0.05, 0).is_none());
        assert!(swirl_angle(0.95, 0).is_none());
        assert!(swirl_angle(0.0, 3).is_none());

        let first = swirl_angle(0.5, 0).unwrap();
        let hundredth = swirl_angle(0.5, 100).unwrap();
        assert!((first - 10.0).abs() < 1e-5);
        // index 100 divides by 2
        assert!((hundredth - 5.0).abs() < 1e-5);

        let mut prev = f32::MAX;
        for i in 0..50 {
            let a = swirl_angle(0.3, i).unwrap();
            assert!(a < prev);
            prev = a;
        }
    }

    #[test]
    fn test_float_amplitude_follows_toggle() {
        let p = OrnamentProfile {
            phase: std::f32::consts::FRAC_PI_2,
            ..profile()
        };
        let frame = |tree_form| OrnamentFrame {
            progress: 1.0,
            eased: 1.0,
            tree_form,
            elapsed: 0.0,
        };
        let (scattered, _) = place_instance(&p, 0, 1.0, &frame(false));
        let (formed, _) = place_instance(&p, 0, 1.0, &frame(true));
        assert!((scattered.y - (p.tree.y + 0.5)).abs() < 1e-5);
        assert!((formed.y - (p.tree.y + 0.05)).abs() < 1e-5);
    }

    #[test]
    fn test_scale_shrinks_when_scattered() {
        let p = profile();
        let frame = |eased| OrnamentFrame {
            progress: eased,
            eased,
            tree_form: false,
            elapsed: 0.0,
        };
        let (_, scattered) = place_instance(&p, 0, 0.5, &frame(0.0));
        let (_, formed) = place_instance(&p, 0, 0.5, &frame(1.0));
        assert!((formed - 0.4).abs() < 1e-6);
        assert!((scattered - 0.4 * 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_spin_accumulates() {
        let speed = Vec3::new(0.01, 0.02, 0.0);
        let loose = spin(Vec3::ZERO, speed, false);
        assert!((loose.x - 0.02).abs() < 1e-6);
        assert!((loose.y - 0.03).abs() < 1e-6);
        assert_eq!(loose.z, 0.0);

        let settled = spin(Vec3::ZERO, speed, true);
        assert!((settled.x - 0.01).abs() < 1e-6);
        assert!((settled.y - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_spin_keeps_precision_in_long_sessions() {
        let speed = Vec3::new(0.001, 0.001, 0.001);
        let first = spin(Vec3::splat(200_000.0), speed, false);
        let mut rotation = first;
        for _ in 0..100 {
            rotation = spin(rotation, speed, false);
            assert!((-PI..PI).contains(&rotation.y));
        }
        // 100 frames of 0.001 + 0.01 on y
        let turned = crate::math::wrap_angle(rotation.y - first.y);
        assert!((turned - 1.1).abs() < 1e-3, "turned {}", turned);
    }

    #[test]
    fn test_swirl_branch_of_placement() {
        let p = OrnamentProfile {
            phase: 0.0,
            ..profile()
        };
        let frame = OrnamentFrame {
            progress: 0.5,
            eased: 0.5,
            tree_form: false,
            elapsed: 0.0,
        };
        let blended = p.scatter.lerp(&p.tree, 0.5);

        let mut placed = Vec::new();
        for index in [0, 50] {
            let angle = swirl_angle(0.5, index).unwrap();
            let (position, _) = place_instance(&p, index, 1.0, &frame);
            let expected = blended.swirl_xz(angle);
            assert!(position.distance(&expected) < 1e-5, "index {}: {:?}", index, position);
            placed.push(position);
        }
        // Later instances swirl less, so the two land apart
        assert!(placed[0].distance(&placed[1]) > 0.1);
    }

    #[test]
    fn test_generation_sits_on_surface() {
        let cat = category(300, 4);
        assert_eq!(cat.count(), 300);
        for p in cat.profiles() {
            assert!(p.scatter.length() <= 25.0 + 1e-3);
            assert!((0.5..1.0).contains(&p.scale));
            assert!(p.rotation_speed.x >= 0.0 && p.rotation_speed.x < 0.02);
            assert!(p.phase >= 0.0 && p.phase < TAU);
            // Jittered cone radius 5.5 pushed out by 1.1 at most
            assert!(p.tree.horizontal_length() <= (5.5 + 0.5) * 1.1);
        }
    }

    #[test]
    fn test_starts_at_scatter_points() {
        let cat = category(12, 9);
        for (i, p) in cat.profiles().iter().enumerate() {
            let t = cat.instance(i).unwrap();
            assert_eq!(t.position, p.scatter);
            let m = &cat.matrices()[i * MATRIX_STRIDE..(i + 1) * MATRIX_STRIDE];
            assert_eq!(m[12], p.scatter.x);
            assert_eq!(m[14], p.scatter.z);
        }
        assert!(cat.instance(12).is_none());
    }

    #[test]
    fn test_single_upload_per_frame() {
        let mut cat = category(200, 2);
        assert!(!cat.needs_update());
        assert_eq!(cat.version(), 0);

        cat.update(true, 1.0 / 60.0, 0.0);
        assert!(cat.needs_update());
        assert_eq!(cat.version(), 1);

        cat.mark_uploaded();
        assert!(!cat.needs_update());

        cat.update(true, 1.0 / 60.0, 1.0 / 60.0);
        assert_eq!(cat.version(), 2);
        assert_eq!(cat.matrices().len(), 200 * MATRIX_STRIDE);
    }

    #[test]
    fn test_shared_progress_and_settled_positions() {
        let mut cat = category(20, 6);
        for frame in 0..600 {
            cat.update(true, 1.0 / 60.0, frame as f32 / 60.0);
        }
        assert!(cat.progress() > 0.999);

        let elapsed = 599.0 / 60.0;
        for (i, p) in cat.profiles().iter().enumerate() {
            let t = cat.instance(i).unwrap();
            let expected_y = p.tree.y + (elapsed + p.phase).sin() * 0.05;
            assert!((t.position.x - p.tree.x).abs() < 0.01);
            assert!((t.position.y - expected_y).abs() < 0.01);
            assert!((t.position.z - p.tree.z).abs() < 0.01);
            assert!((t.scale - p.scale * 0.35).abs() < 1e-3);
        }
    }

    #[test]
    fn test_matrix_translation_matches_position() {
        let transform = InstanceTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.4, 0.2, 0.1),
            scale: 0.5,
        };
        let m = transform.matrix();
        assert_eq!(m.data[12], 1.0);
        assert_eq!(m.data[13], 2.0);
        assert_eq!(m.data[14], 3.0);
        let column = (m.data[0] * m.data[0] + m.data[1] * m.data[1] + m.data[2] * m.data[2]).sqrt();
        assert!((column - 0.5).abs() < 1e-5);
    }
}
