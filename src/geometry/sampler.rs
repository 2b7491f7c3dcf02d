use std::f32::consts::TAU;
use rand::Rng;
use serde::Deserialize;
use crate::math::Vec3;

/// Default cone height of the tree formation
pub const TREE_HEIGHT: f32 = 12.0;
/// Default cone radius at the base of the tree formation
pub const TREE_RADIUS_BASE: f32 = 5.5;
/// Default radius of the scattered cloud
pub const SCATTER_RADIUS: f32 = 25.0;

/// Cone volume the tree formation occupies, centered vertically on the origin
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeShape {
    /// Cone height; the cone spans -height/2 to height/2
    pub height: f32,
    /// Radius at the bottom, tapering linearly to 0 at the apex
    pub radius_base: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: TREE_HEIGHT,
            radius_base: TREE_RADIUS_BASE,
        }
    }
}

impl TreeShape {
    /// World height for a ratio of 0 (bottom) to 1 (apex)
    pub fn height_at(&self, y_ratio: f32) -> f32 {
        y_ratio * self.height - self.height / 2.0
    }

    /// Radius of the cone's cross-section at a height ratio
    pub fn radius_at(&self, y_ratio: f32) -> f32 {
        self.radius_base * (1.0 - y_ratio)
    }

    /// Whether a point lies inside (or on) the cone
    pub fn contains(&self, p: Vec3) -> bool {
        let y_ratio = (p.y + self.height / 2.0) / self.height;
        (0.0..=1.0).contains(&y_ratio) && p.horizontal_length() <= self.radius_at(y_ratio) + 1e-4
    }
}

/// Random point uniformly distributed by volume inside a sphere
///
/// Direction is uniform on the unit sphere (inverse-cosine polar angle,
/// uniform azimuth); the cube root of the radius sample removes the
/// surface bias.
pub fn scatter_position<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;

    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Random point inside the tree cone at a given height ratio
///
/// `y_ratio` is not clamped: values outside [0, 1] produce points above or
/// below the cone (with a negative radius mirroring the disk), never a panic.
/// Jitter adds independent uniform noise in [-jitter/2, jitter/2] per axis.
pub fn tree_position<R: Rng + ?Sized>(
    rng: &mut R,
    shape: &TreeShape,
    y_ratio: f32,
    jitter: f32,
) -> Vec3 {
    let y = shape.height_at(y_ratio);
    let current_radius = shape.radius_at(y_ratio);

    let angle = rng.gen::<f32>() * TAU;
    // Square root keeps the density uniform over the disk's area
    let r = rng.gen::<f32>().sqrt() * current_radius;

    let jx = (rng.gen::<f32>() - 0.5) * jitter;
    let jy = (rng.gen::<f32>() - 0.5) * jitter;
    let jz = (rng.gen::<f32>() - 0.5) * jitter;

    Vec3::new(r * angle.cos() + jx, y + jy, r * angle.sin() + jz)
}

/// Push a point away from the vertical axis so it sits on the cone surface
///
/// Only points further than `min_radius` from the axis are moved.
pub fn push_outward(point: Vec3, factor: f32, min_radius: f32) -> Vec3 {
    if point.horizontal_length() > min_radius {
        Vec3::new(point.x * factor, point.y, point.z * factor)
    } else {
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_scatter_inside_sphere() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..5000 {
            let p = scatter_position(&mut rng, SCATTER_RADIUS);
            assert!(p.length() <= SCATTER_RADIUS + 1e-3, "{:?} escaped the sphere", p);
        }
    }

    #[test]
    fn test_scatter_volume_uniform() {
        // For a uniform ball, (r / R)^3 is uniform on [0, 1]
        let mut rng = SmallRng::seed_from_u64(11);
        let samples = 10_000;
        let mut bins = [0usize; 10];
        for _ in 0..samples {
            let p = scatter_position(&mut rng, SCATTER_RADIUS);
            let u = (p.length() / SCATTER_RADIUS).powi(3);
            let bin = ((u * 10.0) as usize).min(9);
            bins[bin] += 1;
        }
        for (i, &count) in bins.iter().enumerate() {
            assert!(
                (850..=1150).contains(&count),
                "bin {} holds {} samples, expected about 1000",
                i,
                count
            );
        }
    }

    #[test]
    fn test_scatter_direction_unbiased() {
        let mut rng = SmallRng::seed_from_u64(3);
        let n = 10_000;
        let mut sum = Vec3::ZERO;
        for _ in 0..n {
            sum = sum + scatter_position(&mut rng, 1.0);
        }
        let mean = sum.scale(1.0 / n as f32);
        assert!(mean.length() < 0.05, "mean {:?} should sit near the origin", mean);
    }

    #[test]
    fn test_tree_position_height_exact_without_jitter() {
        let shape = TreeShape::default();
        let mut rng = SmallRng::seed_from_u64(5);
        for i in 0..=100 {
            let y_ratio = i as f32 / 100.0;
            let p = tree_position(&mut rng, &shape, y_ratio, 0.0);
            assert_eq!(p.y, y_ratio * TREE_HEIGHT - TREE_HEIGHT / 2.0);
            assert!(p.horizontal_length() <= TREE_RADIUS_BASE * (1.0 - y_ratio) + 1e-4);
            assert!(shape.contains(p));
        }
    }

    #[test]
    fn test_tree_apex_is_on_axis() {
        let shape = TreeShape::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let p = tree_position(&mut rng, &shape, 1.0, 0.0);
        assert!(p.horizontal_length() < 1e-6);
        assert_eq!(p.y, TREE_HEIGHT / 2.0);
    }

    #[test]
    fn test_tree_jitter_is_bounded() {
        let shape = TreeShape::default();
        let mut rng = SmallRng::seed_from_u64(13);
        let jitter = 0.5;
        for _ in 0..1000 {
            let p = tree_position(&mut rng, &shape, 0.5, jitter);
            assert!((p.y - shape.height_at(0.5)).abs() <= jitter / 2.0);
            assert!(p.horizontal_length() <= shape.radius_at(0.5) + jitter);
        }
    }

    #[test]
    fn test_tree_out_of_range_ratio_does_not_panic() {
        let shape = TreeShape::default();
        let mut rng = SmallRng::seed_from_u64(17);
        let above = tree_position(&mut rng, &shape, 1.5, 0.0);
        let below = tree_position(&mut rng, &shape, -0.5, 0.0);
        assert!(above.y.is_finite() && below.y.is_finite());
        assert!(above.y > TREE_HEIGHT / 2.0);
        assert!(below.y < -TREE_HEIGHT / 2.0);
        assert!(!shape.contains(above));
        assert!(!shape.contains(below));
    }

    #[test]
    fn test_same_seed_same_points() {
        let shape = TreeShape::default();
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(scatter_position(&mut a, 25.0), scatter_position(&mut b, 25.0));
            assert_eq!(
                tree_position(&mut a, &shape, 0.3, 0.2),
                tree_position(&mut b, &shape, 0.3, 0.2)
            );
        }
    }

    #[test]
    fn test_push_outward() {
        let p = Vec3::new(1.0, 2.0, -2.0);
        let pushed = push_outward(p, 1.1, 0.1);
        assert!((pushed.x - 1.1).abs() < 1e-6);
        assert_eq!(pushed.y, 2.0);
        assert!((pushed.z + 2.2).abs() < 1e-6);

        let near_axis = Vec3::new(0.05, 1.0, 0.0);
        assert_eq!(push_outward(near_axis, 1.1, 0.1), near_axis);
        assert_eq!(push_outward(Vec3::new(0.0, 3.0, 0.0), 1.25, 0.0), Vec3::new(0.0, 3.0, 0.0));
    }
}
