pub mod vec3;
pub mod matrix;

pub use vec3::Vec3;
pub use matrix::Mat4;

use std::f32::consts::{PI, TAU};

/// Fold an angle into [-π, π) so accumulated spins keep full precision
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-TAU - 0.5) + 0.5).abs() < 1e-5);
        assert!((wrap_angle(3.0 * PI) + PI).abs() < 1e-5);

        let big = wrap_angle(200_000.0);
        assert!((-PI..PI).contains(&big));
    }
}
