//! Foliage needle field
//!
//! Thousands of point particles share a single progress value. Each particle
//! delays its own local progress by its random value, so the cloud folds into
//! the tree in an organic, staggered wave instead of moving as one body.

use std::f32::consts::PI;
use rand::Rng;
use crate::animation::{ease, smoothstep, TransitionState};
use crate::config::{FoliageConfig, Palette};
use crate::geometry::{scatter_position, tree_position, TreeShape};
use crate::math::Vec3;

/// Fraction of the transition over which particle starts are spread
pub const DELAY_SPREAD: f32 = 0.2;
/// Particles with a random value above this render as sparkles
pub const SPARKLE_THRESHOLD: f32 = 0.9;
const SWIRL_STRENGTH: f32 = 5.0;
const BREATHE_AMPLITUDE: f32 = 0.05;

/// Floats per particle in the position buffer
pub const POSITION_STRIDE: usize = 3;
/// Floats per particle in the shading buffer: twinkling size(1) + random(1)
pub const SHADING_STRIDE: usize = 2;
/// Floats per particle in the static attribute buffer:
/// scatter(3) + tree(3) + random(1) + size(1)
pub const ATTRIBUTE_STRIDE: usize = 8;

/// Static data for one needle particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageParticle {
    pub scatter: Vec3,
    pub tree: Vec3,
    /// Uniform in [0, 1); drives start delay, swirl share and sparkle class
    pub random: f32,
    /// Size factor in [0.5, 1)
    pub size: f32,
}

impl FoliageParticle {
    fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        config: &FoliageConfig,
        shape: &TreeShape,
        scatter_radius: f32,
    ) -> Self {
        let scatter = scatter_position(rng, scatter_radius);
        let y_ratio = rng.gen::<f32>().powf(config.height_bias);
        let tree = tree_position(rng, shape, y_ratio, config.jitter);

        Self {
            scatter,
            tree,
            random: rng.gen(),
            size: rng.gen::<f32>() * 0.5 + 0.5,
        }
    }

    /// Progress of this particle after its start delay, in [0, 1]
    pub fn local_progress(&self, progress: f32) -> f32 {
        ((progress - self.random * DELAY_SPREAD) / (1.0 - DELAY_SPREAD)).clamp(0.0, 1.0)
    }

    /// Eased blend factor between scatter (0) and tree (1)
    pub fn blend(&self, progress: f32) -> f32 {
        ease(self.local_progress(progress))
    }

    /// Final position for a shared progress value at a point in time
    pub fn position(&self, progress: f32, elapsed: f32) -> Vec3 {
        let mut pos = self.scatter.lerp(&self.tree, self.blend(progress));

        // Wind once the tree has mostly formed
        if progress > 0.8 {
            let breathe = (elapsed * 1.5 + self.random * 10.0).sin() * BREATHE_AMPLITUDE;
            pos.x += breathe;
            pos.z += breathe;
        }

        // Low random values swirl the most
        if progress > 0.1 && progress < 0.9 {
            let angle = (progress * PI).sin() * SWIRL_STRENGTH * (1.0 - self.random);
            pos = pos.swirl_xz(angle);
        }

        pos
    }

    /// Point size multiplier including the twinkle pulse
    pub fn twinkle_size(&self, elapsed: f32) -> f32 {
        self.size * (0.8 + 0.2 * (elapsed * 2.0 + self.random * 100.0).sin())
    }

    pub fn is_sparkle(&self) -> bool {
        self.random > SPARKLE_THRESHOLD
    }
}

/// Colors for the needle fragment rule
#[derive(Debug, Clone, Copy)]
pub struct FoliageShade {
    pub center: Vec3,
    pub rim: Vec3,
}

impl FoliageShade {
    /// Emerald needles rimmed with gold
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            center: palette.emerald_light,
            rim: palette.gold,
        }
    }

    /// Color at `dist` from the center of a point sprite (0.5 = edge)
    ///
    /// Returns `None` outside the circular footprint. Mirrors the fragment
    /// program in `render::shaders`.
    pub fn fragment(&self, dist: f32, random: f32) -> Option<Vec3> {
        if dist > 0.5 {
            return None;
        }

        let rim_mix = smoothstep(0.35, 0.5, dist);
        let mut color = self.center.lerp(&self.rim, rim_mix);

        if random > SPARKLE_THRESHOLD {
            color = color.lerp(&Vec3::ONE, 0.5);
        }

        let gamma = 1.0 / 2.2;
        Some(Vec3::new(
            color.x.powf(gamma),
            color.y.powf(gamma),
            color.z.powf(gamma),
        ))
    }
}

/// Foliage category controller: one progress value over an arena of particles
pub struct FoliageField {
    particles: Vec<FoliageParticle>,
    transition: TransitionState,
    positions: Vec<f32>,
    shading: Vec<f32>,
    cpu_batch: bool,
}

impl FoliageField {
    /// Generate `config.count` particles from the injected random source
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        config: &FoliageConfig,
        shape: &TreeShape,
        scatter_radius: f32,
    ) -> Self {
        let particles = (0..config.count)
            .map(|_| FoliageParticle::generate(rng, config, shape, scatter_radius))
            .collect();
        Self::from_particles(particles, config.transition_rate)
    }

    pub fn from_particles(particles: Vec<FoliageParticle>, transition_rate: f32) -> Self {
        let count = particles.len();
        let mut field = Self {
            particles,
            transition: TransitionState::linear(transition_rate),
            positions: vec![0.0; count * POSITION_STRIDE],
            shading: vec![0.0; count * SHADING_STRIDE],
            cpu_batch: true,
        };
        field.write_batch(0.0);
        field
    }

    /// Advance the shared progress and rewrite the output buffers
    pub fn update(&mut self, tree_form: bool, dt: f32, elapsed: f32) {
        self.transition.advance(tree_form, dt);
        if self.cpu_batch {
            self.write_batch(elapsed);
        }
    }

    fn write_batch(&mut self, elapsed: f32) {
        let progress = self.transition.progress();

        for ((particle, pos), shade) in self
            .particles
            .iter()
            .zip(self.positions.chunks_exact_mut(POSITION_STRIDE))
            .zip(self.shading.chunks_exact_mut(SHADING_STRIDE))
        {
            pos.copy_from_slice(&particle.position(progress, elapsed).to_array());
            shade[0] = particle.twinkle_size(elapsed);
            shade[1] = particle.random;
        }
    }

    /// Skip the CPU batch when a GPU program computes positions instead
    pub fn set_cpu_batch(&mut self, enabled: bool) {
        self.cpu_batch = enabled;
    }

    pub fn cpu_batch(&self) -> bool {
        self.cpu_batch
    }

    /// Static per-particle attributes for GPU upload
    /// Format: scatter(3) + tree(3) + random(1) + size(1) = 8 floats per particle
    pub fn attribute_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.particles.len() * ATTRIBUTE_STRIDE);

        for p in &self.particles {
            data.extend_from_slice(&p.scatter.to_array());
            data.extend_from_slice(&p.tree.to_array());
            data.push(p.random);
            data.push(p.size);
        }

        data
    }

    /// Positions from the last update, 3 floats per particle
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Shading parameters from the last update, 2 floats per particle
    pub fn shading(&self) -> &[f32] {
        &self.shading
    }

    pub fn particles(&self) -> &[FoliageParticle] {
        &self.particles
    }

    pub fn progress(&self) -> f32 {
        self.transition.progress()
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn sparkle_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_sparkle()).count()
    }
}
