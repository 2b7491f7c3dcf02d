use rand::rngs::SmallRng;
use rand::SeedableRng;
use crate::config::SceneConfig;
use crate::math::{Mat4, Vec3};
use crate::objects::{BowSet, Topper};
use crate::particles::{FoliageField, OrnamentCategory};

/// Timing for one display refresh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the scene started
    pub elapsed: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameInput {
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }
}

/// The user-controlled scattered / tree-formed switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleState {
    tree_form: bool,
}

impl ToggleState {
    pub fn is_tree_form(&self) -> bool {
        self.tree_form
    }

    pub fn flip(&mut self) -> bool {
        self.tree_form = !self.tree_form;
        self.tree_form
    }

    pub fn set(&mut self, tree_form: bool) {
        self.tree_form = tree_form;
    }
}

/// Progress of every transition clock in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub foliage: f32,
    pub ornaments: Vec<f32>,
    pub bows: Vec<f32>,
    pub topper: f32,
}

impl ProgressSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        std::iter::once(self.foliage)
            .chain(self.ornaments.iter().copied())
            .chain(self.bows.iter().copied())
            .chain(std::iter::once(self.topper))
    }
}

/// Owns every animated element and the toggle that drives them
pub struct Scene {
    config: SceneConfig,
    toggle: ToggleState,
    foliage: FoliageField,
    ornaments: Vec<OrnamentCategory>,
    bows: BowSet,
    topper: Topper,
    elapsed: f32,
}

impl Scene {
    /// Build every static profile from one seeded source
    ///
    /// Generation order is fixed (foliage, ornaments in config order, bows,
    /// topper) so a seed always reproduces the same scene.
    pub fn new(config: SceneConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let shape = config.tree;
        let radius = config.scatter_radius;

        let foliage = FoliageField::generate(&mut rng, &config.foliage, &shape, radius);
        let ornaments = config
            .ornaments
            .iter()
            .map(|category| OrnamentCategory::generate(&mut rng, category, &shape, radius))
            .collect::<Vec<_>>();
        let bows = BowSet::generate(&mut rng, &config.bows, &shape, radius);
        let topper = Topper::generate(&mut rng, &config.topper, radius);

        log::info!(
            "Scene built: {} foliage particles, {} ornaments in {} categories, {} bows (seed {})",
            foliage.count(),
            ornaments.iter().map(|c| c.count()).sum::<usize>(),
            ornaments.len(),
            bows.count(),
            seed
        );

        Self {
            config,
            toggle: ToggleState::default(),
            foliage,
            ornaments,
            bows,
            topper,
            elapsed: 0.0,
        }
    }

    /// Flip between scattered and tree-formed; returns the new state
    pub fn toggle(&mut self) -> bool {
        let tree_form = self.toggle.flip();
        log::debug!("Toggled to {}", if tree_form { "tree" } else { "scattered" });
        tree_form
    }

    pub fn set_tree_form(&mut self, tree_form: bool) {
        if self.toggle.is_tree_form() != tree_form {
            log::debug!("Tree form set to {}", tree_form);
        }
        self.toggle.set(tree_form);
    }

    pub fn is_tree_form(&self) -> bool {
        self.toggle.is_tree_form()
    }

    /// Whether the host camera should auto-rotate
    pub fn auto_rotate(&self) -> bool {
        self.toggle.is_tree_form()
    }

    /// Advance every animator by one frame
    pub fn tick(&mut self, frame: FrameInput) {
        let tree_form = self.toggle.is_tree_form();
        let FrameInput { elapsed, delta } = frame;

        self.foliage.update(tree_form, delta, elapsed);
        for category in &mut self.ornaments {
            category.update(tree_form, delta, elapsed);
        }
        self.bows.update(tree_form, delta, elapsed);
        self.topper.update(tree_form, delta, elapsed);

        self.elapsed = elapsed;
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            foliage: self.foliage.progress(),
            ornaments: self.ornaments.iter().map(|c| c.progress()).collect(),
            bows: self.bows.bows().iter().map(|b| b.progress()).collect(),
            topper: self.topper.progress(),
        }
    }

    /// Translation applied to the whole tree group by the renderer
    pub fn group_matrix(&self) -> Mat4 {
        let o = self.config.group_offset;
        Mat4::translation(o.x, o.y, o.z)
    }

    pub fn group_offset(&self) -> Vec3 {
        self.config.group_offset
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn foliage(&self) -> &FoliageField {
        &self.foliage
    }

    pub fn foliage_mut(&mut self) -> &mut FoliageField {
        &mut self.foliage
    }

    pub fn ornaments(&self) -> &[OrnamentCategory] {
        &self.ornaments
    }

    pub fn ornaments_mut(&mut self) -> &mut [OrnamentCategory] {
        &mut self.ornaments
    }

    pub fn bows(&self) -> &BowSet {
        &self.bows
    }

    pub fn topper(&self) -> &Topper {
        &self.topper
    }
}
