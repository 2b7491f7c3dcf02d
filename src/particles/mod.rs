//! Particle-style element sets that share one progress value per category

pub mod foliage;
pub mod ornaments;

pub use foliage::{FoliageField, FoliageParticle, FoliageShade};
pub use ornaments::{InstanceTransform, OrnamentCategory, OrnamentProfile, MATRIX_STRIDE};
