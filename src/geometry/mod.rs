//! Procedural placement of scatter and tree target points

pub mod sampler;

pub use sampler::{
    push_outward, scatter_position, tree_position, TreeShape, SCATTER_RADIUS, TREE_HEIGHT,
    TREE_RADIUS_BASE,
};
