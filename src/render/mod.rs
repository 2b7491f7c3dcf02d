pub mod webgl;
pub mod shaders;
pub mod foliage_pass;

pub use webgl::WebGLContext;
pub use foliage_pass::{FoliageDraw, FoliagePass};
