//! Scene composition: toggle ownership and per-frame ticking

mod composer;

pub use composer::{FrameInput, ProgressSnapshot, Scene, ToggleState};
