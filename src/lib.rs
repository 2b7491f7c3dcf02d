use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

pub mod animation;
pub mod config;
pub mod geometry;
pub mod math;
pub mod objects;
pub mod particles;
pub mod render;
pub mod scene;

pub use config::{ConfigError, Palette, SceneConfig};
pub use scene::{FrameInput, ProgressSnapshot, Scene};

use particles::{FoliageShade, OrnamentCategory};
use render::{FoliageDraw, FoliagePass};

/// Install the panic hook and console logger
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second call finds a logger already installed; nothing to do then
    console_log::init_with_level(log::Level::Info).ok();
}

/// Scene handle exposed to JavaScript
///
/// The host calls `tick` once per display refresh, then reads the flat
/// buffers it needs for its own draw calls.
#[wasm_bindgen]
pub struct EvergreenScene {
    scene: Scene,
    foliage_pass: Option<FoliagePass>,
}

#[wasm_bindgen]
impl EvergreenScene {
    /// Build a scene from an optional YAML config and seed
    ///
    /// Without a seed one is drawn from `Math.random`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: Option<String>, seed: Option<u32>) -> Result<EvergreenScene, JsValue> {
        let config = match config_yaml {
            Some(yaml) => SceneConfig::from_yaml(&yaml).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => SceneConfig::default(),
        };
        let seed = seed.unwrap_or_else(|| (js_sys::Math::random() * u32::MAX as f64) as u32);

        Ok(Self {
            scene: Scene::new(config, seed as u64),
            foliage_pass: None,
        })
    }

    /// Flip between scattered and tree-formed; returns the new state
    #[wasm_bindgen]
    pub fn toggle(&mut self) -> bool {
        self.scene.toggle()
    }

    #[wasm_bindgen]
    pub fn set_tree_form(&mut self, tree_form: bool) {
        self.scene.set_tree_form(tree_form);
    }

    #[wasm_bindgen]
    pub fn is_tree_form(&self) -> bool {
        self.scene.is_tree_form()
    }

    /// Whether the host camera should slowly orbit the tree
    #[wasm_bindgen]
    pub fn auto_rotate(&self) -> bool {
        self.scene.auto_rotate()
    }

    /// Advance one frame
    #[wasm_bindgen]
    pub fn tick(&mut self, elapsed: f32, delta: f32) {
        self.scene.tick(FrameInput::new(elapsed, delta));
    }

    // === Foliage ===

    /// Needle positions from the last tick, 3 floats each
    ///
    /// Not refreshed while the GPU foliage pass is attached.
    #[wasm_bindgen]
    pub fn foliage_positions(&self) -> Vec<f32> {
        self.scene.foliage().positions().to_vec()
    }

    /// Twinkle size and random value per needle
    #[wasm_bindgen]
    pub fn foliage_shading(&self) -> Vec<f32> {
        self.scene.foliage().shading().to_vec()
    }

    #[wasm_bindgen]
    pub fn foliage_count(&self) -> usize {
        self.scene.foliage().count()
    }

    #[wasm_bindgen]
    pub fn foliage_progress(&self) -> f32 {
        self.scene.foliage().progress()
    }

    /// Draw the foliage with our own program on the host's WebGL2 context
    #[wasm_bindgen]
    pub fn attach_foliage_renderer(&mut self, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let gl = canvas
            .get_context("webgl2")?
            .ok_or("Failed to get WebGL2 context")?
            .dyn_into::<WebGl2RenderingContext>()?;

        let shade = FoliageShade::from_palette(&self.scene.config().palette);
        let pass = FoliagePass::new(gl, self.scene.foliage(), shade)
            .map_err(|e| JsValue::from_str(&e))?;

        self.scene.foliage_mut().set_cpu_batch(false);
        self.foliage_pass = Some(pass);
        Ok(())
    }

    /// Render the foliage with column-major view and projection matrices
    #[wasm_bindgen]
    pub fn render_foliage(&self, view: &[f32], projection: &[f32]) -> Result<(), JsValue> {
        let pass = self
            .foliage_pass
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Foliage renderer not attached"))?;
        if view.len() != 16 || projection.len() != 16 {
            return Err(JsValue::from_str("Expected 4x4 view and projection matrices"));
        }

        let pixel_ratio = web_sys::window()
            .map(|w| w.device_pixel_ratio() as f32)
            .unwrap_or(1.0);
        let model = self.scene.group_matrix();

        pass.draw(&FoliageDraw {
            time: self.scene.elapsed(),
            progress: self.scene.foliage().progress(),
            pixel_ratio,
            model: &model,
            view,
            projection,
        });
        Ok(())
    }

    // === Ornaments ===

    #[wasm_bindgen]
    pub fn ornament_category_count(&self) -> usize {
        self.scene.ornaments().len()
    }

    /// Instance matrices of one category, 16 floats per instance
    #[wasm_bindgen]
    pub fn ornament_matrices(&self, category: usize) -> Option<Vec<f32>> {
        self.scene.ornaments().get(category).map(|c| c.matrices().to_vec())
    }

    /// Name, mesh kind, color and count of one category (JSON string)
    #[wasm_bindgen]
    pub fn ornament_meta(&self, category: usize) -> Option<String> {
        self.scene.ornaments().get(category).map(category_json)
    }

    #[wasm_bindgen]
    pub fn ornament_needs_update(&self, category: usize) -> bool {
        self.scene
            .ornaments()
            .get(category)
            .map(|c| c.needs_update())
            .unwrap_or(false)
    }

    /// Acknowledge that the host uploaded a category's matrices
    #[wasm_bindgen]
    pub fn mark_ornaments_uploaded(&mut self, category: usize) {
        if let Some(c) = self.scene.ornaments_mut().get_mut(category) {
            c.mark_uploaded();
        }
    }

    // === Bows & topper ===

    #[wasm_bindgen]
    pub fn bow_count(&self) -> usize {
        self.scene.bows().count()
    }

    #[wasm_bindgen]
    pub fn bow_matrices(&self) -> Vec<f32> {
        self.scene.bows().matrices().to_vec()
    }

    #[wasm_bindgen]
    pub fn topper_matrix(&self) -> Vec<f32> {
        self.scene.topper().transform().matrix().data.to_vec()
    }

    #[wasm_bindgen]
    pub fn topper_halo_matrix(&self) -> Vec<f32> {
        self.scene.topper().halo_transform().matrix().data.to_vec()
    }

    // === Scene ===

    /// Offset of the tree group as [x, y, z]
    #[wasm_bindgen]
    pub fn group_offset(&self) -> Vec<f32> {
        self.scene.group_offset().to_array().to_vec()
    }

    #[wasm_bindgen]
    pub fn group_matrix(&self) -> Vec<f32> {
        self.scene.group_matrix().data.to_vec()
    }

    /// Clear color behind the tree, linear RGB
    #[wasm_bindgen]
    pub fn background_color(&self) -> Vec<f32> {
        self.scene.config().palette.deep_background.to_array().to_vec()
    }

    /// Every palette swatch as a linear RGB triple (JSON string)
    #[wasm_bindgen]
    pub fn palette(&self) -> String {
        palette_json(&self.scene.config().palette)
    }

    /// Progress of every transition clock (JSON string)
    #[wasm_bindgen]
    pub fn progress_snapshot(&self) -> String {
        progress_json(&self.scene.progress_snapshot())
    }
}

fn category_json(category: &OrnamentCategory) -> String {
    let c = category.color();
    format!(
        r#"{{"name":"{}","kind":"{}","count":{},"color":[{},{},{}]}}"#,
        escape_json(category.name()),
        category.kind().as_str(),
        category.count(),
        c.x,
        c.y,
        c.z
    )
}

fn palette_json(palette: &Palette) -> String {
    let swatches = [
        ("emerald_dark", palette.emerald_dark),
        ("emerald_light", palette.emerald_light),
        ("gold", palette.gold),
        ("gold_metallic", palette.gold_metallic),
        ("deep_background", palette.deep_background),
        ("garnet", palette.garnet),
        ("cream", palette.cream),
    ];
    let body = swatches
        .iter()
        .map(|(name, c)| format!(r#""{}":[{},{},{}]"#, name, c.x, c.y, c.z))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{}}}", body)
}

fn progress_json(snapshot: &ProgressSnapshot) -> String {
    let list = |values: &[f32]| {
        values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
    };
    format!(
        r#"{{"foliage":{},"ornaments":[{}],"bows":[{}],"topper":{}}}"#,
        snapshot.foliage,
        list(&snapshot.ornaments),
        list(&snapshot.bows),
        snapshot.topper
    )
}

/// Escape special characters for JSON
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
