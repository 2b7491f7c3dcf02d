//! Scene tunables, loadable from YAML
//!
//! Every field has a default reproducing the stock scene, so a YAML
//! document only needs to name what it changes:
//!
//! ```yaml
//! tree:
//!   height: 14.0
//! scatter_radius: 30.0
//! foliage:
//!   count: 12000
//! ```

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use crate::geometry::{TreeShape, SCATTER_RADIUS};
use crate::math::Vec3;

/// Errors raised while loading or validating a scene configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },
    #[error("invalid hex color '{0}'")]
    Color(String),
}

/// Complete scene configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Cone the tree formation fills
    pub tree: TreeShape,
    /// Radius of the scattered cloud
    pub scatter_radius: f32,
    /// Offset of the whole tree group, reported to the renderer
    pub group_offset: Vec3,
    pub foliage: FoliageConfig,
    pub ornaments: Vec<OrnamentCategoryConfig>,
    pub bows: BowConfig,
    pub topper: TopperConfig,
    pub palette: Palette,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            tree: TreeShape::default(),
            scatter_radius: SCATTER_RADIUS,
            group_offset: Vec3::new(0.0, -0.5, 0.0),
            foliage: FoliageConfig::default(),
            ornaments: OrnamentCategoryConfig::stock(&palette),
            bows: BowConfig::default(),
            topper: TopperConfig::default(),
            palette,
        }
    }
}

/// Mass particle field ("needles")
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    pub count: usize,
    /// Linear approach rate of the shared progress
    pub transition_rate: f32,
    /// Exponent applied to the uniform height sample
    pub height_bias: f32,
    pub jitter: f32,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            count: 8500,
            transition_rate: 1.5,
            height_bias: 0.8,
            jitter: 0.2,
        }
    }
}

/// Mesh an ornament category is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrnamentKind {
    Sphere,
    Box,
}

impl OrnamentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrnamentKind::Sphere => "sphere",
            OrnamentKind::Box => "box",
        }
    }
}

/// One instanced ornament category
#[derive(Debug, Clone, Deserialize)]
pub struct OrnamentCategoryConfig {
    pub name: String,
    pub kind: OrnamentKind,
    pub count: usize,
    /// Category-wide scale multiplier
    pub scale: f32,
    #[serde(deserialize_with = "hex_color")]
    pub color: Vec3,
    #[serde(default = "default_ornament_damping")]
    pub damping_rate: f32,
}

fn default_ornament_damping() -> f32 {
    2.0
}

impl OrnamentCategoryConfig {
    fn new(name: &str, kind: OrnamentKind, count: usize, scale: f32, color: Vec3) -> Self {
        Self {
            name: name.to_string(),
            kind,
            count,
            scale,
            color,
            damping_rate: default_ornament_damping(),
        }
    }

    /// Gold spheres, gift boxes and small light orbs, colored from `palette`
    pub fn stock(palette: &Palette) -> Vec<Self> {
        vec![
            Self::new("gold-spheres", OrnamentKind::Sphere, 200, 0.35, palette.gold_metallic),
            Self::new("gift-boxes", OrnamentKind::Box, 40, 0.6, palette.garnet),
            Self::new("light-orbs", OrnamentKind::Sphere, 150, 0.1, palette.cream),
        ]
    }
}

/// Ribbon bows hung on the tree body
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BowConfig {
    pub count: usize,
    /// Scale once settled on the tree
    pub scale: f32,
    /// Scale while scattered
    pub scattered_scale: f32,
    pub damping_rate: f32,
    /// Lowest height ratio a bow may hang at
    pub min_height: f32,
    /// Range of height ratios above `min_height`
    pub height_span: f32,
    pub outward_push: f32,
}

impl Default for BowConfig {
    fn default() -> Self {
        Self {
            count: 12,
            scale: 0.18,
            scattered_scale: 0.2,
            damping_rate: 1.5,
            min_height: 0.2,
            height_span: 0.6,
            outward_push: 1.25,
        }
    }
}

/// Star at the apex
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopperConfig {
    pub position: Vec3,
    pub damping_rate: f32,
    pub scattered_scale: f32,
    pub halo_scale: f32,
}

impl Default for TopperConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 6.2, 0.0),
            damping_rate: 1.5,
            scattered_scale: 0.1,
            halo_scale: 1.4,
        }
    }
}

/// Scene colors, written as sRGB hex and stored as linear RGB
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Palette {
    #[serde(deserialize_with = "hex_color")]
    pub emerald_dark: Vec3,
    #[serde(deserialize_with = "hex_color")]
    pub emerald_light: Vec3,
    #[serde(deserialize_with = "hex_color")]
    pub gold: Vec3,
    #[serde(deserialize_with = "hex_color")]
    pub gold_metallic: Vec3,
    #[serde(deserialize_with = "hex_color")]
    pub deep_background: Vec3,
    /// Gift box wrapping
    #[serde(deserialize_with = "hex_color")]
    pub garnet: Vec3,
    /// Light orb glow
    #[serde(deserialize_with = "hex_color")]
    pub cream: Vec3,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            emerald_dark: srgb(0x01, 0x3d, 0x29),
            emerald_light: srgb(0x0f, 0x6b, 0x4e),
            gold: srgb(0xff, 0xd7, 0x00),
            gold_metallic: srgb(0xc5, 0xa0, 0x59),
            deep_background: srgb(0x02, 0x1a, 0x0f),
            garnet: srgb(0x4a, 0x04, 0x04),
            cream: srgb(0xff, 0xfd, 0xd0),
        }
    }
}

/// sRGB transfer curve inverted, for one channel in [0, 1]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn srgb(r: u8, g: u8, b: u8) -> Vec3 {
    let linear = |v: u8| srgb_to_linear(v as f32 / 255.0);
    Vec3::new(linear(r), linear(g), linear(b))
}

/// Parse `#rrggbb` (leading `#` optional) as sRGB into linear channels
pub fn parse_hex_color(s: &str) -> Result<Vec3, ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ConfigError::Color(s.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| ConfigError::Color(s.to_string()))
    };
    Ok(srgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn hex_color<'de, D>(deserializer: D) -> Result<Vec3, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_hex_color(&s).map_err(serde::de::Error::custom)
}

impl SceneConfig {
    /// Parse from YAML string and validate
    ///
    /// Without an `ornaments` list the stock categories are colored from the
    /// document's palette.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let has_ornaments = document.get("ornaments").is_some();

        let mut config: SceneConfig = serde_yaml::from_value(document)?;
        if !has_ornaments {
            config.ornaments = OrnamentCategoryConfig::stock(&config.palette);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject tunables that would make the morph degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tree.height", self.tree.height)?;
        non_negative("tree.radius_base", self.tree.radius_base)?;
        positive("scatter_radius", self.scatter_radius)?;

        positive("foliage.transition_rate", self.foliage.transition_rate)?;
        positive("foliage.height_bias", self.foliage.height_bias)?;
        non_negative("foliage.jitter", self.foliage.jitter)?;

        for (i, category) in self.ornaments.iter().enumerate() {
            positive(&format!("ornaments[{}].damping_rate", i), category.damping_rate)?;
            non_negative(&format!("ornaments[{}].scale", i), category.scale)?;
        }

        positive("bows.damping_rate", self.bows.damping_rate)?;
        non_negative("bows.scale", self.bows.scale)?;
        non_negative("bows.scattered_scale", self.bows.scattered_scale)?;
        non_negative("bows.outward_push", self.bows.outward_push)?;
        let top = self.bows.min_height + self.bows.height_span;
        if self.bows.min_height < 0.0 || self.bows.height_span < 0.0 || top > 1.0 {
            return Err(invalid(
                "bows.min_height",
                format!("height ratios must stay within [0, 1], got up to {}", top),
            ));
        }

        positive("topper.damping_rate", self.topper.damping_rate)?;
        non_negative("topper.scattered_scale", self.topper.scattered_scale)?;
        non_negative("topper.halo_scale", self.topper.halo_scale)?;

        Ok(())
    }

    /// Total number of animated elements across all categories
    pub fn element_count(&self) -> usize {
        self.foliage.count
            + self.ornaments.iter().map(|c| c.count).sum::<usize>()
            + self.bows.count
            + 1
    }
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason,
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a positive number, got {}", value)))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a non-negative number, got {}", value)))
    }
}
