//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

use super::math::Vec3;

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    /// Canvas background
    pub const GRAY: Color = Color { r: 130, g: 130, b: 130 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque RGBA bytes for the framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// What shading does with a channel that comes out above 255
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorOverflow {
    /// Subtract 255 once
    #[default]
    Wrap,
    /// Saturate at 255
    Clamp,
}

impl ColorOverflow {
    pub fn resolve(self, value: u32) -> u8 {
        let value = match self {
            ColorOverflow::Wrap if value > 255 => value - 255,
            _ => value,
        };
        u8::try_from(value).unwrap_or(u8::MAX)
    }
}

/// A flat triangle. Vertex order sets the sign of the face normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: [Vec3; 3],
    pub reflectance: Color,
}

impl Polygon {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, reflectance: Color) -> Self {
        Self {
            vertices: [v0, v1, v2],
            reflectance,
        }
    }

    /// Face normal `(v1 - v0) x (v2 - v1)`, not normalized
    pub fn normal(&self) -> Vec3 {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(v2 - v1)
    }
}

/// Polygons plus one directional light. Transforms build new scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    polygons: Vec<Polygon>,
    light: Vec3,
}

impl Scene {
    pub fn new(polygons: Vec<Polygon>, light: Vec3) -> Self {
        Self { polygons, light }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Direction of the single directional light
    pub fn light(&self) -> Vec3 {
        self.light
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Ambient light, independent of direction
    pub ambient: Color,
    /// Color of the directional light
    pub light_color: Color,
    /// Clear color for each frame
    pub background: Color,
    /// Channel overflow policy for shading
    pub overflow: ColorOverflow,
    /// Backface culling
    pub backface_cull: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            ambient: Color::new(50, 50, 50),
            light_color: Color::new(0, 255, 128),
            background: Color::GRAY,
            overflow: ColorOverflow::Wrap,
            backface_cull: true,
        }
    }
}
