//! Viewer state and control handling
//!
//! The scene is never edited in place. Controls accumulate into a
//! `ViewState`, and every frame rebuilds its geometry from the loaded
//! scene, so transforms never compound across frames.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::rasterizer::{
    bounding_box, render_scene, rotate_scene, scale_scene, translate_scene, Color, Framebuffer,
    RasterSettings, RenderError, RenderStats, Scene, Vec3,
};

/// How far one key press moves the view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSteps {
    /// Radians per rotation step
    pub rotate: f32,
    /// Scale factor change per zoom step
    pub scale: f32,
    /// Pixels per pan step
    pub translate: f32,
    /// Ambient channel change per step
    pub ambient: u8,
}

impl Default for ControlSteps {
    fn default() -> Self {
        Self {
            rotate: 0.1,
            scale: 0.1,
            translate: 7.5,
            ambient: 10,
        }
    }
}

/// A single user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    RotateUp,
    RotateDown,
    RotateLeft,
    RotateRight,
    ZoomIn,
    ZoomOut,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    AmbientUp,
    AmbientDown,
    Recenter,
    Reset,
}

/// Accumulated view transform, applied to the original scene each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub scale: f32,
    pub offset: Vec3,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            rotate_x: 0.0,
            rotate_y: 0.0,
            scale: 1.0,
            offset: Vec3::ZERO,
        }
    }
}

impl ViewState {
    /// Apply a view control. Returns false for controls that are not about the view.
    pub fn apply(&mut self, control: Control, steps: &ControlSteps) -> bool {
        match control {
            Control::RotateUp => self.rotate_x += steps.rotate,
            Control::RotateDown => self.rotate_x -= steps.rotate,
            Control::RotateRight => self.rotate_y += steps.rotate,
            Control::RotateLeft => self.rotate_y -= steps.rotate,
            Control::ZoomIn => self.scale += steps.scale,
            Control::ZoomOut => self.scale = (self.scale - steps.scale).max(steps.scale),
            Control::PanUp => self.offset.y -= steps.translate,
            Control::PanDown => self.offset.y += steps.translate,
            Control::PanLeft => self.offset.x -= steps.translate,
            Control::PanRight => self.offset.x += steps.translate,
            Control::Reset => *self = ViewState::default(),
            Control::AmbientUp | Control::AmbientDown | Control::Recenter => return false,
        }
        true
    }

    /// Rotate, then scale, then translate a fresh copy of `scene`
    pub fn transform(&self, scene: &Scene) -> Scene {
        let rotated = rotate_scene(scene, self.rotate_x, self.rotate_y);
        let scaled = scale_scene(&rotated, self.scale, self.scale, self.scale);
        translate_scene(&scaled, self.offset.x, self.offset.y, self.offset.z)
    }

    /// Pick the offset that centers the visible geometry in the canvas.
    /// Leaves the offset alone if nothing is visible.
    pub fn recenter(&mut self, scene: &Scene, width: usize, height: usize) -> bool {
        let unshifted = ViewState { offset: Vec3::ZERO, ..*self };
        let Some(bounds) = bounding_box(&unshifted.transform(scene)) else {
            return false;
        };
        let (cx, cy) = bounds.center();
        self.offset = Vec3::new(width as f32 / 2.0 - cx, height as f32 / 2.0 - cy, self.offset.z);
        true
    }
}

/// Everything the viewer needs to produce a frame
pub struct AppState {
    pub scene: Option<Scene>,
    pub scene_path: Option<PathBuf>,
    pub view: ViewState,
    pub settings: RasterSettings,
    pub steps: ControlSteps,
    pub width: usize,
    pub height: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            scene: None,
            scene_path: None,
            view: ViewState::default(),
            settings: config.raster.clone(),
            steps: config.controls,
            width: config.width,
            height: config.height,
        }
    }

    /// Replace the scene and start from an untransformed view
    pub fn set_scene(&mut self, scene: Scene, path: Option<PathBuf>) {
        self.scene = Some(scene);
        self.scene_path = path;
        self.view = ViewState::default();
    }

    pub fn apply(&mut self, control: Control) {
        if self.view.apply(control, &self.steps) {
            return;
        }
        match control {
            Control::AmbientUp => {
                self.settings.ambient = adjust(self.settings.ambient, |c| c.saturating_add(self.steps.ambient));
            }
            Control::AmbientDown => {
                self.settings.ambient = adjust(self.settings.ambient, |c| c.saturating_sub(self.steps.ambient));
            }
            Control::Recenter => {
                if let Some(scene) = &self.scene {
                    self.view.recenter(scene, self.width, self.height);
                }
            }
            _ => {}
        }
    }

    /// Render the current view. Without a scene the frame is just background.
    pub fn render_frame(&self, fb: &mut Framebuffer) -> Result<RenderStats, RenderError> {
        match &self.scene {
            Some(scene) => render_scene(fb, &self.view.transform(scene), &self.settings),
            None => {
                fb.clear(self.settings.background);
                Ok(RenderStats::default())
            }
        }
    }
}

fn adjust(color: Color, f: impl Fn(u8) -> u8) -> Color {
    Color::new(f(color.r), f(color.g), f(color.b))
}
