//! Flatshade: a flat-shaded triangle software rasterizer
//!
//! Scenes of coloured triangles are transformed, culled, shaded with one
//! ambient and one directional light, scan converted and composited
//! through a z-buffer into an RGBA framebuffer.

pub mod app;
pub mod config;
pub mod rasterizer;
pub mod scene;
