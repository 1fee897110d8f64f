//! Flat-shaded software rasterizer
//!
//! Features:
//! - Affine scene transforms (no perspective projection)
//! - Backface culling by face-normal z
//! - Flat ambient + single directional light shading
//! - Scanline edge lists with z-buffer compositing

mod math;
mod types;
mod pipeline;
mod edge_list;
mod render;

pub use math::*;
pub use types::*;
pub use pipeline::*;
pub use edge_list::*;
pub use render::*;

/// Default canvas dimensions
pub const WIDTH: usize = 600;
pub const HEIGHT: usize = 600;
