//! Scene files
//!
//! Two formats load into a `Scene`:
//! - the line-oriented polygon list (count, one polygon per line, light)
//! - RON, which is also what `save_scene` writes

mod loader;

pub use loader::*;
