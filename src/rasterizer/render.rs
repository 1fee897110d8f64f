//! Core rendering functions
//! Z-buffer compositing of flat-shaded polygons

use std::ops::RangeInclusive;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use log::debug;
use thiserror::Error;

use super::edge_list::{compute_edge_list, EdgeList};
use super::pipeline::{get_shading, is_hidden};
use super::types::{Color, Polygon, RasterSettings, Scene};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("light direction has zero length, cannot compute shading")]
    ZeroLightDirection,
    #[error("polygon has zero area, its normal is undefined")]
    DegenerateNormal,
    #[error("pixel buffer does not match a {width}x{height} frame")]
    BufferSize { width: usize, height: usize },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Color and depth buffers for one frame
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub depth: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut fb = Self {
            pixels: vec![0; width * height * 4],
            depth: vec![f32::INFINITY; width * height],
            width,
            height,
        };
        fb.clear(Color::GRAY);
        fb
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
        self.depth.fill(f32::INFINITY);
    }

    /// Write a pixel if `z` is strictly nearer than what is stored.
    /// Ties keep the earlier writer.
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Color) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if z < self.depth[idx] {
                self.depth[idx] = z;
                let pixel_idx = idx * 4;
                self.pixels[pixel_idx..pixel_idx + 4].copy_from_slice(&color.to_bytes());
                return true;
            }
        }
        false
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            Some(Color::new(self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]))
        } else {
            None
        }
    }

    /// Rows a polygon can land on
    pub fn rows(&self) -> RangeInclusive<i32> {
        0..=i32::try_from(self.height).unwrap_or(i32::MAX).saturating_sub(1)
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.depth[y * self.width + x])
        } else {
            None
        }
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let path = path.as_ref();
        let image = self.to_image().ok_or(RenderError::BufferSize {
            width: self.width,
            height: self.height,
        })?;
        image.save_with_format(path, ImageFormat::Png)?;
        debug!("wrote {}x{} frame to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Per-frame polygon counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    pub culled: usize,
    pub degenerate: usize,
}

/// Fill one polygon's edge list into the framebuffer with a flat color.
/// Depth is interpolated from each row's left boundary, so columns off
/// screen are skipped without changing the depth of those that are drawn.
pub fn compute_zbuffer(fb: &mut Framebuffer, edges: &EdgeList, color: Color) {
    for row in 0..edges.rows() {
        let y = edges.start_y() as i64 + row as i64;
        if y < 0 || y >= fb.height as i64 {
            continue;
        }
        let Some((left, right)) = edges.row(row) else {
            continue;
        };

        let start_x = left.x.trunc();
        let end_x = right.x.trunc();
        let slope = if end_x != start_x {
            (right.z - left.z) / (end_x - start_x)
        } else {
            0.0
        };

        let first = start_x.max(0.0) as usize;
        let last = end_x.min(fb.width as f32).max(0.0) as usize;
        for x in first..last {
            let z = left.z + slope * (x as f32 - start_x);
            fb.set_pixel_with_depth(x, y as usize, z, color);
        }
    }
}

/// Render a scene into `fb`, clearing it first
pub fn render_scene(fb: &mut Framebuffer, scene: &Scene, settings: &RasterSettings) -> Result<RenderStats, RenderError> {
    fb.clear(settings.background);
    if scene.light().len() == 0.0 {
        return Err(RenderError::ZeroLightDirection);
    }

    let mut stats = RenderStats::default();

    for poly in scene.polygons() {
        let hidden = is_hidden(poly);
        if settings.backface_cull && hidden {
            stats.culled += 1;
            continue;
        }

        let color = match get_shading(poly, scene.light(), settings.light_color, settings.ambient, settings.overflow) {
            Ok(color) => color,
            Err(RenderError::DegenerateNormal) => {
                stats.degenerate += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        // Edge sides follow winding, so back faces are scanned as front faces
        let scanned = if hidden {
            let [v0, v1, v2] = poly.vertices;
            Polygon::new(v0, v2, v1, poly.reflectance)
        } else {
            *poly
        };

        let edges = compute_edge_list(&scanned, fb.rows());
        compute_zbuffer(fb, &edges, color);
        stats.drawn += 1;
    }

    debug!(
        "frame: {} drawn, {} culled, {} degenerate",
        stats.drawn, stats.culled, stats.degenerate
    );
    Ok(stats)
}

/// Render a scene into a fresh framebuffer
pub fn render(scene: &Scene, settings: &RasterSettings, width: usize, height: usize) -> Result<Framebuffer, RenderError> {
    let mut fb = Framebuffer::new(width, height);
    render_scene(&mut fb, scene, settings)?;
    Ok(fb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::Vec3;

    fn settings() -> RasterSettings {
        RasterSettings {
            ambient: Color::new(50, 50, 50),
            light_color: Color::new(200, 200, 200),
            ..RasterSettings::default()
        }
    }

    fn square(z: f32, color: Color) -> Vec<Polygon> {
        // Two front-facing triangles covering x 2..12, y 2..12
        let (a, b) = (2.0, 12.0);
        vec![
            Polygon::new(Vec3::new(a, a, z), Vec3::new(a, b, z), Vec3::new(b, b, z), color),
            Polygon::new(Vec3::new(a, a, z), Vec3::new(b, b, z), Vec3::new(b, a, z), color),
        ]
    }

    #[test]
    fn test_single_triangle_scene() {
        let scene = Scene::new(
            vec![Polygon::new(
                Vec3::new(0.0, 0.0, 5.0),
                Vec3::new(5.0, 10.0, 5.0),
                Vec3::new(10.0, 0.0, 5.0),
                Color::RED,
            )],
            Vec3::new(0.0, 0.0, -1.0),
        );
        let fb = render(&scene, &settings(), 20, 20).unwrap();
        let lit = Color::new(250, 0, 0);

        // Inside: row 0 spans x 0..10, row 5 spans x 2..7, row 9 only x 4
        for (x, y) in [(0, 0), (9, 0), (5, 5), (2, 5), (6, 5), (4, 9)] {
            assert_eq!(fb.pixel(x, y), Some(lit), "pixel ({}, {})", x, y);
            assert_eq!(fb.depth_at(x, y), Some(5.0));
        }
        // Outside
        for (x, y) in [(10, 0), (1, 5), (7, 5), (5, 9), (15, 15), (19, 19)] {
            assert_eq!(fb.pixel(x, y), Some(Color::GRAY), "pixel ({}, {})", x, y);
            assert_eq!(fb.depth_at(x, y), Some(f32::INFINITY));
        }
    }

    #[test]
    fn test_back_facing_order_is_culled() {
        let scene = Scene::new(
            vec![Polygon::new(
                Vec3::new(0.0, 0.0, 5.0),
                Vec3::new(10.0, 0.0, 5.0),
                Vec3::new(5.0, 10.0, 5.0),
                Color::RED,
            )],
            Vec3::new(0.0, 0.0, -1.0),
        );
        let mut fb = Framebuffer::new(20, 20);
        let stats = render_scene(&mut fb, &scene, &settings()).unwrap();

        assert_eq!(stats, RenderStats { drawn: 0, culled: 1, degenerate: 0 });
        assert!(fb.depth.iter().all(|d| *d == f32::INFINITY));
    }

    #[test]
    fn test_nearer_polygon_wins_in_either_order() {
        let near = Color::new(0, 0, 255);
        let far = Color::new(0, 255, 0);
        let light = Vec3::new(0.0, 0.0, -1.0);

        let near_first = Scene::new([square(1.0, near), square(5.0, far)].concat(), light);
        let far_first = Scene::new([square(5.0, far), square(1.0, near)].concat(), light);

        for scene in [near_first, far_first] {
            let fb = render(&scene, &settings(), 20, 20).unwrap();
            let expected = fb.pixel(5, 5).unwrap();
            assert_eq!(expected.b, 250);
            assert_eq!(expected.g, 0);
            for y in 3..11 {
                for x in 3..11 {
                    assert_eq!(fb.pixel(x, y), Some(expected));
                    assert_eq!(fb.depth_at(x, y), Some(1.0));
                }
            }
        }
    }

    #[test]
    fn test_equal_depth_keeps_first_writer() {
        let mut fb = Framebuffer::new(4, 4);
        assert!(fb.set_pixel_with_depth(1, 1, 2.0, Color::RED));
        assert!(!fb.set_pixel_with_depth(1, 1, 2.0, Color::WHITE));
        assert_eq!(fb.pixel(1, 1), Some(Color::RED));
    }

    #[test]
    fn test_offscreen_rows_and_columns_are_skipped() {
        // Straddles the top-left corner of the canvas
        let poly = Polygon::new(
            Vec3::new(-10.0, -10.0, 3.0),
            Vec3::new(-10.0, 10.0, 3.0),
            Vec3::new(10.0, 10.0, 3.0),
            Color::RED,
        );
        let mut fb = Framebuffer::new(8, 8);
        let edges = compute_edge_list(&poly, fb.rows());
        compute_zbuffer(&mut fb, &edges, Color::RED);

        // Row y spans x -10..y, so on-screen it covers 0..y
        assert_eq!(fb.pixel(0, 1), Some(Color::RED));
        assert_eq!(fb.pixel(4, 5), Some(Color::RED));
        assert_eq!(fb.pixel(5, 5), Some(Color::GRAY));
        assert_eq!(fb.pixel(7, 7), Some(Color::GRAY));
    }

    #[test]
    fn test_depth_interpolates_across_row() {
        let poly = Polygon::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(10.0, 4.0, 10.0),
            Color::RED,
        );
        let mut fb = Framebuffer::new(16, 16);
        let edges = compute_edge_list(&poly, fb.rows());
        compute_zbuffer(&mut fb, &edges, Color::RED);

        // Row 2: left (0, z 0), right (5, z 5)
        for x in 0..5 {
            let z = fb.depth_at(x, 2).unwrap();
            assert!((z - x as f32).abs() < 0.001, "depth at {}: {}", x, z);
        }
    }

    #[test]
    fn test_clear_resets_frame() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel_with_depth(2, 3, 1.0, Color::RED);
        fb.clear(Color::BLACK);
        assert_eq!(fb.pixel(2, 3), Some(Color::BLACK));
        assert_eq!(fb.depth_at(2, 3), Some(f32::INFINITY));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn test_zero_light_fails_frame() {
        let scene = Scene::new(square(1.0, Color::RED), Vec3::ZERO);
        assert!(matches!(
            render(&scene, &settings(), 8, 8),
            Err(RenderError::ZeroLightDirection)
        ));
    }

    #[test]
    fn test_failed_frame_is_still_cleared() {
        let mut fb = Framebuffer::new(8, 8);
        fb.set_pixel_with_depth(3, 3, 1.0, Color::RED);

        let scene = Scene::new(square(1.0, Color::RED), Vec3::ZERO);
        assert!(render_scene(&mut fb, &scene, &settings()).is_err());
        assert_eq!(fb.pixel(3, 3), Some(Color::GRAY));
        assert_eq!(fb.depth_at(3, 3), Some(f32::INFINITY));
    }

    #[test]
    fn test_back_faces_drawn_when_culling_off() {
        let light = Vec3::new(0.0, 0.0, -1.0);
        let back = Scene::new(
            vec![Polygon::new(
                Vec3::new(0.0, 0.0, 5.0),
                Vec3::new(10.0, 0.0, 5.0),
                Vec3::new(5.0, 10.0, 5.0),
                Color::RED,
            )],
            light,
        );
        let front = Scene::new(
            vec![Polygon::new(
                Vec3::new(0.0, 0.0, 5.0),
                Vec3::new(5.0, 10.0, 5.0),
                Vec3::new(10.0, 0.0, 5.0),
                Color::RED,
            )],
            light,
        );
        let no_cull = RasterSettings {
            backface_cull: false,
            ..settings()
        };

        let mut fb = Framebuffer::new(20, 20);
        let stats = render_scene(&mut fb, &back, &no_cull).unwrap();
        assert_eq!(stats, RenderStats { drawn: 1, culled: 0, degenerate: 0 });

        // Same footprint as the front-facing order, shaded facing away
        let reference = render(&front, &settings(), 20, 20).unwrap();
        assert_eq!(fb.depth, reference.depth);
        assert_eq!(fb.pixel(5, 5), Some(Color::new(150, 0, 0)));
        assert_eq!(fb.pixel(15, 15), Some(Color::GRAY));
    }

    #[test]
    fn test_huge_coordinates_are_clipped() {
        let light = Vec3::new(0.0, 0.0, -1.0);
        let tall = Polygon::new(
            Vec3::new(0.0, -3e9, 1.0),
            Vec3::new(5.0, 3e9, 1.0),
            Vec3::new(10.0, -3e9, 1.0),
            Color::RED,
        );
        let wide = Polygon::new(
            Vec3::new(-3e9, 0.0, 2.0),
            Vec3::new(0.0, 10.0, 2.0),
            Vec3::new(3e9, 0.0, 2.0),
            Color::WHITE,
        );

        let fb = render(&Scene::new(vec![tall], light), &settings(), 20, 20).unwrap();
        assert_eq!(fb.depth_at(5, 0), Some(1.0));
        assert_eq!(fb.depth_at(5, 19), Some(1.0));
        assert_eq!(fb.pixel(0, 10), Some(Color::GRAY));
        assert_eq!(fb.pixel(12, 10), Some(Color::GRAY));

        let fb = render(&Scene::new(vec![wide], light), &settings(), 20, 20).unwrap();
        assert_eq!(fb.depth_at(0, 0), Some(2.0));
        assert_eq!(fb.depth_at(19, 5), Some(2.0));
        assert_eq!(fb.pixel(5, 15), Some(Color::GRAY));
    }

    #[test]
    fn test_degenerate_polygon_is_skipped() {
        let p = Vec3::new(3.0, 3.0, 3.0);
        let mut polygons = square(2.0, Color::RED);
        polygons.insert(0, Polygon::new(p, p, p, Color::WHITE));
        let scene = Scene::new(polygons, Vec3::new(0.0, 0.0, -1.0));

        let mut fb = Framebuffer::new(16, 16);
        let stats = render_scene(&mut fb, &scene, &settings()).unwrap();
        assert_eq!(stats, RenderStats { drawn: 2, culled: 0, degenerate: 1 });
    }

    #[test]
    fn test_to_image_dimensions() {
        let fb = Framebuffer::new(6, 3);
        let image = fb.to_image().unwrap();
        assert_eq!(image.dimensions(), (6, 3));
        assert_eq!(image.get_pixel(5, 2).0, [130, 130, 130, 255]);
    }

    #[test]
    fn test_save_png_writes_frame() {
        let mut fb = Framebuffer::new(6, 3);
        fb.set_pixel_with_depth(1, 2, 0.0, Color::RED);
        let path = std::env::temp_dir().join(format!("flatshade_frame_{}.png", std::process::id()));

        fb.save_png(&path).unwrap();
        let loaded = image::open(&path).map(|img| img.to_rgba8());
        let _ = std::fs::remove_file(&path);

        let loaded = loaded.unwrap();
        assert_eq!(loaded.dimensions(), (6, 3));
        assert_eq!(loaded.get_pixel(1, 2).0, [255, 0, 0, 255]);
        assert_eq!(loaded.get_pixel(0, 0).0, [130, 130, 130, 255]);
    }

    #[test]
    fn test_save_png_rejects_mismatched_buffer() {
        let mut fb = Framebuffer::new(6, 3);
        fb.pixels.truncate(8);
        let path = std::env::temp_dir().join("flatshade_never_written.png");
        assert!(matches!(
            fb.save_png(&path),
            Err(RenderError::BufferSize { width: 6, height: 3 })
        ));
    }
}
