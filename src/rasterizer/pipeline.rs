//! Scene transforms, backface culling and flat shading

use super::math::{Transform, Vec3};
use super::render::RenderError;
use super::types::{Color, ColorOverflow, Polygon, Scene};

/// Screen-space extent of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn center(&self) -> (f32, f32) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Map every vertex through `transform`. The light stays in world space.
pub fn transform_scene(scene: &Scene, transform: &Transform) -> Scene {
    let polygons = scene
        .polygons()
        .iter()
        .map(|poly| {
            let [v0, v1, v2] = poly.vertices;
            Polygon::new(
                transform.multiply(v0),
                transform.multiply(v1),
                transform.multiply(v2),
                poly.reflectance,
            )
        })
        .collect();

    Scene::new(polygons, scene.light())
}

/// Rotate about X, then about Y
pub fn rotate_scene(scene: &Scene, x_angle: f32, y_angle: f32) -> Scene {
    let rotation = Transform::new_x_rotation(x_angle).compose(&Transform::new_y_rotation(y_angle));
    transform_scene(scene, &rotation)
}

pub fn scale_scene(scene: &Scene, sx: f32, sy: f32, sz: f32) -> Scene {
    transform_scene(scene, &Transform::new_scale(sx, sy, sz))
}

pub fn translate_scene(scene: &Scene, tx: f32, ty: f32, tz: f32) -> Scene {
    transform_scene(scene, &Transform::new_translation(tx, ty, tz))
}

/// True if the polygon faces away from the viewer.
///
/// Front faces are wound so their normal has a non-positive z; mutual
/// occlusion between front faces is left to the z-buffer.
pub fn is_hidden(poly: &Polygon) -> bool {
    poly.normal().z > 0.0
}

/// Flat color for a polygon from ambient plus one directional light
pub fn get_shading(
    poly: &Polygon,
    light_direction: Vec3,
    light_color: Color,
    ambient: Color,
    overflow: ColorOverflow,
) -> Result<Color, RenderError> {
    if light_direction.len() == 0.0 {
        return Err(RenderError::ZeroLightDirection);
    }
    let angle = poly
        .normal()
        .cos_theta(light_direction)
        .ok_or(RenderError::DegenerateNormal)?;

    let reflect = poly.reflectance;
    let channel = |ambient: u8, light: u8, reflect: u8| -> u8 {
        let reflect = reflect as f32;
        let value = (ambient as f32 / 255.0 * reflect) + (light as f32 / 255.0 * reflect) * angle;
        overflow.resolve(value.abs() as u32)
    };

    Ok(Color::new(
        channel(ambient.r, light_color.r, reflect.r),
        channel(ambient.g, light_color.g, reflect.g),
        channel(ambient.b, light_color.b, reflect.b),
    ))
}

/// Extent of all visible polygons, or None if nothing is visible
pub fn bounding_box(scene: &Scene) -> Option<Bounds> {
    let mut vertices = scene
        .polygons()
        .iter()
        .filter(|poly| !is_hidden(poly))
        .flat_map(|poly| poly.vertices);

    let first = vertices.next()?;
    let start = Bounds {
        min_x: first.x,
        max_x: first.x,
        min_y: first.y,
        max_y: first.y,
    };

    Some(vertices.fold(start, |b, v| Bounds {
        min_x: b.min_x.min(v.x),
        max_x: b.max_x.max(v.x),
        min_y: b.min_y.min(v.y),
        max_y: b.max_y.max(v.y),
    }))
}
