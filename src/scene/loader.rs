//! Scene loading and saving

use std::fs;
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::rasterizer::{Color, Polygon, Scene, Vec3};

/// Fields on a polygon line: r,g,b then three x,y,z vertices
const POLYGON_FIELDS: usize = 12;
const LIGHT_FIELDS: usize = 3;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("scene is empty, expected a polygon count")]
    MissingCount,
    #[error("line {line}: invalid polygon count '{value}'")]
    InvalidCount { line: usize, value: String },
    #[error("expected {expected} polygons, found {found}")]
    MissingPolygon { expected: usize, found: usize },
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount { line: usize, expected: usize, found: usize },
    #[error("line {line}: '{value}' is not a number")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: color channel {value} is outside 0-255")]
    ChannelOutOfRange { line: usize, value: i64 },
    #[error("missing light direction after the polygon list")]
    MissingLight,
    #[error("Parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    RonSerialize(#[from] ron::Error),
}

/// Parse the line-oriented scene format
pub fn parse_scene(text: &str) -> Result<Scene, SceneError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (line, count) = lines.next().ok_or(SceneError::MissingCount)?;
    let count: usize = count.parse().map_err(|_| SceneError::InvalidCount {
        line,
        value: count.to_string(),
    })?;

    let mut polygons = Vec::with_capacity(count);
    for found in 0..count {
        let (line, text) = lines.next().ok_or(SceneError::MissingPolygon { expected: count, found })?;
        polygons.push(parse_polygon(line, text)?);
    }

    let (line, text) = lines.next().ok_or(SceneError::MissingLight)?;
    let light = parse_floats::<LIGHT_FIELDS>(line, text)?;

    let trailing = lines.count();
    if trailing > 0 {
        warn!("ignoring {} lines after the light direction", trailing);
    }

    Ok(Scene::new(polygons, Vec3::new(light[0], light[1], light[2])))
}

fn parse_polygon(line: usize, text: &str) -> Result<Polygon, SceneError> {
    let fields = split_fields(line, text, POLYGON_FIELDS)?;

    let mut rgb = [0u8; 3];
    for (channel, field) in rgb.iter_mut().zip(&fields[..3]) {
        let value: i64 = field.parse().map_err(|_| SceneError::InvalidNumber {
            line,
            value: field.to_string(),
        })?;
        *channel = u8::try_from(value).map_err(|_| SceneError::ChannelOutOfRange { line, value })?;
    }

    let mut coords = [0f32; 9];
    for (coord, field) in coords.iter_mut().zip(&fields[3..]) {
        *coord = parse_float(line, field)?;
    }

    Ok(Polygon::new(
        Vec3::new(coords[0], coords[1], coords[2]),
        Vec3::new(coords[3], coords[4], coords[5]),
        Vec3::new(coords[6], coords[7], coords[8]),
        Color::new(rgb[0], rgb[1], rgb[2]),
    ))
}

fn parse_floats<const N: usize>(line: usize, text: &str) -> Result<[f32; N], SceneError> {
    let fields = split_fields(line, text, N)?;
    let mut values = [0f32; N];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = parse_float(line, field)?;
    }
    Ok(values)
}

fn split_fields(line: usize, text: &str, expected: usize) -> Result<Vec<&str>, SceneError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != expected {
        return Err(SceneError::FieldCount { line, expected, found: fields.len() });
    }
    Ok(fields)
}

fn parse_float(line: usize, field: &str) -> Result<f32, SceneError> {
    field.parse().map_err(|_| SceneError::InvalidNumber {
        line,
        value: field.to_string(),
    })
}

/// Load a scene file; `.ron` is read as RON, anything else as the polygon list
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_ron = path
        .extension()
        .map(|ext| ext.to_ascii_lowercase() == "ron")
        .unwrap_or(false);

    let scene = if is_ron {
        ron::from_str(&contents)?
    } else {
        parse_scene(&contents)?
    };

    info!("Loaded scene {} ({} polygons)", path.display(), scene.polygons().len());
    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}
