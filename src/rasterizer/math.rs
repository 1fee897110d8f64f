//! Vector and transform math for the scene pipeline
//!
//! Everything here is affine: there is no perspective divide anywhere in
//! the renderer, so a `Transform` maps view space straight to screen space.

use std::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Magnitude
    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Cosine of the angle between two vectors.
    /// Returns None if either vector has zero length.
    pub fn cos_theta(self, other: Vec3) -> Option<f32> {
        let magnitudes = self.len() * other.len();
        if magnitudes == 0.0 || !magnitudes.is_finite() {
            return None;
        }
        Some(self.dot(other) / magnitudes)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// Affine transform over homogeneous coordinates (row-major 4x4, column vectors)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    values: [[f32; 4]; 4],
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        values: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn new(values: [[f32; 4]; 4]) -> Self {
        Self { values }
    }

    /// Rotation about the X axis (radians)
    pub fn new_x_rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos, -sin, 0.0],
            [0.0, sin, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about the Y axis (radians)
    pub fn new_y_rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new([
            [cos, 0.0, sin, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-sin, 0.0, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn new_scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self::new([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn new_translation(tx: f32, ty: f32, tz: f32) -> Self {
        Self::new([
            [1.0, 0.0, 0.0, tx],
            [0.0, 1.0, 0.0, ty],
            [0.0, 0.0, 1.0, tz],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Transform equivalent to applying `self` first, then `other`
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform::new(multiply(&other.values, &self.values))
    }

    /// Apply the transform to a point
    pub fn multiply(&self, point: Vec3) -> Vec3 {
        let m = &self.values;
        Vec3 {
            x: m[0][0] * point.x + m[0][1] * point.y + m[0][2] * point.z + m[0][3],
            y: m[1][0] * point.x + m[1][1] * point.y + m[1][2] * point.z + m[1][3],
            z: m[2][0] * point.x + m[2][1] * point.y + m[2][2] * point.z + m[2][3],
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn multiply(a: &[[f32; 4]; 4], b: &[[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut result = [[0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = a[i][0] * b[0][j]
                + a[i][1] * b[1][j]
                + a[i][2] * b[2][j]
                + a[i][3] * b[3][j];
        }
    }

    result
}
