//! Scan conversion of a single triangle into per-row boundaries
//!
//! Edges are sorted into sides by direction alone: an edge whose y grows
//! from its first vertex to its second fills the left boundary, any other
//! edge fills the right one. With the front-face winding that `is_hidden`
//! accepts, this puts the smaller x on the left for every convex triangle.
//!
//! Only rows inside the requested window are stored, so a polygon that
//! spans millions of rows costs no more than the rows that can be seen.

use std::ops::RangeInclusive;

use super::types::Polygon;

/// x and depth where a polygon's row starts or ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub x: f32,
    pub z: f32,
}

/// Per-row left/right boundaries of one polygon, rows `start_y..=end_y`
#[derive(Debug, Clone)]
pub struct EdgeList {
    start_y: i32,
    end_y: i32,
    left: Vec<Option<Boundary>>,
    right: Vec<Option<Boundary>>,
}

impl EdgeList {
    pub fn new(start_y: i32, end_y: i32) -> Self {
        let rows = (end_y as i64 - start_y as i64 + 1).max(0) as usize;
        Self {
            start_y,
            end_y,
            left: vec![None; rows],
            right: vec![None; rows],
        }
    }

    pub fn start_y(&self) -> i32 {
        self.start_y
    }

    pub fn end_y(&self) -> i32 {
        self.end_y
    }

    /// Number of rows spanned
    pub fn rows(&self) -> usize {
        self.left.len()
    }

    pub fn left_x(&self, row: usize) -> Option<f32> {
        self.left.get(row).copied().flatten().map(|b| b.x)
    }

    pub fn right_x(&self, row: usize) -> Option<f32> {
        self.right.get(row).copied().flatten().map(|b| b.x)
    }

    pub fn left_z(&self, row: usize) -> Option<f32> {
        self.left.get(row).copied().flatten().map(|b| b.z)
    }

    pub fn right_z(&self, row: usize) -> Option<f32> {
        self.right.get(row).copied().flatten().map(|b| b.z)
    }

    /// Both boundaries of a row, if both were written
    pub fn row(&self, row: usize) -> Option<(Boundary, Boundary)> {
        let left = self.left.get(row).copied().flatten()?;
        let right = self.right.get(row).copied().flatten()?;
        Some((left, right))
    }

    fn index(&self, y: i32) -> Option<usize> {
        usize::try_from(y as i64 - self.start_y as i64)
            .ok()
            .filter(|&i| i < self.rows())
    }

    fn set_left(&mut self, y: i32, boundary: Boundary) {
        if let Some(i) = self.index(y) {
            self.left[i] = Some(boundary);
        }
    }

    fn set_right(&mut self, y: i32, boundary: Boundary) {
        if let Some(i) = self.index(y) {
            self.right[i] = Some(boundary);
        }
    }
}

/// Scanline a y coordinate falls on (round half up)
pub fn scanline(y: f32) -> i32 {
    (y + 0.5).floor() as i32
}

/// Build the edge list of one triangle, keeping only rows within `clip`.
/// Boundaries are computed from the edge's first vertex, so clipped rows
/// hold the same values they would have in an unclipped walk.
pub fn compute_edge_list(poly: &Polygon, clip: RangeInclusive<i32>) -> EdgeList {
    let vertices = poly.vertices;
    let rows = vertices.map(|v| scanline(v.y));
    let min_y = rows.iter().copied().min().unwrap_or(0).max(*clip.start());
    let max_y = rows.iter().copied().max().unwrap_or(0).min(*clip.end());

    let mut edges = EdgeList::new(min_y, max_y);

    for i in 0..3 {
        let (v1, v2) = (vertices[i], vertices[(i + 1) % 3]);
        let (y1, y2) = (rows[i], rows[(i + 1) % 3]);

        // Horizontal after rounding: contributes no rows
        let dy = y2 as i64 - y1 as i64;
        if dy == 0 {
            continue;
        }
        let slope_x = (v2.x - v1.x) / dy as f32;
        let slope_z = (v2.z - v1.z) / dy as f32;

        let first = y1.min(y2).max(min_y);
        let last = y1.max(y2).min(max_y);
        for y in first..=last {
            let steps = (y as i64 - y1 as i64) as f32;
            let boundary = Boundary {
                x: v1.x + slope_x * steps,
                z: v1.z + slope_z * steps,
            };
            if y1 < y2 {
                edges.set_left(y, boundary);
            } else {
                edges.set_right(y, boundary);
            }
        }
    }

    edges
}
