use std::ops::{Index, IndexMut};

use crate::geometry::Rect;

/// Mesh vertex in window-local coordinates with normalized texture
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowVertex {
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

impl WindowVertex {
    pub const fn new(x: f64, y: f64, u: f64, v: f64) -> Self {
        Self { x, y, u, v }
    }
}

pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// Four vertices wound top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowQuad {
    vertices: [WindowVertex; 4],
}

impl WindowQuad {
    pub const fn new(vertices: [WindowVertex; 4]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[WindowVertex; 4] {
        &self.vertices
    }
}

impl Index<usize> for WindowQuad {
    type Output = WindowVertex;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vertices[index]
    }
}

impl IndexMut<usize> for WindowQuad {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

/// Builds a `resolution × resolution` grid covering `expanded`, positioned
/// relative to the origin of `frame`. Row-major, top row first.
pub fn make_grid(frame: &Rect, expanded: &Rect, resolution: u32) -> Vec<WindowQuad> {
    let resolution = resolution.max(1);
    let cells = resolution as usize;
    let mut quads = Vec::with_capacity(cells * cells);

    let initial_x = (expanded.x - frame.x) as f64;
    let initial_y = (expanded.y - frame.y) as f64;

    let dx = expanded.width as f64 / resolution as f64;
    let dy = expanded.height as f64 / resolution as f64;
    let du = 1.0 / resolution as f64;
    let dv = 1.0 / resolution as f64;

    for row in 0..cells {
        let y = initial_y + dy * row as f64;
        let v = dv * row as f64;
        for column in 0..cells {
            let x = initial_x + dx * column as f64;
            let u = du * column as f64;
            quads.push(WindowQuad::new([
                WindowVertex::new(x, y, u, v),
                WindowVertex::new(x + dx, y, u + du, v),
                WindowVertex::new(x + dx, y + dy, u + du, v + dv),
                WindowVertex::new(x, y + dy, u, v + dv),
            ]));
        }
    }

    quads
}

/// Axis-aligned bounds `(min_x, min_y, max_x, max_y)` of a mesh, or `None`
/// for an empty mesh.
pub fn bounds(quads: &[WindowQuad]) -> Option<(f64, f64, f64, f64)> {
    quads
        .iter()
        .flat_map(|quad| quad.vertices().iter())
        .fold(None, |acc, vertex| {
            let (min_x, min_y, max_x, max_y) =
                acc.unwrap_or((vertex.x, vertex.y, vertex.x, vertex.y));
            Some((
                min_x.min(vertex.x),
                min_y.min(vertex.y),
                max_x.max(vertex.x),
                max_y.max(vertex.y),
            ))
        })
}
