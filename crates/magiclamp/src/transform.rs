//! Direction-aware quad warping.
//!
//! A window folds along its motion axis (x for Left/Right, y for Top/Bottom)
//! while the perpendicular coordinate of every vertex is pulled toward the
//! matching coordinate inside the icon. The four directions are mirror images
//! of one another, so a single fold routine handles all of them:
//!
//! ```text
//!   Left/Top      offset = coord - squash * distance    taper = (extent - offset) / distance
//!   Right/Bottom  offset = coord + squash * distance    taper = offset / distance
//!
//!   scale         = stretch * curve(taper)
//!   perpendicular += scale * (icon_target - (window_origin + perpendicular))
//!   motion        = offset -/+ bump * bump_progress
//! ```

use crate::curve::EasingCurve;
use crate::direction::Direction;
use crate::geometry::Rect;
use crate::mesh::{WindowQuad, WindowVertex, BOTTOM_LEFT, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};
use crate::params::travel_distance;

/// Progress values and geometry for one frame of the fold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParameters {
    pub direction: Direction,
    pub stretch_progress: f64,
    pub squash_progress: f64,
    pub bump_progress: f64,
    pub bump_distance: f64,
    pub window: Rect,
    pub icon: Rect,
    pub shape_curve: EasingCurve,
}

fn interpolate(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}

struct Fold {
    horizontal: bool,
    /// -1 when folding toward the origin (Left, Top), +1 otherwise.
    sign: f64,
    distance: f64,
    extent: f64,
    window_origin: f64,
    window_span: f64,
    icon_origin: f64,
    icon_span: f64,
}

impl Fold {
    fn new(params: &TransformParameters) -> Self {
        let horizontal = params.direction.is_horizontal();
        let sign = match params.direction {
            Direction::Left | Direction::Top => -1.0,
            Direction::Right | Direction::Bottom => 1.0,
        };
        let distance = travel_distance(
            &params.window,
            &params.icon,
            params.direction,
            params.bump_distance,
        );
        let (extent, window_origin, window_span, icon_origin, icon_span) = if horizontal {
            (
                params.window.width,
                params.window.y,
                params.window.height,
                params.icon.y,
                params.icon.height,
            )
        } else {
            (
                params.window.height,
                params.window.x,
                params.window.width,
                params.icon.x,
                params.icon.width,
            )
        };
        Self {
            horizontal,
            sign,
            distance,
            extent: extent as f64,
            window_origin: window_origin as f64,
            window_span: window_span.max(1) as f64,
            icon_origin: icon_origin as f64,
            icon_span: icon_span as f64,
        }
    }

    /// Splits a vertex into (motion, perpendicular) coordinates.
    fn axes<'a>(&self, vertex: &'a mut WindowVertex) -> (&'a mut f64, &'a mut f64) {
        if self.horizontal {
            (&mut vertex.x, &mut vertex.y)
        } else {
            (&mut vertex.y, &mut vertex.x)
        }
    }

    /// Edges perpendicular to the motion axis as (corners, reference corner).
    fn edges(&self) -> [([usize; 2], usize); 2] {
        if self.horizontal {
            [
                ([TOP_LEFT, BOTTOM_LEFT], TOP_LEFT),
                ([TOP_RIGHT, BOTTOM_RIGHT], BOTTOM_RIGHT),
            ]
        } else {
            [
                ([TOP_LEFT, TOP_RIGHT], TOP_LEFT),
                ([BOTTOM_RIGHT, BOTTOM_LEFT], BOTTOM_RIGHT),
            ]
        }
    }

    fn apply(&self, params: &TransformParameters, quad: &mut WindowQuad) {
        let squash_offset = interpolate(0.0, self.distance, params.squash_progress);
        let bump_offset = params.bump_distance * params.bump_progress;

        for (corners, reference) in self.edges() {
            let coord = {
                let (motion, _) = self.axes(&mut quad[reference]);
                *motion
            };
            let offset = coord + self.sign * squash_offset;
            let taper = if self.sign < 0.0 {
                (self.extent - offset) / self.distance
            } else {
                offset / self.distance
            };
            let scale = params.stretch_progress * params.shape_curve.value_for_progress(taper);
            let target_offset = offset - self.sign * bump_offset;

            for corner in corners {
                let (motion, perpendicular) = self.axes(&mut quad[corner]);
                let target =
                    self.icon_origin + self.icon_span * *perpendicular / self.window_span;
                *perpendicular += scale * (target - (self.window_origin + *perpendicular));
                *motion = target_offset;
            }
        }
    }
}

/// Warps `quads` in place for one frame.
pub fn transform_quads(params: &TransformParameters, quads: &mut [WindowQuad]) {
    let fold = Fold::new(params);
    for quad in quads.iter_mut() {
        fold.apply(params, quad);
    }
}

/// Screen-space rectangle the folding window may paint into.
///
/// The expanded window rectangle is shifted by the bump, its icon-facing
/// edge is moved onto the icon's edge and its perpendicular extent is
/// widened to cover the icon.
pub fn clip_region(direction: Direction, expanded: &Rect, icon: &Rect, bump_distance: i32) -> Rect {
    match direction {
        Direction::Top => {
            let rect = expanded.translated(0, bump_distance);
            Rect::from_edges(
                icon.left().min(rect.left()),
                icon.top(),
                icon.right().max(rect.right()),
                rect.bottom(),
            )
        }
        Direction::Right => {
            let rect = expanded.translated(-bump_distance, 0);
            Rect::from_edges(
                rect.left(),
                icon.top().min(rect.top()),
                icon.right(),
                icon.bottom().max(rect.bottom()),
            )
        }
        Direction::Bottom => {
            let rect = expanded.translated(0, -bump_distance);
            Rect::from_edges(
                icon.left().min(rect.left()),
                rect.top(),
                icon.right().max(rect.right()),
                icon.bottom(),
            )
        }
        Direction::Left => {
            let rect = expanded.translated(bump_distance, 0);
            Rect::from_edges(
                icon.left(),
                icon.top().min(rect.top()),
                rect.right(),
                icon.bottom().max(rect.bottom()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::make_grid;

    const GRID: u32 = 6;

    fn params(direction: Direction, window: Rect, icon: Rect) -> TransformParameters {
        TransformParameters {
            direction,
            stretch_progress: 0.6,
            squash_progress: 0.3,
            bump_progress: 1.0,
            bump_distance: 20.0,
            window,
            icon,
            shape_curve: EasingCurve::InOutSine,
        }
    }

    fn mirror_x(rect: Rect, axis: i32) -> Rect {
        Rect::new(2 * axis - rect.right(), rect.y, rect.width, rect.height)
    }

    fn mirror_y(rect: Rect, axis: i32) -> Rect {
        Rect::new(rect.x, 2 * axis - rect.bottom(), rect.width, rect.height)
    }

    #[test]
    fn zero_progress_leaves_mesh_untouched() {
        let window = Rect::new(100, 100, 400, 300);
        let icon = Rect::new(10, 750, 40, 30);
        for direction in [
            Direction::Top,
            Direction::Right,
            Direction::Bottom,
            Direction::Left,
        ] {
            let original = make_grid(&window, &window, GRID);
            let mut quads = original.clone();
            let params = TransformParameters {
                stretch_progress: 0.0,
                squash_progress: 0.0,
                bump_progress: 0.0,
                ..params(direction, window, icon)
            };
            transform_quads(&params, &mut quads);
            assert_eq!(quads, original, "{direction:?} moved vertices");
        }
    }

    #[test]
    fn left_and_right_are_mirror_images() {
        let right_window = Rect::new(100, 200, 400, 300);
        let right_icon = Rect::new(1500, 300, 40, 30);
        let left_window = mirror_x(right_window, 1000);
        let left_icon = mirror_x(right_icon, 1000);

        let mut right = make_grid(&right_window, &right_window, GRID);
        let mut left = make_grid(&left_window, &left_window, GRID);
        transform_quads(&params(Direction::Right, right_window, right_icon), &mut right);
        transform_quads(&params(Direction::Left, left_window, left_icon), &mut left);

        let width = right_window.width as f64;
        let n = GRID as usize;
        for row in 0..n {
            for column in 0..n {
                let r = right[row * n + column];
                let l = left[row * n + (n - 1 - column)];
                for (rc, lc) in [
                    (TOP_LEFT, TOP_RIGHT),
                    (TOP_RIGHT, TOP_LEFT),
                    (BOTTOM_RIGHT, BOTTOM_LEFT),
                    (BOTTOM_LEFT, BOTTOM_RIGHT),
                ] {
                    assert!((r[rc].x - (width - l[lc].x)).abs() < 1e-9);
                    assert!((r[rc].y - l[lc].y).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn top_and_bottom_are_mirror_images() {
        let bottom_window = Rect::new(300, 100, 400, 300);
        let bottom_icon = Rect::new(500, 1040, 40, 30);
        let top_window = mirror_y(bottom_window, 540);
        let top_icon = mirror_y(bottom_icon, 540);

        let mut bottom = make_grid(&bottom_window, &bottom_window, GRID);
        let mut top = make_grid(&top_window, &top_window, GRID);
        transform_quads(&params(Direction::Bottom, bottom_window, bottom_icon), &mut bottom);
        transform_quads(&params(Direction::Top, top_window, top_icon), &mut top);

        let height = bottom_window.height as f64;
        let n = GRID as usize;
        for row in 0..n {
            for column in 0..n {
                let b = bottom[row * n + column];
                let t = top[(n - 1 - row) * n + column];
                for (bc, tc) in [
                    (TOP_LEFT, BOTTOM_LEFT),
                    (TOP_RIGHT, BOTTOM_RIGHT),
                    (BOTTOM_RIGHT, TOP_RIGHT),
                    (BOTTOM_LEFT, TOP_LEFT),
                ] {
                    assert!((b[bc].y - (height - t[tc].y)).abs() < 1e-9);
                    assert!((b[bc].x - t[tc].x).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn full_squash_collapses_onto_icon() {
        let window = Rect::new(100, 100, 400, 300);
        let icon = Rect::new(10, 750, 40, 30);
        let mut quads = make_grid(&window, &window, GRID);
        let params = TransformParameters {
            stretch_progress: 1.0,
            squash_progress: 1.0,
            bump_progress: 1.0,
            bump_distance: 0.0,
            ..params(Direction::Bottom, window, icon)
        };
        transform_quads(&params, &mut quads);

        for quad in &quads {
            for vertex in quad.vertices() {
                let screen_x = window.x as f64 + vertex.x;
                assert!(screen_x >= icon.left() as f64 - 1e-9);
                assert!(screen_x <= icon.right() as f64 + 1e-9);
            }
        }
        let top_edge = window.y as f64 + quads[0][TOP_LEFT].y;
        assert!((top_edge - icon.top() as f64).abs() < 1e-9);
    }

    #[test]
    fn bump_only_translates_along_motion_axis() {
        let window = Rect::new(100, 100, 400, 300);
        let icon = Rect::new(10, 380, 40, 30);
        let original = make_grid(&window, &window, GRID);
        let mut quads = original.clone();
        let params = TransformParameters {
            stretch_progress: 0.0,
            squash_progress: 0.0,
            bump_progress: 0.5,
            bump_distance: 40.0,
            ..params(Direction::Bottom, window, icon)
        };
        transform_quads(&params, &mut quads);
        for (moved, source) in quads.iter().zip(&original) {
            for (m, s) in moved.vertices().iter().zip(source.vertices()) {
                assert_eq!(m.x, s.x);
                assert!((m.y - (s.y - 20.0)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn coincident_window_and_icon_stay_finite() {
        let window = Rect::new(100, 100, 40, 30);
        let mut quads = make_grid(&window, &window, GRID);
        let params = TransformParameters {
            bump_distance: 0.0,
            ..params(Direction::Left, window, window)
        };
        transform_quads(&params, &mut quads);
        assert!(quads
            .iter()
            .flat_map(|quad| quad.vertices().iter())
            .all(|vertex| vertex.x.is_finite() && vertex.y.is_finite()));
    }

    #[test]
    fn clip_contains_icon_and_trailing_edge() {
        let expanded = Rect::new(800, 400, 400, 300);
        let bump = 10;
        let cases = [
            (Direction::Top, Rect::new(900, 0, 40, 30)),
            (Direction::Right, Rect::new(1880, 500, 40, 30)),
            (Direction::Bottom, Rect::new(900, 1050, 40, 30)),
            (Direction::Left, Rect::new(0, 500, 40, 30)),
        ];
        for (direction, icon) in cases {
            let clip = clip_region(direction, &expanded, &icon, bump);
            assert!(clip.contains_rect(&icon), "{direction:?} clip misses icon");

            let shifted = match direction {
                Direction::Top => expanded.translated(0, bump),
                Direction::Right => expanded.translated(-bump, 0),
                Direction::Bottom => expanded.translated(0, -bump),
                Direction::Left => expanded.translated(bump, 0),
            };
            let trailing = match direction {
                Direction::Top => Rect::new(shifted.x, shifted.bottom() - 1, shifted.width, 1),
                Direction::Right => Rect::new(shifted.x, shifted.y, 1, shifted.height),
                Direction::Bottom => Rect::new(shifted.x, shifted.y, shifted.width, 1),
                Direction::Left => Rect::new(shifted.right() - 1, shifted.y, 1, shifted.height),
            };
            assert!(clip.contains_rect(&trailing), "{direction:?} clip misses window edge");
        }
    }
}
