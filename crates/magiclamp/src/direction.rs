use serde::Serialize;

use crate::geometry::Rect;
use crate::host::{WindowId, Workspace};

/// Screen edge a window folds toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Whether the window moves along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// First dock in stacking order whose frame overlaps `icon`.
fn find_dock<W: Workspace + ?Sized>(workspace: &W, icon: &Rect) -> Option<(WindowId, Rect)> {
    workspace
        .stacking_order()
        .into_iter()
        .filter(|candidate| workspace.is_dock(*candidate))
        .find_map(|candidate| {
            workspace
                .frame_geometry(candidate)
                .filter(|frame| frame.intersects(icon))
                .map(|frame| (candidate, frame))
        })
}

fn direction_from_dock(dock: &Rect, screen: &Rect) -> Direction {
    if dock.width >= dock.height {
        if dock.top() == screen.top() {
            Direction::Top
        } else {
            Direction::Bottom
        }
    } else if dock.left() == screen.left() {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// Guesses the edge from where the icon touches its screen. Used when no
/// dock covers the icon, e.g. an auto-hidden panel.
fn direction_from_icon(icon: &Rect, screen: &Rect) -> Direction {
    let rect = screen.intersected(icon);
    if rect.left() == screen.left() {
        Direction::Left
    } else if rect.top() == screen.top() {
        Direction::Top
    } else if rect.right() == screen.right() {
        Direction::Right
    } else {
        Direction::Bottom
    }
}

/// Flips `direction` when the icon lies on the other side of the window,
/// which happens when dock and window live on different screens.
fn correct_for_icon_side(direction: Direction, window: &Rect, icon: &Rect) -> Direction {
    let flip = match direction {
        Direction::Top => window.top() < icon.top(),
        Direction::Right => icon.right() < window.right(),
        Direction::Bottom => icon.bottom() < window.bottom(),
        Direction::Left => window.left() < icon.left(),
    };
    if flip {
        direction.opposite()
    } else {
        direction
    }
}

/// Resolves the edge `window` folds toward, or `None` when the window cannot
/// be animated (unknown window or invalid icon geometry).
pub fn resolve_direction<W: Workspace + ?Sized>(
    workspace: &W,
    window: WindowId,
) -> Option<Direction> {
    let frame = workspace.frame_geometry(window)?;
    let icon = workspace.icon_geometry(window).filter(Rect::is_valid)?;

    let dock = find_dock(workspace, &icon);
    let dock_screen = dock.and_then(|(id, _)| workspace.screen_of(id));

    let direction = match dock {
        Some((id, dock_frame)) => {
            let screen = workspace.screen_area_for_window(id).unwrap_or_else(|| {
                workspace.screen_area_at(dock_frame.center(), workspace.current_desktop())
            });
            direction_from_dock(&dock_frame, &screen)
        }
        None => {
            let screen = workspace.screen_area_at(icon.center(), workspace.current_desktop());
            direction_from_icon(&icon, &screen)
        }
    };

    if dock.is_some() && dock_screen.is_some() && dock_screen == workspace.screen_of(window) {
        tracing::trace!(?window, ?direction, "dock shares the window's screen");
        return Some(direction);
    }

    let corrected = correct_for_icon_side(direction, &frame, &icon);
    if corrected != direction {
        tracing::debug!(
            ?window,
            from = ?direction,
            to = ?corrected,
            "icon lies behind the window; flipping direction"
        );
    }
    Some(corrected)
}
