//! Queries the effect needs from the compositor.
//!
//! The core never owns windows. It refers to them through [`WindowId`] and
//! asks a [`Workspace`] for geometry, stacking order and screen layout
//! whenever it needs them.

use std::cell::Cell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Opaque handle for a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

/// Opaque handle for a host output/screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScreenId(pub u32);

/// Geometry snapshot of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowGeometry {
    /// Frame rectangle in screen space.
    pub frame: Rect,
    /// Frame including shadow and decoration margins.
    pub expanded: Rect,
    /// Taskbar icon rectangle; may be empty when the window has no icon.
    pub icon: Rect,
}

pub trait Workspace {
    fn frame_geometry(&self, window: WindowId) -> Option<Rect>;

    fn expanded_geometry(&self, window: WindowId) -> Option<Rect>;

    fn icon_geometry(&self, window: WindowId) -> Option<Rect>;

    /// Windows from bottom to top.
    fn stacking_order(&self) -> Vec<WindowId>;

    fn is_dock(&self, window: WindowId) -> bool;

    fn screen_of(&self, window: WindowId) -> Option<ScreenId>;

    /// Full area of the given screen.
    fn screen_area(&self, screen: ScreenId) -> Option<Rect>;

    /// Area of the screen showing `point` on virtual desktop `desktop`.
    fn screen_area_at(&self, point: Point, desktop: u32) -> Rect;

    fn current_desktop(&self) -> u32;

    /// Bounding rectangle of all screens.
    fn virtual_screen_geometry(&self) -> Rect;

    /// Whether another effect currently owns the whole screen.
    fn has_active_fullscreen_effect(&self) -> bool {
        false
    }

    /// Asks the host to repaint every output on the next frame.
    fn schedule_full_repaint(&self) {}

    fn screen_area_for_window(&self, window: WindowId) -> Option<Rect> {
        self.screen_of(window).and_then(|screen| self.screen_area(screen))
    }

    /// Collects frame, expanded and icon geometry. A missing expanded
    /// rectangle falls back to the frame; a missing icon is reported as empty.
    fn window_geometry(&self, window: WindowId) -> Option<WindowGeometry> {
        let frame = self.frame_geometry(window)?;
        Some(WindowGeometry {
            frame,
            expanded: self.expanded_geometry(window).unwrap_or(frame),
            icon: self.icon_geometry(window).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
struct WindowRecord {
    geometry: WindowGeometry,
    screen: ScreenId,
    dock: bool,
}

/// In-memory [`Workspace`] fed with explicit geometry.
///
/// Useful for hosts that push state rather than answer queries, and for
/// driving the effect outside a compositor.
#[derive(Debug, Default)]
pub struct StaticWorkspace {
    screens: Vec<(ScreenId, Rect)>,
    windows: HashMap<WindowId, WindowRecord>,
    stacking: Vec<WindowId>,
    desktop: u32,
    fullscreen_effect: bool,
    repaints: Cell<u32>,
}

impl StaticWorkspace {
    pub fn new() -> Self {
        Self {
            desktop: 1,
            ..Self::default()
        }
    }

    pub fn add_screen(&mut self, id: ScreenId, area: Rect) -> &mut Self {
        self.screens.retain(|(existing, _)| *existing != id);
        self.screens.push((id, area));
        self
    }

    /// Adds a regular window on top of the stacking order.
    pub fn add_window(
        &mut self,
        id: WindowId,
        screen: ScreenId,
        geometry: WindowGeometry,
    ) -> &mut Self {
        self.insert(id, screen, geometry, false)
    }

    /// Adds a dock/panel window on top of the stacking order.
    pub fn add_dock(&mut self, id: WindowId, screen: ScreenId, frame: Rect) -> &mut Self {
        let geometry = WindowGeometry {
            frame,
            expanded: frame,
            icon: Rect::default(),
        };
        self.insert(id, screen, geometry, true)
    }

    fn insert(
        &mut self,
        id: WindowId,
        screen: ScreenId,
        geometry: WindowGeometry,
        dock: bool,
    ) -> &mut Self {
        self.stacking.retain(|existing| *existing != id);
        self.stacking.push(id);
        self.windows.insert(
            id,
            WindowRecord {
                geometry,
                screen,
                dock,
            },
        );
        self
    }

    /// Replaces a window's geometry; returns `false` for unknown windows.
    pub fn set_geometry(&mut self, id: WindowId, geometry: WindowGeometry) -> bool {
        match self.windows.get_mut(&id) {
            Some(record) => {
                record.geometry = geometry;
                true
            }
            None => false,
        }
    }

    pub fn set_current_desktop(&mut self, desktop: u32) {
        self.desktop = desktop;
    }

    pub fn set_fullscreen_effect(&mut self, active: bool) {
        self.fullscreen_effect = active;
    }

    /// Number of full repaints requested so far.
    pub fn repaint_requests(&self) -> u32 {
        self.repaints.get()
    }
}

impl Workspace for StaticWorkspace {
    fn frame_geometry(&self, window: WindowId) -> Option<Rect> {
        self.windows.get(&window).map(|record| record.geometry.frame)
    }

    fn expanded_geometry(&self, window: WindowId) -> Option<Rect> {
        self.windows
            .get(&window)
            .map(|record| record.geometry.expanded)
    }

    fn icon_geometry(&self, window: WindowId) -> Option<Rect> {
        self.windows
            .get(&window)
            .map(|record| record.geometry.icon)
            .filter(Rect::is_valid)
    }

    fn stacking_order(&self) -> Vec<WindowId> {
        self.stacking.clone()
    }

    fn is_dock(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|record| record.dock)
    }

    fn screen_of(&self, window: WindowId) -> Option<ScreenId> {
        self.windows.get(&window).map(|record| record.screen)
    }

    fn screen_area(&self, screen: ScreenId) -> Option<Rect> {
        self.screens
            .iter()
            .find(|(id, _)| *id == screen)
            .map(|(_, area)| *area)
    }

    fn screen_area_at(&self, point: Point, _desktop: u32) -> Rect {
        self.screens
            .iter()
            .find(|(_, area)| area.contains_point(point))
            .or_else(|| self.screens.first())
            .map(|(_, area)| *area)
            .unwrap_or_default()
    }

    fn current_desktop(&self) -> u32 {
        self.desktop
    }

    fn virtual_screen_geometry(&self) -> Rect {
        self.screens
            .iter()
            .map(|(_, area)| *area)
            .reduce(|acc, area| {
                Rect::from_edges(
                    acc.left().min(area.left()),
                    acc.top().min(area.top()),
                    acc.right().max(area.right()),
                    acc.bottom().max(area.bottom()),
                )
            })
            .unwrap_or_default()
    }

    fn has_active_fullscreen_effect(&self) -> bool {
        self.fullscreen_effect
    }

    fn schedule_full_repaint(&self) {
        self.repaints.set(self.repaints.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_lookup_falls_back_to_first_screen() {
        let mut workspace = StaticWorkspace::new();
        workspace
            .add_screen(ScreenId(0), Rect::new(0, 0, 1920, 1080))
            .add_screen(ScreenId(1), Rect::new(1920, 0, 1280, 1024));
        assert_eq!(
            workspace.screen_area_at(Point::new(2000, 10), 1),
            Rect::new(1920, 0, 1280, 1024)
        );
        assert_eq!(
            workspace.screen_area_at(Point::new(-50, -50), 1),
            Rect::new(0, 0, 1920, 1080)
        );
    }

    #[test]
    fn virtual_screen_spans_every_output() {
        let mut workspace = StaticWorkspace::new();
        assert_eq!(workspace.virtual_screen_geometry(), Rect::default());
        workspace
            .add_screen(ScreenId(0), Rect::new(0, 0, 1920, 1080))
            .add_screen(ScreenId(1), Rect::new(1920, 0, 1280, 1024));
        assert_eq!(workspace.virtual_screen_geometry(), Rect::new(0, 0, 3200, 1080));
    }

    #[test]
    fn empty_icon_is_reported_as_missing() {
        let mut workspace = StaticWorkspace::new();
        workspace.add_window(
            WindowId(1),
            ScreenId(0),
            WindowGeometry {
                frame: Rect::new(0, 0, 100, 100),
                expanded: Rect::new(0, 0, 100, 100),
                icon: Rect::default(),
            },
        );
        assert_eq!(workspace.icon_geometry(WindowId(1)), None);
        let geometry = workspace.window_geometry(WindowId(1)).unwrap();
        assert!(!geometry.icon.is_valid());
    }

    #[test]
    fn re_adding_window_moves_it_to_top() {
        let mut workspace = StaticWorkspace::new();
        let geometry = WindowGeometry::default();
        workspace
            .add_window(WindowId(1), ScreenId(0), geometry)
            .add_window(WindowId(2), ScreenId(0), geometry)
            .add_window(WindowId(1), ScreenId(0), geometry);
        assert_eq!(workspace.stacking_order(), vec![WindowId(2), WindowId(1)]);
    }
}
