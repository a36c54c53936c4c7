//! Scripted desktop layouts for the simulator.
//!
//! Rectangles are written as `[x, y, width, height]`:
//!
//! ```toml
//! current_desktop = 1
//!
//! [[screens]]
//! id = 0
//! area = [0, 0, 1920, 1080]
//!
//! [[windows]]
//! id = 100
//! screen = 0
//! frame = [0, 1040, 1920, 40]
//! dock = true
//!
//! [[windows]]
//! id = 1
//! screen = 0
//! frame = [100, 100, 400, 300]
//! icon = [10, 1045, 40, 30]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use magiclamp::{Rect, ScreenId, StaticWorkspace, WindowGeometry, WindowId};
use serde::Deserialize;

type RectArray = [i32; 4];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default = "default_desktop")]
    pub current_desktop: u32,
    #[serde(default)]
    pub screens: Vec<ScreenSpec>,
    #[serde(default)]
    pub windows: Vec<WindowSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenSpec {
    pub id: u32,
    pub area: RectArray,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSpec {
    pub id: u64,
    pub screen: u32,
    pub frame: RectArray,
    /// Defaults to the frame.
    #[serde(default)]
    pub expanded: Option<RectArray>,
    #[serde(default)]
    pub icon: Option<RectArray>,
    #[serde(default)]
    pub dock: bool,
}

fn default_desktop() -> u32 {
    1
}

fn rect([x, y, width, height]: RectArray) -> Rect {
    Rect::new(x, y, width, height)
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid scene {}", path.display()))
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(input).context("failed to parse scene")?;
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> Result<()> {
        if self.screens.is_empty() {
            bail!("scene defines no screens");
        }
        let mut screens = HashSet::new();
        for screen in &self.screens {
            if !screens.insert(screen.id) {
                bail!("screen {} is defined twice", screen.id);
            }
            if !rect(screen.area).is_valid() {
                bail!("screen {} has an empty area", screen.id);
            }
        }

        let mut windows = HashSet::new();
        for window in &self.windows {
            if !windows.insert(window.id) {
                bail!("window {} is defined twice", window.id);
            }
            if !screens.contains(&window.screen) {
                bail!(
                    "window {} refers to unknown screen {}",
                    window.id,
                    window.screen
                );
            }
            if !rect(window.frame).is_valid() {
                bail!("window {} has an empty frame", window.id);
            }
        }
        Ok(())
    }

    /// Windows stack in file order, bottom first.
    pub fn workspace(&self) -> StaticWorkspace {
        let mut workspace = StaticWorkspace::new();
        workspace.set_current_desktop(self.current_desktop);
        for screen in &self.screens {
            workspace.add_screen(ScreenId(screen.id), rect(screen.area));
        }
        for window in &self.windows {
            let id = WindowId(window.id);
            let screen = ScreenId(window.screen);
            let frame = rect(window.frame);
            if window.dock {
                workspace.add_dock(id, screen, frame);
            } else {
                workspace.add_window(
                    id,
                    screen,
                    WindowGeometry {
                        frame,
                        expanded: window.expanded.map(rect).unwrap_or(frame),
                        icon: window.icon.map(rect).unwrap_or_default(),
                    },
                );
            }
        }
        workspace
    }

    /// Ids of every non-dock window, in file order.
    pub fn animatable_windows(&self) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|window| !window.dock)
            .map(|window| WindowId(window.id))
            .collect()
    }
}
