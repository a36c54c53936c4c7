use std::collections::HashMap;
use std::time::Duration;

use lampconfig::LampConfig;
use magiclamp::{AnimationKind, AnimationParameters, Model, StartOutcome, WindowId, Workspace};

use crate::backend::{DrawBackend, TextureBackend};
use crate::mesh::WindowMeshRenderer;
use crate::offscreen::OffscreenRenderer;

/// Position in the host's effect chain; low enough to run before effects
/// that fade or scale whole windows.
pub const CHAIN_POSITION: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The window is not animating; the host paints it as usual.
    NotAnimated,
    /// The warped mesh was drawn.
    Painted,
    /// The window is animating but has no usable texture; nothing was drawn.
    NoTexture,
}

/// Minimize/unminimize effect driving one [`Model`] per animating window.
pub struct MagicLampEffect<T: TextureBackend, D: DrawBackend> {
    config: LampConfig,
    parameters: AnimationParameters,
    models: HashMap<WindowId, Model>,
    offscreen: OffscreenRenderer<T>,
    mesh: WindowMeshRenderer<D>,
}

impl<T: TextureBackend, D: DrawBackend> MagicLampEffect<T, D> {
    pub fn new(config: LampConfig, textures: T, draw: D) -> Self {
        let parameters = config.animation_parameters();
        let mesh = WindowMeshRenderer::new(draw, config.grid_resolution());
        Self {
            config,
            parameters,
            models: HashMap::new(),
            offscreen: OffscreenRenderer::new(textures),
            mesh,
        }
    }

    /// Applies a new configuration. Running animations pick up the new
    /// durations at their next stage.
    pub fn reconfigure(&mut self, config: LampConfig) {
        self.parameters = config.animation_parameters();
        self.mesh.set_grid_resolution(config.grid_resolution());
        for model in self.models.values_mut() {
            model.set_parameters(self.parameters.clone());
        }
        tracing::info!(
            grid_resolution = config.grid_resolution(),
            duration = ?config.duration,
            "effect reconfigured"
        );
        self.config = config;
    }

    pub fn config(&self) -> &LampConfig {
        &self.config
    }

    pub fn on_minimize<W: Workspace + ?Sized>(
        &mut self,
        workspace: &W,
        window: WindowId,
    ) -> StartOutcome {
        self.start(workspace, window, AnimationKind::Minimize)
    }

    pub fn on_unminimize<W: Workspace + ?Sized>(
        &mut self,
        workspace: &W,
        window: WindowId,
    ) -> StartOutcome {
        self.start(workspace, window, AnimationKind::Unminimize)
    }

    fn start<W: Workspace + ?Sized>(
        &mut self,
        workspace: &W,
        window: WindowId,
        kind: AnimationKind,
    ) -> StartOutcome {
        if workspace.has_active_fullscreen_effect() {
            tracing::debug!(?window, ?kind, "fullscreen effect active; skipping");
            return StartOutcome::Rejected;
        }
        if !workspace.icon_geometry(window).is_some_and(|icon| icon.is_valid()) {
            tracing::debug!(?window, ?kind, "window has no icon geometry; skipping");
            return StartOutcome::Rejected;
        }

        let parameters = &self.parameters;
        let model = self
            .models
            .entry(window)
            .or_insert_with(|| Model::new(window, parameters.clone()));
        let outcome = model.start(kind, workspace);
        match outcome {
            StartOutcome::Started => {
                let expanded = model.geometry().expanded;
                self.offscreen.register_window(window, &expanded);
                workspace.schedule_full_repaint();
            }
            StartOutcome::Reversed => {}
            StartOutcome::Rejected => {
                self.models.remove(&window);
                self.offscreen.unregister_window(window);
            }
        }
        outcome
    }

    pub fn on_window_removed(&mut self, window: WindowId) {
        if self.models.remove(&window).is_some() {
            tracing::debug!(?window, "window removed mid-animation");
        }
        self.offscreen.unregister_window(window);
    }

    /// Another effect took over the screen; every animation is abandoned.
    pub fn on_fullscreen_effect_activated(&mut self) {
        if !self.models.is_empty() {
            tracing::debug!(count = self.models.len(), "dropping animations for fullscreen effect");
        }
        self.models.clear();
        self.offscreen.unregister_all();
    }

    pub fn on_window_geometry_changed<W: Workspace + ?Sized>(
        &mut self,
        workspace: &W,
        window: WindowId,
    ) {
        let Some(model) = self.models.get_mut(&window) else {
            return;
        };
        let Some(mut geometry) = workspace.window_geometry(window) else {
            return;
        };
        if !geometry.icon.is_valid() {
            geometry.icon = model.geometry().icon;
        }
        model.set_geometry(geometry);
        self.offscreen.on_geometry_changed(window, &geometry.expanded);
    }

    pub fn on_window_damaged(&mut self, window: WindowId) {
        self.offscreen.on_damaged(window);
    }

    /// Advances every animation by one frame.
    pub fn pre_paint_screen(&mut self, delta: Duration) {
        for model in self.models.values_mut() {
            model.step(delta);
        }
    }

    pub fn paint_window<W: Workspace + ?Sized>(
        &mut self,
        workspace: &W,
        window: WindowId,
    ) -> PaintOutcome {
        let Some(model) = self.models.get_mut(&window) else {
            return PaintOutcome::NotAnimated;
        };

        if let Some(mut geometry) = workspace.window_geometry(window) {
            if !geometry.icon.is_valid() {
                geometry.icon = model.geometry().icon;
            }
            model.set_geometry(geometry);
        }
        let geometry = *model.geometry();

        let texture = match self.offscreen.render(window, &geometry.expanded) {
            Ok(Some(texture)) => texture,
            Ok(None) => {
                tracing::trace!(?window, "no offscreen texture registered");
                return PaintOutcome::NoTexture;
            }
            Err(err) => {
                tracing::warn!(?window, error = %err, "failed to render window offscreen");
                return PaintOutcome::NoTexture;
            }
        };

        let mut quads = self.mesh.make_grid(&geometry);
        model.apply(&mut quads);
        let clip = model.needs_clip().then(|| model.clip_region());

        self.mesh.render(
            window,
            &geometry.frame,
            &workspace.virtual_screen_geometry(),
            &quads,
            &texture,
            clip,
        );
        PaintOutcome::Painted
    }

    /// Drops finished animations and keeps frames coming while any remain.
    pub fn post_paint_screen<W: Workspace + ?Sized>(&mut self, workspace: &W) {
        let offscreen = &mut self.offscreen;
        self.models.retain(|window, model| {
            if model.done() {
                tracing::debug!(?window, kind = ?model.kind(), "animation complete");
                offscreen.unregister_window(*window);
                false
            } else {
                true
            }
        });
        if !self.models.is_empty() {
            workspace.schedule_full_repaint();
        }
    }

    pub fn is_active(&self) -> bool {
        !self.models.is_empty()
    }

    pub fn requested_chain_position(&self) -> i32 {
        CHAIN_POSITION
    }

    pub fn grid_resolution(&self) -> u32 {
        self.mesh.grid_resolution()
    }

    pub fn model(&self, window: WindowId) -> Option<&Model> {
        self.models.get(&window)
    }

    pub fn offscreen(&self) -> &OffscreenRenderer<T> {
        &self.offscreen
    }

    pub fn mesh_renderer(&self) -> &WindowMeshRenderer<D> {
        &self.mesh
    }
}
