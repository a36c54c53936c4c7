use std::time::Duration;

use serde::Serialize;

use crate::curve::EasingCurve;
use crate::direction::{resolve_direction, Direction};
use crate::geometry::Rect;
use crate::host::{WindowGeometry, WindowId, Workspace};
use crate::mesh::WindowQuad;
use crate::params::{
    compute_bump_distance, compute_shape_factor, duration_fraction, AnimationParameters,
};
use crate::timeline::{Timeline, TimelineDirection};
use crate::transform::{clip_region, transform_quads, TransformParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Minimize,
    Unminimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStage {
    /// Window lifts off the panel it overlaps.
    Bump,
    /// Window narrows toward the icon.
    Stretch1,
    /// Same shape as `Stretch1`, used when growing back out of the icon.
    Stretch2,
    /// Window slides into the icon.
    Squash,
}

/// Result of [`Model::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A fresh run was set up.
    Started,
    /// A run was in flight; it now plays back toward its starting point.
    Reversed,
    /// The window cannot be animated; the model is unchanged.
    Rejected,
}

/// Animation state of a single window.
#[derive(Debug, Clone)]
pub struct Model {
    window: WindowId,
    parameters: AnimationParameters,
    kind: AnimationKind,
    stage: AnimationStage,
    timeline: Timeline,
    direction: Direction,
    bump_distance: i32,
    shape_factor: f64,
    clip: bool,
    done: bool,
    geometry: WindowGeometry,
}

impl Model {
    pub fn new(window: WindowId, parameters: AnimationParameters) -> Self {
        let shape_factor = parameters.shape_factor;
        Self {
            window,
            parameters,
            kind: AnimationKind::Minimize,
            stage: AnimationStage::Bump,
            timeline: Timeline::default(),
            direction: Direction::Bottom,
            bump_distance: 0,
            shape_factor,
            clip: false,
            done: false,
            geometry: WindowGeometry::default(),
        }
    }

    /// Starts (or reverses) an animation of the given kind.
    ///
    /// While the timeline is running only the kind and the playback
    /// direction change; direction, bump distance and shape factor stay as
    /// they were resolved for the run in flight.
    pub fn start<W: Workspace + ?Sized>(
        &mut self,
        kind: AnimationKind,
        workspace: &W,
    ) -> StartOutcome {
        if self.timeline.running() {
            self.kind = kind;
            self.timeline.toggle_direction();
            tracing::debug!(
                window = ?self.window,
                ?kind,
                stage = ?self.stage,
                "reversing animation in flight"
            );
            return StartOutcome::Reversed;
        }

        let Some(geometry) = workspace.window_geometry(self.window) else {
            tracing::debug!(window = ?self.window, "window has no geometry; not animating");
            return StartOutcome::Rejected;
        };
        let Some(direction) = resolve_direction(workspace, self.window) else {
            tracing::debug!(window = ?self.window, "no usable icon geometry; not animating");
            return StartOutcome::Rejected;
        };

        self.kind = kind;
        self.geometry = geometry;
        self.direction = direction;
        self.bump_distance = compute_bump_distance(
            &geometry.frame,
            &geometry.icon,
            direction,
            self.parameters.max_bump_distance,
        );
        self.shape_factor = compute_shape_factor(
            &geometry.frame,
            &geometry.icon,
            direction,
            self.bump_distance,
            self.parameters.shape_factor,
        );
        self.done = false;

        match kind {
            AnimationKind::Minimize if self.bump_distance != 0 => self.enter(
                AnimationStage::Bump,
                TimelineDirection::Forward,
                self.parameters.bump_duration,
                false,
            ),
            AnimationKind::Minimize => self.enter(
                AnimationStage::Stretch1,
                TimelineDirection::Forward,
                self.stretch_duration(),
                true,
            ),
            AnimationKind::Unminimize => self.enter(
                AnimationStage::Squash,
                TimelineDirection::Backward,
                self.parameters.squash_duration,
                true,
            ),
        }

        tracing::debug!(
            window = ?self.window,
            ?kind,
            ?direction,
            bump_distance = self.bump_distance,
            shape_factor = self.shape_factor,
            stage = ?self.stage,
            "animation started"
        );
        StartOutcome::Started
    }

    /// Advances the timeline and moves to the next stage once it completes.
    pub fn step(&mut self, delta: Duration) {
        if self.done {
            return;
        }
        self.timeline.update(delta);
        if !self.timeline.done() {
            return;
        }
        match self.kind {
            AnimationKind::Minimize => self.advance_minimize(),
            AnimationKind::Unminimize => self.advance_unminimize(),
        }
    }

    fn advance_minimize(&mut self) {
        match self.stage {
            AnimationStage::Bump => self.enter(
                AnimationStage::Stretch1,
                TimelineDirection::Forward,
                self.stretch_duration(),
                true,
            ),
            AnimationStage::Stretch1 | AnimationStage::Stretch2 => self.enter(
                AnimationStage::Squash,
                TimelineDirection::Forward,
                self.parameters.squash_duration,
                true,
            ),
            AnimationStage::Squash => self.finish(),
        }
    }

    fn advance_unminimize(&mut self) {
        match self.stage {
            AnimationStage::Bump | AnimationStage::Stretch2 => self.finish(),
            AnimationStage::Stretch1 if self.bump_distance == 0 => self.finish(),
            AnimationStage::Stretch1 => self.enter(
                AnimationStage::Bump,
                TimelineDirection::Backward,
                self.parameters.bump_duration,
                false,
            ),
            AnimationStage::Squash => self.enter(
                AnimationStage::Stretch2,
                TimelineDirection::Backward,
                self.stretch_duration(),
                true,
            ),
        }
    }

    fn enter(
        &mut self,
        stage: AnimationStage,
        direction: TimelineDirection,
        duration: Duration,
        clip: bool,
    ) {
        self.stage = stage;
        self.timeline.reset();
        self.timeline.set_direction(direction);
        self.timeline.set_duration(duration);
        self.timeline.set_curve(EasingCurve::Linear);
        self.clip = clip;
        tracing::trace!(window = ?self.window, ?stage, ?duration, "entering stage");
    }

    fn finish(&mut self) {
        self.done = true;
        tracing::trace!(window = ?self.window, kind = ?self.kind, "animation finished");
    }

    fn stretch_duration(&self) -> Duration {
        duration_fraction(self.parameters.stretch_duration, self.shape_factor)
    }

    pub fn done(&self) -> bool {
        self.done
    }

    /// Warps a mesh built over the window's geometry for the current frame.
    pub fn apply(&self, quads: &mut [WindowQuad]) {
        let value = self.timeline.value();
        let (squash, stretch, bump) = match self.stage {
            AnimationStage::Bump => (0.0, 0.0, value),
            AnimationStage::Stretch1 => (0.0, self.shape_factor * value, 1.0),
            AnimationStage::Stretch2 => {
                let stretch = self.shape_factor * value;
                (0.0, stretch, stretch)
            }
            AnimationStage::Squash => (value, (self.shape_factor + value).min(1.0), 1.0),
        };
        let params = TransformParameters {
            direction: self.direction,
            stretch_progress: stretch,
            squash_progress: squash,
            bump_progress: bump,
            bump_distance: self.bump_distance as f64,
            window: self.geometry.frame,
            icon: self.geometry.icon,
            shape_curve: self.parameters.shape_curve,
        };
        transform_quads(&params, quads);
    }

    /// Whether painting must be restricted to [`Model::clip_region`].
    pub fn needs_clip(&self) -> bool {
        self.clip
    }

    pub fn clip_region(&self) -> Rect {
        clip_region(
            self.direction,
            &self.geometry.expanded,
            &self.geometry.icon,
            self.bump_distance,
        )
    }

    pub fn parameters(&self) -> &AnimationParameters {
        &self.parameters
    }

    /// Takes effect at the next stage boundary or start.
    pub fn set_parameters(&mut self, parameters: AnimationParameters) {
        self.parameters = parameters;
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    /// Refreshes the geometry snapshot. The resolved direction is kept.
    pub fn set_geometry(&mut self, geometry: WindowGeometry) {
        self.geometry = geometry;
    }

    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    pub fn stage(&self) -> AnimationStage {
        self.stage
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn bump_distance(&self) -> i32 {
        self.bump_distance
    }

    pub fn shape_factor(&self) -> f64 {
        self.shape_factor
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ScreenId, StaticWorkspace};
    use crate::mesh::{make_grid, TOP_LEFT};

    const WINDOW: WindowId = WindowId(7);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn workspace(frame: Rect, icon: Rect) -> StaticWorkspace {
        let mut workspace = StaticWorkspace::new();
        workspace
            .add_screen(ScreenId(0), Rect::new(0, 0, 1920, 1080))
            .add_dock(WindowId(100), ScreenId(0), Rect::new(0, 740, 1920, 340))
            .add_window(
                WINDOW,
                ScreenId(0),
                WindowGeometry {
                    frame,
                    expanded: frame,
                    icon,
                },
            );
        workspace
    }

    /// Window far above its icon: no bump.
    fn distant() -> StaticWorkspace {
        workspace(Rect::new(100, 100, 400, 300), Rect::new(10, 750, 40, 30))
    }

    /// Window overlapping its icon by 20 pixels: bump of 40.
    fn overlapping() -> StaticWorkspace {
        workspace(Rect::new(100, 765, 400, 300), Rect::new(10, 1045, 40, 30))
    }

    /// Runs to completion, recording `(stage, duration, clip)` per stage.
    fn stages(model: &mut Model) -> Vec<(AnimationStage, Duration, bool)> {
        let mut seen = Vec::new();
        while !model.done() {
            seen.push((model.stage(), model.timeline().duration(), model.needs_clip()));
            let remaining = model.timeline().duration() - model.timeline().elapsed();
            model.step(remaining);
            assert!(seen.len() <= 3, "animation did not terminate");
        }
        seen
    }

    #[test]
    fn minimize_with_bump_runs_every_stage() {
        let workspace = overlapping();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        assert_eq!(model.start(AnimationKind::Minimize, &workspace), StartOutcome::Started);
        assert_eq!(model.direction(), Direction::Bottom);
        assert_eq!(model.bump_distance(), 40);
        assert!((model.shape_factor() - 300.0 / 320.0).abs() < 1e-12);

        assert_eq!(
            stages(&mut model),
            vec![
                (AnimationStage::Bump, ms(225), false),
                (AnimationStage::Stretch1, ms(94), true),
                (AnimationStage::Squash, ms(250), true),
            ]
        );
    }

    #[test]
    fn minimize_without_bump_skips_bump_stage() {
        let workspace = distant();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        assert_eq!(model.start(AnimationKind::Minimize, &workspace), StartOutcome::Started);
        assert_eq!(model.bump_distance(), 0);
        assert_eq!(
            stages(&mut model),
            vec![
                (AnimationStage::Stretch1, ms(70), true),
                (AnimationStage::Squash, ms(250), true),
            ]
        );
    }

    #[test]
    fn unminimize_plays_stages_backwards() {
        let workspace = overlapping();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        model.start(AnimationKind::Unminimize, &workspace);
        assert_eq!(model.timeline().direction(), TimelineDirection::Backward);
        assert_eq!(
            stages(&mut model),
            vec![
                (AnimationStage::Squash, ms(250), true),
                (AnimationStage::Stretch2, ms(94), true),
            ]
        );
    }

    #[test]
    fn every_run_terminates_with_frame_sized_steps() {
        for workspace in [distant(), overlapping()] {
            for kind in [AnimationKind::Minimize, AnimationKind::Unminimize] {
                let mut model = Model::new(WINDOW, AnimationParameters::default());
                model.start(kind, &workspace);
                let mut frames = 0;
                while !model.done() {
                    model.step(ms(16));
                    frames += 1;
                    assert!(frames < 100, "{kind:?} never finished");
                }
            }
        }
    }

    #[test]
    fn restart_mid_flight_reverses_without_recomputing() {
        let mut workspace = overlapping();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        model.start(AnimationKind::Minimize, &workspace);
        model.step(ms(100));
        assert!(model.timeline().running());

        // Geometry changes must not leak into a reversed run.
        workspace.set_geometry(
            WINDOW,
            WindowGeometry {
                frame: Rect::new(100, 100, 400, 300),
                expanded: Rect::new(100, 100, 400, 300),
                icon: Rect::new(10, 1045, 40, 30),
            },
        );
        assert_eq!(model.start(AnimationKind::Unminimize, &workspace), StartOutcome::Reversed);
        assert_eq!(model.kind(), AnimationKind::Unminimize);
        assert_eq!(model.stage(), AnimationStage::Bump);
        assert_eq!(model.timeline().direction(), TimelineDirection::Backward);
        assert_eq!(model.timeline().elapsed(), ms(125));
        assert_eq!(model.direction(), Direction::Bottom);
        assert_eq!(model.bump_distance(), 40);

        model.step(ms(125));
        assert!(model.done());
    }

    fn assert_stage(
        model: &Model,
        stage: AnimationStage,
        direction: TimelineDirection,
        duration: Duration,
        clip: bool,
    ) {
        assert_eq!(model.stage(), stage);
        assert_eq!(model.timeline().direction(), direction);
        assert_eq!(model.timeline().duration(), duration);
        assert_eq!(model.needs_clip(), clip);
        assert!(!model.done());
    }

    #[test]
    fn unminimize_from_stretch_drops_back_through_bump() {
        let workspace = overlapping();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        model.start(AnimationKind::Minimize, &workspace);
        model.step(ms(225));
        model.step(ms(30));
        assert_eq!(model.start(AnimationKind::Unminimize, &workspace), StartOutcome::Reversed);
        assert_stage(&model, AnimationStage::Stretch1, TimelineDirection::Backward, ms(94), true);

        model.step(ms(1000));
        assert_stage(&model, AnimationStage::Bump, TimelineDirection::Backward, ms(225), false);

        model.step(ms(1000));
        assert!(model.done());
    }

    #[test]
    fn unminimize_from_stretch_without_bump_finishes() {
        let workspace = distant();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        model.start(AnimationKind::Minimize, &workspace);
        model.step(ms(30));
        assert_eq!(model.start(AnimationKind::Unminimize, &workspace), StartOutcome::Reversed);
        assert_stage(&model, AnimationStage::Stretch1, TimelineDirection::Backward, ms(70), true);

        model.step(ms(1000));
        assert!(model.done());
        assert_eq!(model.stage(), AnimationStage::Stretch1);
    }

    #[test]
    fn minimize_during_grow_out_squashes_again() {
        let workspace = overlapping();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        model.start(AnimationKind::Unminimize, &workspace);
        model.step(ms(250));
        assert_stage(&model, AnimationStage::Stretch2, TimelineDirection::Backward, ms(94), true);
        model.step(ms(20));

        assert_eq!(model.start(AnimationKind::Minimize, &workspace), StartOutcome::Reversed);
        assert_stage(&model, AnimationStage::Stretch2, TimelineDirection::Forward, ms(94), true);

        model.step(ms(1000));
        assert_stage(&model, AnimationStage::Squash, TimelineDirection::Forward, ms(250), true);

        model.step(ms(1000));
        assert!(model.done());
    }

    #[test]
    fn missing_icon_is_rejected() {
        let workspace = workspace(Rect::new(100, 100, 400, 300), Rect::default());
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        assert_eq!(model.start(AnimationKind::Minimize, &workspace), StartOutcome::Rejected);
        assert!(!model.timeline().running());

        let mut model = Model::new(WindowId(999), AnimationParameters::default());
        assert_eq!(model.start(AnimationKind::Unminimize, &workspace), StartOutcome::Rejected);
        assert_eq!(model.kind(), AnimationKind::Minimize);
    }

    #[test]
    fn last_squash_frame_lands_in_icon() {
        let workspace = distant();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        model.start(AnimationKind::Minimize, &workspace);
        model.step(ms(70));
        assert_eq!(model.stage(), AnimationStage::Squash);
        model.step(ms(250));
        assert!(model.done());

        let frame = model.geometry().frame;
        let icon = model.geometry().icon;
        let mut quads = make_grid(&frame, &frame, 20);
        model.apply(&mut quads);
        for quad in &quads {
            for vertex in quad.vertices() {
                let x = frame.x as f64 + vertex.x;
                assert!(x >= icon.left() as f64 - 1e-9 && x <= icon.right() as f64 + 1e-9);
            }
        }
        let top = frame.y as f64 + quads[0][TOP_LEFT].y;
        assert!((top - icon.top() as f64).abs() < 1e-9);
    }

    #[test]
    fn clip_follows_geometry_snapshot() {
        let workspace = overlapping();
        let mut model = Model::new(WINDOW, AnimationParameters::default());
        model.start(AnimationKind::Minimize, &workspace);
        assert_eq!(model.clip_region(), Rect::from_edges(10, 725, 500, 1075));

        let moved = Rect::new(200, 765, 400, 300);
        model.set_geometry(WindowGeometry {
            frame: moved,
            expanded: moved,
            icon: Rect::new(10, 1045, 40, 30),
        });
        assert_eq!(model.clip_region(), Rect::from_edges(10, 725, 600, 1075));
        assert_eq!(model.direction(), Direction::Bottom);
    }
}
