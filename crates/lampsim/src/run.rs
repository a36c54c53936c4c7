use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use lampconfig::LampConfig;
use lampeffect::recording::{RecordingDraw, RecordingTextures};
use lampeffect::{MagicLampEffect, PaintOutcome};
use magiclamp::{
    AnimationKind, AnimationStage, Direction, Model, Rect, StartOutcome, StaticWorkspace, WindowId,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Kind, OutputFormat, ResolveArgs, SimulateArgs};
use crate::paths::AppPaths;
use crate::scene::Scene;

/// Hard stop for runaway simulations.
const MAX_FRAMES: usize = 100_000;

type SimEffect = MagicLampEffect<RecordingTextures, RecordingDraw>;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit paths must exist; otherwise the discovered config file is used
/// when present and built-in defaults when not.
pub fn load_config(explicit: Option<&Path>) -> Result<LampConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let paths = AppPaths::discover()?;
    let path = paths.config_file();
    if path.is_file() {
        read_config(&path)
    } else {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        Ok(LampConfig::default())
    }
}

fn read_config(path: &Path) -> Result<LampConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = LampConfig::from_toml_str(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub frame: usize,
    pub time_ms: f64,
    pub kind: AnimationKind,
    pub stage: AnimationStage,
    pub direction: Direction,
    /// Linear timeline progress in `[0, 1]`.
    pub progress: f64,
    pub clip: Option<Rect>,
    /// `[min_x, min_y, max_x, max_y]` of the drawn mesh in screen space.
    pub bounds: Option<[f32; 4]>,
    pub painted: bool,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub window: WindowId,
    pub kind: AnimationKind,
    pub fps: f64,
    pub reverse_after: Option<Duration>,
}

fn to_animation_kind(kind: Kind) -> AnimationKind {
    match kind {
        Kind::Minimize => AnimationKind::Minimize,
        Kind::Unminimize => AnimationKind::Unminimize,
    }
}

fn start(
    effect: &mut SimEffect,
    workspace: &StaticWorkspace,
    window: WindowId,
    kind: AnimationKind,
) -> StartOutcome {
    match kind {
        AnimationKind::Minimize => effect.on_minimize(workspace, window),
        AnimationKind::Unminimize => effect.on_unminimize(workspace, window),
    }
}

/// Runs one animation until the effect goes idle.
pub fn simulate_frames(
    scene: &Scene,
    config: LampConfig,
    simulation: &Simulation,
) -> Result<Vec<FrameRecord>> {
    let workspace = scene.workspace();
    let window = simulation.window;
    let mut effect = MagicLampEffect::new(
        config,
        RecordingTextures::default(),
        RecordingDraw::default(),
    );

    if start(&mut effect, &workspace, window, simulation.kind) == StartOutcome::Rejected {
        bail!(
            "window {} cannot be animated; it needs a frame and an icon rectangle",
            window.0
        );
    }

    let delta = Duration::from_secs_f64(1.0 / simulation.fps);
    let mut elapsed = Duration::ZERO;
    let mut reversed = false;
    let mut records = Vec::new();

    while effect.is_active() {
        if records.len() >= MAX_FRAMES {
            bail!("animation did not finish within {MAX_FRAMES} frames");
        }
        if let Some(at) = simulation.reverse_after {
            if !reversed && elapsed >= at {
                reversed = true;
                let opposite = match simulation.kind {
                    AnimationKind::Minimize => AnimationKind::Unminimize,
                    AnimationKind::Unminimize => AnimationKind::Minimize,
                };
                let outcome = start(&mut effect, &workspace, window, opposite);
                tracing::info!(?outcome, time_ms = elapsed.as_millis() as u64, "reversing");
            }
        }

        effect.pre_paint_screen(delta);
        elapsed += delta;
        let outcome = effect.paint_window(&workspace, window);

        let Some(model) = effect.model(window) else {
            break;
        };
        let bounds = match outcome {
            PaintOutcome::Painted => effect
                .mesh_renderer()
                .backend()
                .last_for(window)
                .and_then(|draw| draw.bounds)
                .map(|bounds| to_screen(bounds, &model.geometry().frame)),
            PaintOutcome::NotAnimated | PaintOutcome::NoTexture => None,
        };
        records.push(FrameRecord {
            frame: records.len() + 1,
            time_ms: elapsed.as_secs_f64() * 1000.0,
            kind: model.kind(),
            stage: model.stage(),
            direction: model.direction(),
            progress: model.timeline().progress(),
            clip: model.needs_clip().then(|| model.clip_region()),
            bounds,
            painted: outcome == PaintOutcome::Painted,
        });

        effect.post_paint_screen(&workspace);
    }

    tracing::debug!(frames = records.len(), "simulation finished");
    Ok(records)
}

fn to_screen([min_x, min_y, max_x, max_y]: [f32; 4], frame: &Rect) -> [f32; 4] {
    let (dx, dy) = (frame.x as f32, frame.y as f32);
    [min_x + dx, min_y + dy, max_x + dx, max_y + dy]
}

pub fn simulate(args: SimulateArgs) -> Result<()> {
    let scene = Scene::load(&args.scene.scene)?;
    let config = load_config(args.scene.config.as_deref())?;

    let window = match args.window {
        Some(id) => WindowId(id),
        None => scene
            .animatable_windows()
            .first()
            .copied()
            .context("scene has no window to animate")?,
    };
    let simulation = Simulation {
        window,
        kind: to_animation_kind(args.kind),
        fps: args.fps,
        reverse_after: args.reverse_after.map(Duration::from_millis),
    };
    tracing::info!(window = window.0, kind = ?simulation.kind, fps = simulation.fps, "simulating");

    let records = simulate_frames(&scene, config, &simulation)?;
    for record in &records {
        match args.scene.format {
            OutputFormat::Text => println!("{}", format_frame(record)),
            OutputFormat::Json => println!("{}", serde_json::to_string(record)?),
        }
    }
    Ok(())
}

fn label<T: std::fmt::Debug>(value: T) -> String {
    format!("{value:?}").to_lowercase()
}

fn format_rect(rect: &Rect) -> String {
    format!("{},{} {}x{}", rect.x, rect.y, rect.width, rect.height)
}

fn format_frame(record: &FrameRecord) -> String {
    let clip = record
        .clip
        .as_ref()
        .map(format_rect)
        .unwrap_or_else(|| "-".into());
    let bounds = record
        .bounds
        .map(|[x0, y0, x1, y1]| format!("{x0:.1},{y0:.1} .. {x1:.1},{y1:.1}"))
        .unwrap_or_else(|| "-".into());
    format!(
        "{:>4} {:>8.1}ms {:<10} {:<8} {:<6} progress={:.3} clip={clip} bounds={bounds}",
        record.frame,
        record.time_ms,
        label(record.kind),
        label(record.stage),
        label(record.direction),
        record.progress,
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub window: u64,
    pub animated: bool,
    pub direction: Option<Direction>,
    pub bump_distance: i32,
    pub shape_factor: f64,
}

/// What a minimize would resolve to for every non-dock window.
pub fn resolve_windows(scene: &Scene, config: &LampConfig) -> Vec<Resolution> {
    let workspace = scene.workspace();
    let parameters = config.animation_parameters();
    scene
        .animatable_windows()
        .into_iter()
        .map(|window| {
            let mut model = Model::new(window, parameters.clone());
            let animated =
                model.start(AnimationKind::Minimize, &workspace) != StartOutcome::Rejected;
            Resolution {
                window: window.0,
                animated,
                direction: animated.then(|| model.direction()),
                bump_distance: if animated { model.bump_distance() } else { 0 },
                shape_factor: if animated { model.shape_factor() } else { 0.0 },
            }
        })
        .collect()
}

pub fn resolve(args: ResolveArgs) -> Result<()> {
    let scene = Scene::load(&args.scene.scene)?;
    let config = load_config(args.scene.config.as_deref())?;

    for resolution in resolve_windows(&scene, &config) {
        match args.scene.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&resolution)?),
            OutputFormat::Text => match resolution.direction {
                Some(direction) => println!(
                    "window {}: direction={} bump={} shape_factor={:.3}",
                    resolution.window,
                    label(direction),
                    resolution.bump_distance,
                    resolution.shape_factor
                ),
                None => println!("window {}: not animated (no icon geometry)", resolution.window),
            },
        }
    }
    Ok(())
}

pub fn config_check(path: &Path) -> Result<()> {
    let config = read_config(path)?;
    let params = config.animation_parameters();
    println!("{}: ok", path.display());
    println!("  squash:          {:?}", params.squash_duration);
    println!("  stretch:         {:?}", params.stretch_duration);
    println!("  bump:            {:?}", params.bump_duration);
    println!("  grid resolution: {}", config.grid_resolution());
    println!("  max bump:        {}", params.max_bump_distance);
    println!("  shape factor:    {}", params.shape_factor);
    Ok(())
}

pub fn config_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    let file = paths.config_file();
    println!("Configuration:");
    println!("  dir:  {}", paths.config_dir().display());
    println!(
        "  file: {} ({})",
        file.display(),
        if file.is_file() { "present" } else { "missing" }
    );
    Ok(())
}
