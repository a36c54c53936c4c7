//! Core of the magic lamp minimize effect.
//!
//! A window folds into its taskbar icon in up to three timed stages. The
//! crate holds everything that does not touch a GPU:
//!
//! ```text
//!   Workspace (host queries)
//!          │ WindowGeometry
//!          ▼
//!   resolve_direction ──▶ Model::start ──▶ stage + Timeline
//!                              │                 │ step(delta)
//!                              ▼                 ▼
//!            bump distance / shape factor   Model::apply ──▶ transform_quads
//!                                                            (make_grid mesh)
//! ```
//!
//! `Model` is driven by explicit frame deltas and never reads a clock, so the
//! same sequence of deltas always produces the same mesh.

pub mod curve;
pub mod direction;
pub mod geometry;
pub mod host;
pub mod mesh;
pub mod model;
pub mod params;
pub mod timeline;
pub mod transform;

pub use curve::{CurveError, EasingCurve};
pub use direction::{resolve_direction, Direction};
pub use geometry::{Point, Rect};
pub use host::{ScreenId, StaticWorkspace, WindowGeometry, WindowId, Workspace};
pub use mesh::{make_grid, WindowQuad, WindowVertex};
pub use model::{AnimationKind, AnimationStage, Model, StartOutcome};
pub use params::AnimationParameters;
pub use timeline::{Timeline, TimelineDirection};
pub use transform::{clip_region, transform_quads, TransformParameters};
