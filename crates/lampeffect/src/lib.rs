//! Host-facing side of the magic lamp effect.
//!
//! ```text
//!   host events ──▶ MagicLampEffect ──▶ Model (per window, magiclamp)
//!                        │
//!   frame: pre_paint_screen(delta) ─▶ step every model
//!          paint_window(window)    ─▶ OffscreenRenderer::render ─▶ TextureBackend
//!                                  └▶ make_grid + Model::apply ─▶ WindowMeshRenderer ─▶ DrawBackend
//!          post_paint_screen()     ─▶ drop finished models, request repaint
//! ```
//!
//! Graphics APIs stay behind [`TextureBackend`] and [`DrawBackend`]; the
//! [`recording`] module provides in-memory implementations of both.

pub mod backend;
mod effect;
pub mod mesh;
pub mod offscreen;
pub mod recording;

pub use backend::{
    DrawBackend, DrawCall, Primitive, RenderError, TextureBackend, TextureDescriptor,
    TextureHandle, TextureMatrix, Vertex2D,
};
pub use effect::{MagicLampEffect, PaintOutcome, CHAIN_POSITION};
pub use mesh::WindowMeshRenderer;
pub use offscreen::OffscreenRenderer;

