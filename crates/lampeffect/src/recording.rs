//! Backends that keep a log of what they were asked to do instead of
//! touching a GPU. Used by the simulator and by tests.

use magiclamp::{Rect, WindowId};

use crate::backend::{
    DrawBackend, DrawCall, Primitive, RenderError, TextureBackend, TextureDescriptor,
    TextureHandle,
};

#[derive(Debug, Default)]
pub struct RecordingTextures {
    next_id: u64,
    pub allocated: Vec<TextureDescriptor>,
    pub freed: Vec<u64>,
    pub rasterized: Vec<(WindowId, Rect)>,
    pub fail_allocation: bool,
    pub fail_rasterize: bool,
}

impl RecordingTextures {
    /// Backend whose allocations always fail.
    pub fn failing() -> Self {
        Self {
            fail_allocation: true,
            ..Self::default()
        }
    }

    /// Textures allocated and not yet freed.
    pub fn live(&self) -> usize {
        self.allocated.len() - self.freed.len()
    }
}

impl TextureBackend for RecordingTextures {
    fn allocate(&mut self, descriptor: &TextureDescriptor) -> Result<TextureHandle, RenderError> {
        if self.fail_allocation {
            return Err(RenderError::Allocation(format!(
                "refusing {}x{} texture",
                descriptor.width, descriptor.height
            )));
        }
        self.next_id += 1;
        self.allocated.push(*descriptor);
        Ok(TextureHandle {
            id: self.next_id,
            width: descriptor.width,
            height: descriptor.height,
            y_inverted: true,
        })
    }

    fn free(&mut self, texture: TextureHandle) {
        self.freed.push(texture.id);
    }

    fn rasterize(
        &mut self,
        window: WindowId,
        _texture: &TextureHandle,
        source: &Rect,
    ) -> Result<(), RenderError> {
        if self.fail_rasterize {
            return Err(RenderError::Rasterize {
                window,
                reason: "rasterization disabled".into(),
            });
        }
        self.rasterized.push((window, *source));
        Ok(())
    }
}

/// Summary of one [`DrawCall`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub window: WindowId,
    pub primitive: Primitive,
    pub vertex_count: usize,
    pub bytes: usize,
    pub texture: u64,
    pub scissor: Option<Rect>,
    pub generate_mipmaps: bool,
    /// `(min_x, min_y, max_x, max_y)` of the vertex positions, window-local.
    pub bounds: Option<[f32; 4]>,
}

#[derive(Debug, Default)]
pub struct RecordingDraw {
    quads: bool,
    pub calls: Vec<RecordedDraw>,
}

impl RecordingDraw {
    /// Backend that accepts quads directly.
    pub fn with_quads() -> Self {
        Self {
            quads: true,
            calls: Vec::new(),
        }
    }

    pub fn last_for(&self, window: WindowId) -> Option<&RecordedDraw> {
        self.calls.iter().rev().find(|call| call.window == window)
    }
}

impl DrawBackend for RecordingDraw {
    fn supports_quads(&self) -> bool {
        self.quads
    }

    fn draw(&mut self, call: DrawCall<'_>) {
        let bounds = call.vertices.iter().fold(None, |acc: Option<[f32; 4]>, vertex| {
            let [x, y] = vertex.position;
            Some(match acc {
                None => [x, y, x, y],
                Some([min_x, min_y, max_x, max_y]) => {
                    [min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)]
                }
            })
        });
        self.calls.push(RecordedDraw {
            window: call.window,
            primitive: call.primitive,
            vertex_count: call.vertices.len(),
            bytes: call.vertex_bytes().len(),
            texture: call.texture.id,
            scissor: call.scissor,
            generate_mipmaps: call.generate_mipmaps,
            bounds,
        });
    }
}
