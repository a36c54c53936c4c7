//! GPU seams of the effect.
//!
//! The effect never talks to a graphics API directly. Offscreen textures come
//! from a [`TextureBackend`], finished meshes go to a [`DrawBackend`].

use bytemuck::{Pod, Zeroable};
use magiclamp::{Rect, WindowId};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot allocate an empty {width}x{height} render target")]
    EmptyTarget { width: i32, height: i32 },
    #[error("texture allocation failed: {0}")]
    Allocation(String),
    #[error("failed to render window {window:?} offscreen: {reason}")]
    Rasterize { window: WindowId, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

/// Backend-issued texture handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// Render-target textures are stored bottom-up.
    pub y_inverted: bool,
}

impl TextureHandle {
    /// Maps normalized mesh texture coordinates into the texture.
    pub fn matrix(&self) -> TextureMatrix {
        if self.y_inverted {
            TextureMatrix {
                scale: [1.0, -1.0],
                shift: [0.0, 1.0],
            }
        } else {
            TextureMatrix::IDENTITY
        }
    }
}

/// Scale-and-shift texture coordinate transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureMatrix {
    pub scale: [f32; 2],
    pub shift: [f32; 2],
}

impl TextureMatrix {
    pub const IDENTITY: Self = Self {
        scale: [1.0, 1.0],
        shift: [0.0, 0.0],
    };

    pub fn apply(&self, u: f32, v: f32) -> [f32; 2] {
        [
            u * self.scale[0] + self.shift[0],
            v * self.scale[1] + self.shift[1],
        ]
    }
}

pub trait TextureBackend {
    fn allocate(&mut self, descriptor: &TextureDescriptor) -> Result<TextureHandle, RenderError>;

    fn free(&mut self, texture: TextureHandle);

    /// Clears `texture` and draws `window` into it so that the top-left
    /// corner of `source` lands on texel (0, 0).
    fn rasterize(
        &mut self,
        window: WindowId,
        texture: &TextureHandle,
        source: &Rect,
    ) -> Result<(), RenderError>;
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
}

unsafe impl Zeroable for Vertex2D {}
unsafe impl Pod for Vertex2D {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Four vertices per quad.
    Quads,
    /// Six vertices per quad: top-right, top-left, bottom-left, bottom-left,
    /// bottom-right, top-right.
    Triangles,
}

impl Primitive {
    pub fn vertices_per_quad(self) -> usize {
        match self {
            Primitive::Quads => 4,
            Primitive::Triangles => 6,
        }
    }
}

/// One textured mesh draw.
///
/// Backends blend with premultiplied alpha (`ONE, ONE_MINUS_SRC_ALPHA`) and
/// restrict output to `scissor` when set.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub window: WindowId,
    pub primitive: Primitive,
    pub vertices: &'a [Vertex2D],
    pub texture: TextureHandle,
    /// Column-major.
    pub model_view_projection: [[f32; 4]; 4],
    pub scissor: Option<Rect>,
    pub generate_mipmaps: bool,
}

impl DrawCall<'_> {
    /// Vertex data as uploaded to a GPU buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }
}

pub trait DrawBackend {
    /// Whether quads can be drawn directly; otherwise they are split into
    /// triangles.
    fn supports_quads(&self) -> bool {
        false
    }

    fn draw(&mut self, call: DrawCall<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_textures_flip_v() {
        let handle = TextureHandle {
            id: 1,
            width: 10,
            height: 10,
            y_inverted: true,
        };
        assert_eq!(handle.matrix().apply(0.25, 0.0), [0.25, 1.0]);
        assert_eq!(handle.matrix().apply(0.25, 1.0), [0.25, 0.0]);

        let upright = TextureHandle {
            y_inverted: false,
            ..handle
        };
        assert_eq!(upright.matrix().apply(0.25, 0.75), [0.25, 0.75]);
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex2D>(), 16);
        let vertices = [Vertex2D::default(); 3];
        let call = DrawCall {
            window: WindowId(1),
            primitive: Primitive::Triangles,
            vertices: &vertices,
            texture: TextureHandle {
                id: 0,
                width: 1,
                height: 1,
                y_inverted: false,
            },
            model_view_projection: [[0.0; 4]; 4],
            scissor: None,
            generate_mipmaps: true,
        };
        assert_eq!(call.vertex_bytes().len(), 48);
    }
}
