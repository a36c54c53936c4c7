use magiclamp::{make_grid, Rect, WindowGeometry, WindowId, WindowQuad};

use crate::backend::{DrawBackend, DrawCall, Primitive, TextureHandle, TextureMatrix, Vertex2D};

const FAR_PLANE: f32 = 65535.0;

/// Writes the vertices of `quads` into `out` (cleared first).
pub fn upload_quads(
    primitive: Primitive,
    quads: &[WindowQuad],
    matrix: &TextureMatrix,
    out: &mut Vec<Vertex2D>,
) {
    out.clear();
    out.reserve(quads.len() * primitive.vertices_per_quad());

    for quad in quads {
        let v: [Vertex2D; 4] = std::array::from_fn(|corner| {
            let vertex = quad[corner];
            Vertex2D {
                position: [vertex.x as f32, vertex.y as f32],
                texcoord: matrix.apply(vertex.u as f32, vertex.v as f32),
            }
        });
        match primitive {
            Primitive::Quads => out.extend_from_slice(&v),
            Primitive::Triangles => out.extend_from_slice(&[v[1], v[0], v[3], v[3], v[2], v[1]]),
        }
    }
}

/// Column-major orthographic projection over the virtual screen (y down),
/// translated to `origin`.
pub fn orthographic(screen: &Rect, origin: (i32, i32)) -> [[f32; 4]; 4] {
    let width = screen.width.max(1) as f32;
    let height = screen.height.max(1) as f32;
    let (tx, ty) = (origin.0 as f32, origin.1 as f32);
    [
        [2.0 / width, 0.0, 0.0, 0.0],
        [0.0, -2.0 / height, 0.0, 0.0],
        [0.0, 0.0, -2.0 / FAR_PLANE, 0.0],
        [2.0 * tx / width - 1.0, 1.0 - 2.0 * ty / height, -1.0, 1.0],
    ]
}

/// Turns warped window meshes into draw calls.
pub struct WindowMeshRenderer<D> {
    backend: D,
    grid_resolution: u32,
    vertices: Vec<Vertex2D>,
}

impl<D: DrawBackend> WindowMeshRenderer<D> {
    pub fn new(backend: D, grid_resolution: u32) -> Self {
        Self {
            backend,
            grid_resolution: grid_resolution.max(1),
            vertices: Vec::new(),
        }
    }

    pub fn backend(&self) -> &D {
        &self.backend
    }

    pub fn grid_resolution(&self) -> u32 {
        self.grid_resolution
    }

    pub fn set_grid_resolution(&mut self, resolution: u32) {
        self.grid_resolution = resolution.max(1);
    }

    pub fn make_grid(&self, geometry: &WindowGeometry) -> Vec<WindowQuad> {
        make_grid(&geometry.frame, &geometry.expanded, self.grid_resolution)
    }

    /// Draws `quads`, given relative to `frame`, with the window's offscreen
    /// texture.
    pub fn render(
        &mut self,
        window: WindowId,
        frame: &Rect,
        virtual_screen: &Rect,
        quads: &[WindowQuad],
        texture: &TextureHandle,
        clip: Option<Rect>,
    ) {
        let primitive = if self.backend.supports_quads() {
            Primitive::Quads
        } else {
            Primitive::Triangles
        };
        upload_quads(primitive, quads, &texture.matrix(), &mut self.vertices);

        self.backend.draw(DrawCall {
            window,
            primitive,
            vertices: &self.vertices,
            texture: *texture,
            model_view_projection: orthographic(virtual_screen, (frame.x, frame.y)),
            scissor: clip,
            generate_mipmaps: true,
        });
    }
}
