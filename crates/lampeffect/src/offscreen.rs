use std::collections::HashMap;

use magiclamp::{Rect, WindowId};

use crate::backend::{RenderError, TextureBackend, TextureDescriptor, TextureHandle};

/// Number of mip levels for a `width × height` texture, down to 1×1 along
/// the shorter side.
pub fn mip_levels(width: u32, height: u32) -> u32 {
    width.min(height).max(1).ilog2() + 1
}

#[derive(Debug, Clone, Copy)]
struct RenderResources {
    texture: TextureHandle,
    dirty: bool,
}

/// Caches one offscreen texture per animating window and re-renders it only
/// after the window was damaged.
pub struct OffscreenRenderer<T: TextureBackend> {
    backend: T,
    resources: HashMap<WindowId, RenderResources>,
}

impl<T: TextureBackend> OffscreenRenderer<T> {
    pub fn new(backend: T) -> Self {
        Self {
            backend,
            resources: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &T {
        &self.backend
    }

    pub fn is_registered(&self, window: WindowId) -> bool {
        self.resources.contains_key(&window)
    }

    pub fn registered_windows(&self) -> usize {
        self.resources.len()
    }

    /// Allocates a render target sized to `expanded`. Registering twice is a
    /// no-op. Returns whether the window is registered afterwards.
    pub fn register_window(&mut self, window: WindowId, expanded: &Rect) -> bool {
        if self.resources.contains_key(&window) {
            return true;
        }
        match self.allocate(expanded) {
            Ok(resources) => {
                self.resources.insert(window, resources);
                true
            }
            Err(err) => {
                tracing::warn!(?window, error = %err, "failed to allocate offscreen texture");
                false
            }
        }
    }

    pub fn unregister_window(&mut self, window: WindowId) {
        if let Some(resources) = self.resources.remove(&window) {
            self.backend.free(resources.texture);
        }
    }

    pub fn unregister_all(&mut self) {
        for (_, resources) in self.resources.drain() {
            self.backend.free(resources.texture);
        }
    }

    /// Returns the window's texture, rendering it first if it is stale.
    /// Unregistered windows yield `Ok(None)`.
    pub fn render(
        &mut self,
        window: WindowId,
        expanded: &Rect,
    ) -> Result<Option<TextureHandle>, RenderError> {
        let Some(resources) = self.resources.get_mut(&window) else {
            return Ok(None);
        };
        if resources.dirty {
            self.backend.rasterize(window, &resources.texture, expanded)?;
            resources.dirty = false;
        }
        Ok(Some(resources.texture))
    }

    /// Reallocates the render target after a resize. The window is dropped
    /// when the new allocation fails.
    pub fn on_geometry_changed(&mut self, window: WindowId, expanded: &Rect) {
        let Some(old) = self.resources.remove(&window) else {
            return;
        };
        self.backend.free(old.texture);
        match self.allocate(expanded) {
            Ok(resources) => {
                self.resources.insert(window, resources);
            }
            Err(err) => {
                tracing::warn!(?window, error = %err, "dropping offscreen texture after resize");
            }
        }
    }

    pub fn on_damaged(&mut self, window: WindowId) {
        if let Some(resources) = self.resources.get_mut(&window) {
            resources.dirty = true;
        }
    }

    fn allocate(&mut self, expanded: &Rect) -> Result<RenderResources, RenderError> {
        if !expanded.is_valid() {
            return Err(RenderError::EmptyTarget {
                width: expanded.width,
                height: expanded.height,
            });
        }
        let width = expanded.width as u32;
        let height = expanded.height as u32;
        let descriptor = TextureDescriptor {
            width,
            height,
            mip_levels: mip_levels(width, height),
        };
        let texture = self.backend.allocate(&descriptor)?;
        tracing::trace!(?descriptor, id = texture.id, "allocated offscreen texture");
        Ok(RenderResources {
            texture,
            dirty: true,
        })
    }
}

impl<T: TextureBackend> Drop for OffscreenRenderer<T> {
    fn drop(&mut self) {
        self.unregister_all();
    }
}
