/// Texture resource.
///
/// Image bytes are decoded with the `image` crate (format detected from the
/// content, not the extension) into RGBA8. The decoded pixels are kept on the
/// CPU side only while at least one data reference is held; otherwise they
/// are dropped once the texture is loaded.
///
/// Each texture owns a backend handle allocated from the renderer when the
/// resource is created and released when it is evicted.

use std::any::Any;
use std::sync::Arc;
use bitflags::bitflags;
use crate::error::{Error, Result};
use crate::renderer::{Renderer, TextureHandle};
use crate::resource::{Resource, ResourceKey, ResourceManager, ResourcePath, ResourceType};

bitflags! {
    /// Sampling and color-space flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureFlags: u32 {
        const U_CLAMP         = 1 << 0;
        const V_CLAMP         = 1 << 1;
        const W_CLAMP         = 1 << 2;
        const MIN_POINT       = 1 << 3;
        const MIN_ANISOTROPIC = 1 << 4;
        const MAG_POINT       = 1 << 5;
        const MAG_ANISOTROPIC = 1 << 6;
        const SRGB            = 1 << 7;
    }
}

/// No atlas
pub const NO_ATLAS: i32 = -1;

pub struct Texture {
    key: ResourceKey,
    path: ResourcePath,
    renderer: Arc<Renderer>,
    handle: TextureHandle,
    flags: TextureFlags,
    atlas_size: i32,
    data_reference_count: u32,
    width: u32,
    height: u32,
    data: Option<Vec<u8>>,
}

impl Texture {
    pub fn new(key: ResourceKey, path: ResourcePath, renderer: Arc<Renderer>) -> Self {
        let handle = renderer.create_texture_handle();
        Self {
            key,
            path,
            renderer,
            handle,
            flags: TextureFlags::empty(),
            atlas_size: NO_ATLAS,
            data_reference_count: 0,
            width: 0,
            height: 0,
            data: None,
        }
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn texture_handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn flags(&self) -> TextureFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: TextureFlags) {
        self.flags = flags;
    }

    pub fn set_flag(&mut self, flag: TextureFlags, enabled: bool) {
        self.flags.set(flag, enabled);
    }

    /// Atlas size in tiles per side, or [`NO_ATLAS`]
    pub fn atlas_size(&self) -> i32 {
        self.atlas_size
    }

    pub fn set_atlas_size(&mut self, atlas_size: i32) {
        self.atlas_size = atlas_size;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Keep decoded pixels after the next load
    pub fn add_data_reference(&mut self) {
        self.data_reference_count += 1;
    }

    /// Release a data reference; pixels are dropped with the last one
    pub fn remove_data_reference(&mut self) {
        if self.data_reference_count == 0 {
            crate::engine_warn!("nebula3d::Texture", "Unbalanced data reference release on {}", self.path);
            return;
        }
        self.data_reference_count -= 1;
        if self.data_reference_count == 0 {
            self.data = None;
        }
    }

    pub fn data_reference_count(&self) -> u32 {
        self.data_reference_count
    }

    /// Retained RGBA8 pixels
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl Resource for Texture {
    fn resource_type(&self) -> ResourceType {
        ResourceType::TEXTURE
    }

    fn load(&mut self, _rm: &mut ResourceManager, data: &[u8]) -> Result<()> {
        let image = image::load_from_memory(data).map_err(|e| Error::Decode {
            path: self.path.to_string(),
            message: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        self.width = rgba.width();
        self.height = rgba.height();
        self.data = (self.data_reference_count > 0).then(|| rgba.into_raw());

        crate::engine_debug!(
            "nebula3d::Texture",
            "Loaded {} ({}x{}, flags {:?})",
            self.path,
            self.width,
            self.height,
            self.flags
        );
        Ok(())
    }

    fn unload(&mut self, _rm: &mut ResourceManager) {
        self.width = 0;
        self.height = 0;
        self.data = None;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.renderer.destroy_texture_handle(self.handle);
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
