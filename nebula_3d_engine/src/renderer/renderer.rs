/// Renderer registry - names and handles shared by shaders, textures and materials
///
/// Submitting work to a GPU is outside this crate. What the resource layer
/// needs from the renderer is a small set of registries:
///
/// - the shader define name table (fixed at construction, read-only after)
/// - uniform handles interned by name
/// - texture handles allocated per texture resource
/// - the well-known material color/shininess uniform

use std::sync::{Mutex, PoisonError};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::utils::SlotAllocator;

/// Maximum number of shader defines (one bit each in a define mask)
pub const MAX_SHADER_DEFINES: usize = 32;

/// Name of the uniform receiving `[r, g, b, shininess]` for every material
pub const MATERIAL_COLOR_SHININESS_UNIFORM: &str = "u_materialColorShininess";

// ============================================================================
// Handles
// ============================================================================

/// Interned uniform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformHandle(pub u16);

impl UniformHandle {
    /// Handle returned once the uniform table is full
    pub const INVALID: UniformHandle = UniformHandle(u16::MAX);

    /// Whether this handle refers to an interned uniform
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Backend texture identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Handle bound for an empty texture slot
    pub const INVALID: TextureHandle = TextureHandle(u32::MAX);

    /// Whether this handle refers to a texture
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// Renderer creation descriptor
#[derive(Debug, Clone, Default)]
pub struct RendererDesc {
    /// Shader define names; the position of a name is its define index
    pub shader_defines: Vec<String>,
}

// ============================================================================
// Renderer
// ============================================================================

/// Renderer registry
///
/// Shared as `Arc<Renderer>` between the engine, the resource manager and
/// texture resources. Lookups on the define table take `&self` and never lock.
pub struct Renderer {
    shader_defines: Vec<String>,
    uniforms: Mutex<FxHashMap<String, UniformHandle>>,
    textures: Mutex<SlotAllocator>,
    material_color_shininess: UniformHandle,
}

impl Renderer {
    /// Create a renderer registry from a descriptor
    ///
    /// # Errors
    ///
    /// Fails if more than [`MAX_SHADER_DEFINES`] names are given, or if a
    /// name is empty or duplicated.
    pub fn new(desc: RendererDesc) -> Result<Self> {
        if desc.shader_defines.len() > MAX_SHADER_DEFINES {
            return Err(Error::InitializationFailed(format!(
                "{} shader defines requested, at most {} are supported",
                desc.shader_defines.len(),
                MAX_SHADER_DEFINES
            )));
        }
        for (i, name) in desc.shader_defines.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::InitializationFailed(format!("Shader define {} has an empty name", i)));
            }
            if desc.shader_defines[..i].contains(name) {
                return Err(Error::InitializationFailed(format!("Shader define '{}' declared twice", name)));
            }
        }

        let mut uniforms = FxHashMap::default();
        let material_color_shininess = UniformHandle(0);
        uniforms.insert(MATERIAL_COLOR_SHININESS_UNIFORM.to_string(), material_color_shininess);

        crate::engine_debug!(
            "nebula3d::Renderer",
            "Renderer created with {} shader defines",
            desc.shader_defines.len()
        );

        Ok(Self {
            shader_defines: desc.shader_defines,
            uniforms: Mutex::new(uniforms),
            textures: Mutex::new(SlotAllocator::new()),
            material_color_shininess,
        })
    }

    // ===== SHADER DEFINES =====

    /// Name of the define at `idx`
    pub fn shader_define(&self, idx: u8) -> Option<&str> {
        self.shader_defines.get(idx as usize).map(String::as_str)
    }

    /// Index of the define called `name`
    pub fn shader_define_index(&self, name: &str) -> Option<u8> {
        self.shader_defines
            .iter()
            .position(|define| define == name)
            .map(|idx| idx as u8)
    }

    /// Number of registered defines
    pub fn shader_define_count(&self) -> usize {
        self.shader_defines.len()
    }

    // ===== UNIFORMS =====

    /// Get or create the handle of the uniform called `name`
    pub fn uniform_handle(&self, name: &str) -> UniformHandle {
        let mut uniforms = self.uniforms.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = uniforms.get(name) {
            return *handle;
        }
        match u16::try_from(uniforms.len()).ok().filter(|&id| id != u16::MAX) {
            Some(id) => {
                let handle = UniformHandle(id);
                uniforms.insert(name.to_string(), handle);
                handle
            }
            None => {
                crate::engine_error!(
                    "nebula3d::Renderer",
                    "Uniform table full ({} names), cannot intern '{}'",
                    uniforms.len(),
                    name
                );
                UniformHandle::INVALID
            }
        }
    }

    /// Name of an interned uniform
    pub fn uniform_name(&self, handle: UniformHandle) -> Option<String> {
        let uniforms = self.uniforms.lock().unwrap_or_else(PoisonError::into_inner);
        uniforms
            .iter()
            .find(|(_, h)| **h == handle)
            .map(|(name, _)| name.clone())
    }

    /// Uniform receiving `[r, g, b, shininess]` of every material
    pub fn material_color_shininess_uniform(&self) -> UniformHandle {
        self.material_color_shininess
    }

    // ===== TEXTURES =====

    /// Allocate a texture handle
    pub fn create_texture_handle(&self) -> TextureHandle {
        let mut textures = self.textures.lock().unwrap_or_else(PoisonError::into_inner);
        TextureHandle(textures.alloc())
    }

    /// Release a texture handle
    pub fn destroy_texture_handle(&self, handle: TextureHandle) {
        let mut textures = self.textures.lock().unwrap_or_else(PoisonError::into_inner);
        if !textures.free(handle.0) {
            crate::engine_warn!("nebula3d::Renderer", "Texture handle {} released twice", handle.0);
        }
    }

    /// Number of live texture handles
    pub fn texture_handle_count(&self) -> u32 {
        self.textures.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
