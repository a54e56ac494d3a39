/// Shader resource and its define-mask instances.
///
/// Shader compilation is a backend concern; a shader resource here is the
/// schema materials bind against:
/// - base render states
/// - the defines the shader understands
/// - texture slots, each optionally toggling a define when bound
/// - the ordered uniform schema
///
/// Specialized variants (`ShaderInstance`) are created lazily per define
/// mask and live as long as the shader is loaded.
///
/// Shader document format (JSON):
///
/// ```text
/// {
///   "render_states": ["cull_ccw", "depth_test", "depth_write"],
///   "defines": ["NORMAL_MAPPING"],
///   "texture_slots": [ { "name": "Normal", "uniform": "u_texNormal", "define": "NORMAL_MAPPING" } ],
///   "uniforms": [ { "name": "u_roughness", "type": "float" } ]
/// }
/// ```

use std::any::Any;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;
use crate::error::{Error, Result};
use crate::renderer::{RenderState, UniformHandle};
use crate::resource::material::MAX_TEXTURE_COUNT;
use crate::resource::{Resource, ResourceKey, ResourceManager, ResourcePath, ResourceType};

/// Built-in fallback shader used by materials without a shader of their own
pub const DEFAULT_SHADER_SOURCE: &str = r#"{
    "render_states": ["cull_ccw", "depth_test", "depth_write"],
    "texture_slots": [ { "name": "Albedo", "uniform": "u_texColor" } ]
}"#;

/// Hash identifying a uniform by name
pub fn uniform_hash(name: &str) -> u64 {
    xxh3_64(name.as_bytes())
}

// ===== SCHEMA =====

/// Type of a shader uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniformType {
    Float,
    Vec3,
    Color,
    Time,
    Int,
    Matrix4,
}

/// Uniform declared by a shader
#[derive(Debug, Clone)]
pub struct ShaderUniform {
    pub name: String,
    pub name_hash: u64,
    pub uniform_type: UniformType,
    pub handle: UniformHandle,
}

/// Texture slot declared by a shader
#[derive(Debug, Clone)]
pub struct ShaderTextureSlot {
    pub name: String,
    pub uniform: String,
    pub uniform_handle: UniformHandle,
    /// Define set while a texture is bound to this slot
    pub define_idx: Option<u8>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ShaderDocument {
    #[serde(default)]
    render_states: Vec<String>,
    #[serde(default)]
    defines: Vec<String>,
    #[serde(default)]
    texture_slots: Vec<TextureSlotDocument>,
    #[serde(default)]
    uniforms: Vec<UniformDocument>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TextureSlotDocument {
    name: String,
    uniform: String,
    #[serde(default)]
    define: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UniformDocument {
    name: String,
    #[serde(rename = "type")]
    uniform_type: UniformType,
}

// ===== INSTANCE =====

/// Shader variant specialized for one define mask
#[derive(Debug, PartialEq, Eq)]
pub struct ShaderInstance {
    define_mask: u32,
    index: usize,
}

impl ShaderInstance {
    pub fn define_mask(&self) -> u32 {
        self.define_mask
    }

    /// Creation order inside the owning shader
    pub fn index(&self) -> usize {
        self.index
    }
}

// ===== SHADER =====

pub struct Shader {
    key: ResourceKey,
    path: ResourcePath,
    render_states: RenderState,
    define_mask: u32,
    texture_slots: Vec<ShaderTextureSlot>,
    uniforms: Vec<ShaderUniform>,
    instances: Mutex<Vec<Arc<ShaderInstance>>>,
    resolve_count: AtomicU32,
}

impl Shader {
    pub fn new(key: ResourceKey, path: ResourcePath) -> Self {
        Self {
            key,
            path,
            render_states: RenderState::empty(),
            define_mask: 0,
            texture_slots: Vec::new(),
            uniforms: Vec::new(),
            instances: Mutex::new(Vec::new()),
            resolve_count: AtomicU32::new(0),
        }
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Base render states, without the alpha reference
    pub fn render_states(&self) -> RenderState {
        self.render_states
    }

    /// Whether the shader declares the define at `idx`
    pub fn has_define(&self, idx: u8) -> bool {
        idx < 32 && self.define_mask & (1 << idx) != 0
    }

    pub fn define_mask(&self) -> u32 {
        self.define_mask
    }

    pub fn uniforms(&self) -> &[ShaderUniform] {
        &self.uniforms
    }

    pub fn uniform(&self, index: usize) -> Option<&ShaderUniform> {
        self.uniforms.get(index)
    }

    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    pub fn texture_slots(&self) -> &[ShaderTextureSlot] {
        &self.texture_slots
    }

    pub fn texture_slot(&self, index: usize) -> Option<&ShaderTextureSlot> {
        self.texture_slots.get(index)
    }

    pub fn texture_slot_count(&self) -> usize {
        self.texture_slots.len()
    }

    /// Instance for `define_mask`, created on first request
    pub fn get_instance(&self, define_mask: u32) -> Arc<ShaderInstance> {
        self.resolve_count.fetch_add(1, Ordering::Relaxed);
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = instances.iter().find(|i| i.define_mask == define_mask) {
            return instance.clone();
        }
        let instance = Arc::new(ShaderInstance {
            define_mask,
            index: instances.len(),
        });
        instances.push(instance.clone());
        crate::engine_trace!(
            "nebula3d::Shader",
            "Created instance {:#x} of {}",
            define_mask,
            self.path
        );
        instance
    }

    /// Oldest instance, creating the mask-0 instance if none exists
    pub fn first_instance(&self) -> Arc<ShaderInstance> {
        {
            let instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(first) = instances.first() {
                return first.clone();
            }
        }
        self.get_instance(0)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of `get_instance` calls so far
    pub fn resolve_count(&self) -> u32 {
        self.resolve_count.load(Ordering::Relaxed)
    }

    fn malformed(&self, reason: impl ToString) -> Error {
        Error::malformed(self.path.as_str(), reason)
    }
}

impl Resource for Shader {
    fn resource_type(&self) -> ResourceType {
        ResourceType::SHADER
    }

    fn load(&mut self, rm: &mut ResourceManager, data: &[u8]) -> Result<()> {
        let document: ShaderDocument = serde_json::from_slice(data).map_err(|e| self.malformed(e))?;
        let renderer = rm.renderer().clone();

        let mut render_states = RenderState::empty();
        for name in &document.render_states {
            render_states |= RenderState::from_state_name(name)
                .ok_or_else(|| self.malformed(format!("unknown render state '{}'", name)))?;
        }

        let define_index = |name: &str| {
            renderer
                .shader_define_index(name)
                .ok_or_else(|| self.malformed(format!("unknown define '{}'", name)))
        };

        let mut define_mask = 0u32;
        for name in &document.defines {
            define_mask |= 1 << define_index(name)?;
        }

        if document.texture_slots.len() > MAX_TEXTURE_COUNT {
            return Err(self.malformed(format!(
                "{} texture slots declared, at most {} are supported",
                document.texture_slots.len(),
                MAX_TEXTURE_COUNT
            )));
        }
        let mut texture_slots = Vec::with_capacity(document.texture_slots.len());
        for slot in document.texture_slots {
            let define_idx = match &slot.define {
                Some(name) => {
                    let idx = define_index(name)?;
                    define_mask |= 1 << idx;
                    Some(idx)
                }
                None => None,
            };
            texture_slots.push(ShaderTextureSlot {
                uniform_handle: renderer.uniform_handle(&slot.uniform),
                name: slot.name,
                uniform: slot.uniform,
                define_idx,
            });
        }

        let uniforms: Vec<ShaderUniform> = document.uniforms
            .into_iter()
            .map(|uniform| ShaderUniform {
                name_hash: uniform_hash(&uniform.name),
                handle: renderer.uniform_handle(&uniform.name),
                uniform_type: uniform.uniform_type,
                name: uniform.name,
            })
            .collect();

        crate::engine_debug!(
            "nebula3d::Shader",
            "Loaded {}: {} uniforms, {} texture slots",
            self.path,
            uniforms.len(),
            texture_slots.len()
        );

        self.render_states = render_states;
        self.define_mask = define_mask;
        self.texture_slots = texture_slots;
        self.uniforms = uniforms;
        Ok(())
    }

    fn unload(&mut self, _rm: &mut ResourceManager) {
        self.render_states = RenderState::empty();
        self.define_mask = 0;
        self.texture_slots.clear();
        self.uniforms.clear();
        self.instances.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
