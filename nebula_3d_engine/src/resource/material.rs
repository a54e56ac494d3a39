/// Material resource.
///
/// A material binds a shader, up to [`MAX_TEXTURE_COUNT`] textures, a table
/// of uniform values and a few fixed parameters (color, shininess, alpha
/// reference). Once the shader and every texture are READY the material
/// reconciles its uniform table against the shader schema, selects the
/// shader instance for its define mask and generates its command buffer.
///
/// Architecture:
/// - Shader: always set; materials without one use the engine default
///   shader, which is never acquired or released by a material
/// - Texture slots: fixed-size, filled in declaration order; an unbound slot
///   still counts so later slots keep their index
/// - Uniforms: index-aligned with the shader schema after readiness
/// - Command buffer: regenerated whole after every change while READY
///
/// Mutators take the resource manager and are called through
/// [`ResourceManager::modify`]:
///
/// ```ignore
/// rm.modify::<Material, _>(material, |m, rm| m.set_define(rm, 3, true))??;
/// ```

use std::any::Any;
use std::sync::Arc;
use glam::{Mat4, Vec3, Vec4};
use crate::error::{Error, Result};
use crate::renderer::{CommandBufferGenerator, RenderState, TextureHandle};
use crate::resource::material_document::{MaterialDocument, TextureEntry, UniformEntry, UniformEntryValue};
use crate::resource::shader::{uniform_hash, ShaderUniform, UniformType};
use crate::resource::{
    Resource, ResourceKey, ResourceManager, ResourcePath, ResourceType, Shader, ShaderInstance, Texture,
};
use crate::{engine_bail, engine_err};

/// Maximum number of texture slots of a material
pub const MAX_TEXTURE_COUNT: usize = 16;

const DEFAULT_ALPHA_REF: f32 = 0.3;
const DEFAULT_SHININESS: f32 = 4.0;

// ===== UNIFORM VALUES =====

/// Typed uniform value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Color(Vec3),
    /// Resolved to the frame time by the command buffer consumer
    Time,
    Int(i32),
    Matrix4(Mat4),
}

impl UniformValue {
    /// Zero value of a uniform type
    pub fn zero(uniform_type: UniformType) -> Self {
        match uniform_type {
            UniformType::Float => UniformValue::Float(0.0),
            UniformType::Vec3 => UniformValue::Vec3(Vec3::ZERO),
            UniformType::Color => UniformValue::Color(Vec3::ZERO),
            UniformType::Time => UniformValue::Time,
            UniformType::Int => UniformValue::Int(0),
            UniformType::Matrix4 => UniformValue::Matrix4(Mat4::ZERO),
        }
    }

    pub fn uniform_type(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Color(_) => UniformType::Color,
            UniformValue::Time => UniformType::Time,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::Matrix4(_) => UniformType::Matrix4,
        }
    }

    /// Convert to `uniform_type`; vectors and colors convert into each
    /// other, anything else becomes zero
    pub fn coerce(self, uniform_type: UniformType) -> Self {
        match (self, uniform_type) {
            (value, ty) if value.uniform_type() == ty => value,
            (UniformValue::Vec3(v), UniformType::Color) => UniformValue::Color(v),
            (UniformValue::Color(v), UniformType::Vec3) => UniformValue::Vec3(v),
            (UniformValue::Int(v), UniformType::Float) => UniformValue::Float(v as f32),
            (UniformValue::Float(v), UniformType::Int) => UniformValue::Int(v as i32),
            (_, ty) => UniformValue::zero(ty),
        }
    }

    fn as_vec4(&self) -> Vec4 {
        match self {
            UniformValue::Float(v) => Vec4::new(*v, 0.0, 0.0, 0.0),
            UniformValue::Int(v) => Vec4::new(*v as f32, 0.0, 0.0, 0.0),
            UniformValue::Vec3(v) | UniformValue::Color(v) => v.extend(0.0),
            UniformValue::Time | UniformValue::Matrix4(_) => Vec4::ZERO,
        }
    }

    fn from_entry(value: Option<UniformEntryValue>) -> Self {
        match value {
            Some(UniformEntryValue::Float(v)) => UniformValue::Float(v),
            Some(UniformEntryValue::Int(v)) => UniformValue::Int(v),
            Some(UniformEntryValue::Vec3(v)) => UniformValue::Vec3(Vec3::from_array(v)),
            Some(UniformEntryValue::Color(v)) => UniformValue::Color(Vec3::from_array(v)),
            Some(UniformEntryValue::Time) => UniformValue::Time,
            Some(UniformEntryValue::Matrix(m)) => UniformValue::Matrix4(Mat4::from_cols_array(&m)),
            None => UniformValue::Float(0.0),
        }
    }

    fn to_entry(self) -> UniformEntryValue {
        match self {
            UniformValue::Float(v) => UniformEntryValue::Float(v),
            UniformValue::Int(v) => UniformEntryValue::Int(v),
            UniformValue::Vec3(v) => UniformEntryValue::Vec3(v.to_array()),
            UniformValue::Color(v) => UniformEntryValue::Color(v.to_array()),
            UniformValue::Time => UniformEntryValue::Time,
            UniformValue::Matrix4(m) => UniformEntryValue::Matrix(m.to_cols_array()),
        }
    }
}

/// Uniform value bound by a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialUniform {
    pub name_hash: u64,
    pub value: UniformValue,
}

impl MaterialUniform {
    fn zero(schema: &ShaderUniform) -> Self {
        Self {
            name_hash: schema.name_hash,
            value: UniformValue::zero(schema.uniform_type),
        }
    }
}

// ===== MATERIAL =====

pub struct Material {
    key: ResourceKey,
    path: ResourcePath,
    default_shader: ResourceKey,
    shader: ResourceKey,
    textures: [Option<ResourceKey>; MAX_TEXTURE_COUNT],
    /// Slots holding a data reference on their texture
    retained_data: [bool; MAX_TEXTURE_COUNT],
    texture_count: usize,
    uniforms: Vec<MaterialUniform>,
    define_mask: u32,
    render_state: RenderState,
    color: Vec3,
    shininess: f32,
    alpha_ref: f32,
    layer_count: u32,
    shader_instance: Option<Arc<ShaderInstance>>,
    command_buffer: Vec<u8>,
}

impl Material {
    pub fn new(key: ResourceKey, path: ResourcePath, default_shader: ResourceKey) -> Self {
        Self {
            key,
            path,
            default_shader,
            shader: default_shader,
            textures: [None; MAX_TEXTURE_COUNT],
            retained_data: [false; MAX_TEXTURE_COUNT],
            texture_count: 0,
            uniforms: Vec::new(),
            define_mask: 0,
            render_state: RenderState::empty().with_alpha_ref(DEFAULT_ALPHA_REF),
            color: Vec3::ONE,
            shininess: DEFAULT_SHININESS,
            alpha_ref: DEFAULT_ALPHA_REF,
            layer_count: 1,
            shader_instance: None,
            command_buffer: Vec::new(),
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.key, std::mem::take(&mut self.path), self.default_shader);
    }

    // ===== ACCESSORS =====

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Current shader (the default shader when none is set)
    pub fn shader(&self) -> ResourceKey {
        self.shader
    }

    pub fn uses_default_shader(&self) -> bool {
        self.shader == self.default_shader
    }

    pub fn texture(&self, slot: usize) -> Option<ResourceKey> {
        self.textures.get(slot).copied().flatten()
    }

    /// Number of slots in use, unbound slots below the last bound one included
    pub fn texture_count(&self) -> usize {
        self.texture_count
    }

    /// Uniform name of the shader texture slot `slot`
    pub fn texture_uniform<'a>(&self, rm: &'a ResourceManager, slot: usize) -> Option<&'a str> {
        let shader = rm.get::<Shader>(self.shader)?;
        shader.texture_slot(slot).map(|s| s.uniform.as_str())
    }

    /// Texture bound to the slot whose uniform is `uniform`
    pub fn texture_by_uniform(&self, rm: &ResourceManager, uniform: &str) -> Option<ResourceKey> {
        let shader = rm.get::<Shader>(self.shader)?;
        let slot = shader.texture_slots().iter().position(|s| s.uniform == uniform)?;
        self.texture(slot)
    }

    pub fn uniforms(&self) -> &[MaterialUniform] {
        &self.uniforms
    }

    /// Value of the uniform called `name`
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        let hash = uniform_hash(name);
        self.uniforms.iter().find(|u| u.name_hash == hash).map(|u| &u.value)
    }

    pub fn define_mask(&self) -> u32 {
        self.define_mask
    }

    /// Whether the define at `idx` is enabled on this material
    pub fn is_defined(&self, idx: u8) -> bool {
        idx < 32 && self.define_mask & (1 << idx) != 0
    }

    /// Whether the current shader declares the define at `idx`
    pub fn has_define(&self, rm: &ResourceManager, idx: u8) -> bool {
        rm.get::<Shader>(self.shader).is_some_and(|s| s.has_define(idx))
    }

    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn alpha_ref(&self) -> f32 {
        self.alpha_ref
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Instance selected for the current define mask (set once READY)
    pub fn shader_instance(&self) -> Option<&Arc<ShaderInstance>> {
        self.shader_instance.as_ref()
    }

    /// Instance to render with: the selected one, or the default shader's
    /// first instance while the material is not usable
    pub fn effective_instance(&self, rm: &ResourceManager) -> Option<Arc<ShaderInstance>> {
        self.shader_instance
            .clone()
            .or_else(|| rm.get::<Shader>(self.default_shader).map(Shader::first_instance))
    }

    pub fn command_buffer(&self) -> &[u8] {
        &self.command_buffer
    }

    // ===== MUTATORS =====

    /// Bind `texture` to `slot`, taking over the caller's reference
    ///
    /// The previous texture of the slot loses its dependency edge and its
    /// reference. When both exist the new texture inherits the old atlas size.
    pub fn set_texture(&mut self, rm: &mut ResourceManager, slot: usize, texture: Option<ResourceKey>) -> Result<()> {
        if slot >= MAX_TEXTURE_COUNT {
            engine_bail!("nebula3d::Material", "Texture slot {} out of range in {}", slot, self.path);
        }

        let old_texture = self.textures[slot];
        if let (Some(old), Some(new)) = (old_texture, texture) {
            if let Some(atlas_size) = rm.get::<Texture>(old).map(Texture::atlas_size) {
                if let Some(new_texture) = rm.get_mut::<Texture>(new) {
                    new_texture.set_atlas_size(atlas_size);
                }
            }
        }

        if let Some(new) = texture {
            rm.add_dependency(self.key, new)?;
        }
        self.textures[slot] = texture;
        if slot >= self.texture_count {
            self.texture_count = slot + 1;
        }
        if let Some(old) = old_texture {
            self.release_texture(rm, slot, old);
        }

        if rm.is_ready(self.key) {
            self.update_texture_define(rm, slot);
            self.create_command_buffer(rm);
            self.resolve_instance(rm);
        }
        Ok(())
    }

    /// Load the texture at `path` (empty: unbind) and bind it to `slot`
    pub fn set_texture_path(&mut self, rm: &mut ResourceManager, slot: usize, path: &str) -> Result<()> {
        if path.is_empty() {
            return self.set_texture(rm, slot, None);
        }
        let texture = rm.load(ResourceType::TEXTURE, path)?;
        if let Err(error) = self.set_texture(rm, slot, Some(texture)) {
            rm.unload(texture)?;
            return Err(error);
        }
        Ok(())
    }

    /// Use `shader`, taking over the caller's reference; `None` selects the
    /// default shader
    ///
    /// Reconciles immediately when the material stays READY, otherwise when
    /// the new shader becomes READY.
    pub fn set_shader(&mut self, rm: &mut ResourceManager, shader: Option<ResourceKey>) -> Result<()> {
        let new_shader = match shader {
            Some(key) if key == self.default_shader => {
                rm.unload(key)?;
                self.default_shader
            }
            Some(key) => key,
            None => self.default_shader,
        };

        if new_shader != self.default_shader {
            rm.add_dependency(self.key, new_shader)?;
        }
        let old_shader = std::mem::replace(&mut self.shader, new_shader);
        self.shader_instance = None;
        if old_shader != self.default_shader {
            self.release(rm, old_shader);
        }

        if rm.is_ready(self.key) {
            self.on_before_ready(rm);
        }
        Ok(())
    }

    /// Load the shader at `path` (empty: default shader) and use it
    pub fn set_shader_path(&mut self, rm: &mut ResourceManager, path: &str) -> Result<()> {
        if path.is_empty() {
            return self.set_shader(rm, None);
        }
        let shader = rm.load(ResourceType::SHADER, path)?;
        self.set_shader(rm, Some(shader))
    }

    /// Enable or disable the define at `idx`
    ///
    /// The shader instance is re-resolved only when the mask changes on a
    /// READY material.
    pub fn set_define(&mut self, rm: &mut ResourceManager, idx: u8, enabled: bool) -> Result<()> {
        if idx >= 32 {
            engine_bail!("nebula3d::Material", "Define index {} out of range in {}", idx, self.path);
        }
        let old_mask = self.define_mask;
        if enabled {
            self.define_mask |= 1 << idx;
        } else {
            self.define_mask &= !(1 << idx);
        }

        if old_mask != self.define_mask && rm.is_ready(self.key) {
            self.resolve_instance(rm);
            self.create_command_buffer(rm);
        }
        Ok(())
    }

    pub fn set_alpha_ref(&mut self, rm: &mut ResourceManager, alpha_ref: f32) {
        self.alpha_ref = alpha_ref;
        self.render_state = self.render_state.with_alpha_ref(alpha_ref);
        if rm.is_ready(self.key) {
            self.create_command_buffer(rm);
        }
    }

    pub fn set_color(&mut self, rm: &mut ResourceManager, color: Vec3) {
        self.color = color;
        if rm.is_ready(self.key) {
            self.create_command_buffer(rm);
        }
    }

    pub fn set_shininess(&mut self, rm: &mut ResourceManager, shininess: f32) {
        self.shininess = shininess;
        if rm.is_ready(self.key) {
            self.create_command_buffer(rm);
        }
    }

    pub fn set_layer_count(&mut self, layer_count: u32) {
        self.layer_count = layer_count;
    }

    /// Set the value of the uniform called `name`
    ///
    /// On a READY material the value is converted to the schema type.
    pub fn set_uniform(&mut self, rm: &mut ResourceManager, name: &str, value: UniformValue) {
        let name_hash = uniform_hash(name);
        let schema_type = rm
            .get::<Shader>(self.shader)
            .and_then(|s| s.uniforms().iter().find(|u| u.name_hash == name_hash).map(|u| u.uniform_type));
        let value = match schema_type {
            Some(ty) if rm.is_ready(self.key) => value.coerce(ty),
            _ => value,
        };

        match self.uniforms.iter_mut().find(|u| u.name_hash == name_hash) {
            Some(uniform) => uniform.value = value,
            None => self.uniforms.push(MaterialUniform { name_hash, value }),
        }
        if rm.is_ready(self.key) {
            self.create_command_buffer(rm);
        }
    }

    // ===== DERIVED STATE =====

    fn update_texture_define(&mut self, rm: &ResourceManager, slot: usize) {
        let define_idx = rm
            .get::<Shader>(self.shader)
            .and_then(|s| s.texture_slot(slot))
            .and_then(|s| s.define_idx);
        if let Some(idx) = define_idx {
            if self.textures[slot].is_some() {
                self.define_mask |= 1 << idx;
            } else {
                self.define_mask &= !(1 << idx);
            }
        }
    }

    fn resolve_instance(&mut self, rm: &ResourceManager) {
        self.shader_instance = rm
            .get::<Shader>(self.shader)
            .map(|shader| shader.get_instance(self.define_mask));
    }

    /// Align `uniforms` with the shader schema: for each schema entry, move
    /// the matching uniform into place or insert a zero value
    fn reconcile_uniforms(&mut self, shader: &Shader) {
        for (i, schema) in shader.uniforms().iter().enumerate() {
            match self.uniforms[i..].iter().position(|u| u.name_hash == schema.name_hash) {
                Some(offset) => {
                    self.uniforms.swap(i, i + offset);
                    let value = self.uniforms[i].value;
                    if value.uniform_type() != schema.uniform_type {
                        crate::engine_warn!(
                            "nebula3d::Material",
                            "Uniform {} of {} is {:?}, shader expects {:?}",
                            schema.name,
                            self.path,
                            value.uniform_type(),
                            schema.uniform_type
                        );
                        self.uniforms[i].value = value.coerce(schema.uniform_type);
                    }
                }
                None => self.uniforms.insert(i, MaterialUniform::zero(schema)),
            }
        }
    }

    fn create_command_buffer(&mut self, rm: &ResourceManager) {
        let Some(shader) = rm.get::<Shader>(self.shader) else {
            self.command_buffer.clear();
            return;
        };

        let mut generator = CommandBufferGenerator::new();
        for (uniform, schema) in self.uniforms.iter().zip(shader.uniforms()) {
            match schema.uniform_type {
                UniformType::Time => generator.set_time_uniform(schema.handle),
                UniformType::Matrix4 => match uniform.value {
                    UniformValue::Matrix4(m) => generator.set_uniform_matrix(schema.handle, &m),
                    _ => generator.set_uniform_matrix(schema.handle, &Mat4::ZERO),
                },
                _ => generator.set_uniform(schema.handle, uniform.value.as_vec4()),
            }
        }

        for (slot, schema) in shader.texture_slots().iter().enumerate() {
            let handle = self.texture(slot)
                .and_then(|key| rm.get::<Texture>(key))
                .map_or(TextureHandle::INVALID, Texture::texture_handle);
            generator.set_texture(slot as u8, schema.uniform_handle, handle);
        }

        generator.set_uniform(
            rm.renderer().material_color_shininess_uniform(),
            self.color.extend(self.shininess),
        );
        generator.end();

        let mut buffer = vec![0u8; generator.size()];
        match generator.data(&mut buffer) {
            Ok(()) => self.command_buffer = buffer,
            Err(error) => {
                crate::engine_error!("nebula3d::Material", "Command buffer of {}: {}", self.path, error);
                self.command_buffer.clear();
            }
        }
    }

    // ===== LOAD HELPERS =====

    fn apply_document(&mut self, rm: &mut ResourceManager, document: MaterialDocument) -> Result<()> {
        let Some(shader_path) = document.shader else {
            crate::engine_error!("nebula3d::Material", "Material {} has no shader", self.path);
            return Err(Error::MissingShader(self.path.to_string()));
        };
        if document.textures.len() > MAX_TEXTURE_COUNT {
            return Err(Error::malformed(
                self.path.as_str(),
                format!("{} textures, at most {} are supported", document.textures.len(), MAX_TEXTURE_COUNT),
            ));
        }

        for (slot, entry) in document.textures.iter().enumerate() {
            self.texture_count = slot + 1;
            if entry.source.is_empty() {
                continue;
            }
            let texture_path = self.path.resolve(&entry.source);
            let texture = rm.load(ResourceType::TEXTURE, texture_path.as_str())?;
            self.textures[slot] = Some(texture);
            for filter in entry.unknown_filters() {
                crate::engine_error!(
                    "nebula3d::Material",
                    "Unknown texture filter {} for {} in {}",
                    filter,
                    texture_path,
                    self.path
                );
            }
            let mut needs_pixels = false;
            if let Some(t) = rm.get_mut::<Texture>(texture) {
                t.set_flags(entry.flags());
                if let Some(atlas_size) = entry.atlas_size {
                    t.set_atlas_size(atlas_size);
                }
                if entry.keep_data {
                    t.add_data_reference();
                    self.retained_data[slot] = true;
                    needs_pixels = t.data_reference_count() == 1;
                }
            }
            // Pixels of an already decoded texture were dropped
            if needs_pixels && rm.is_ready(texture) {
                rm.reload(texture)?;
            }
            rm.add_dependency(self.key, texture)?;
        }

        let renderer = rm.renderer().clone();
        for name in &document.defines {
            match renderer.shader_define_index(name) {
                Some(idx) => self.define_mask |= 1 << idx,
                None => crate::engine_warn!("nebula3d::Material", "Unknown define {} in {}", name, self.path),
            }
        }

        for entry in &document.uniforms {
            for field in &entry.unknown_fields {
                crate::engine_warn!(
                    "nebula3d::Material",
                    "Unknown parameter {} in uniform {} of {}",
                    field,
                    entry.name,
                    self.path
                );
            }
            self.uniforms.push(MaterialUniform {
                name_hash: uniform_hash(&entry.name),
                value: UniformValue::from_entry(entry.value),
            });
        }

        if let Some(color) = document.color {
            self.color = Vec3::from_array(color);
        }
        if let Some(shininess) = document.shininess {
            self.shininess = shininess;
        }
        if let Some(alpha_ref) = document.alpha_ref {
            self.alpha_ref = alpha_ref;
        }
        if let Some(layer_count) = document.layer_count {
            self.layer_count = layer_count;
        }
        self.render_state = self.render_state.with_alpha_ref(self.alpha_ref);

        let shader_path = ResourcePath::new(&shader_path);
        if rm.path(self.default_shader) != Some(&shader_path) {
            let shader = rm.load(ResourceType::SHADER, shader_path.as_str())?;
            self.shader = shader;
            rm.add_dependency(self.key, shader)?;
        }
        Ok(())
    }

    fn release_texture(&mut self, rm: &mut ResourceManager, slot: usize, texture: ResourceKey) {
        if std::mem::take(&mut self.retained_data[slot]) {
            if let Some(t) = rm.get_mut::<Texture>(texture) {
                t.remove_data_reference();
            }
        }
        self.release(rm, texture);
    }

    /// Drop the dependency edge and the reference on `dependency`
    fn release(&self, rm: &mut ResourceManager, dependency: ResourceKey) {
        if let Err(error) = rm.remove_dependency(self.key, dependency) {
            crate::engine_warn!("nebula3d::Material", "{}: {}", self.path, error);
        }
        if let Err(error) = rm.unload(dependency) {
            crate::engine_warn!("nebula3d::Material", "{}: {}", self.path, error);
        }
    }

    /// Release every acquired dependency and return to defaults
    fn release_all(&mut self, rm: &mut ResourceManager) {
        for slot in 0..MAX_TEXTURE_COUNT {
            if let Some(texture) = self.textures[slot].take() {
                self.release_texture(rm, slot, texture);
            }
        }
        if self.shader != self.default_shader {
            self.release(rm, self.shader);
        }
        self.reset();
    }

    // ===== SAVE =====

    /// Serialize to a material document
    ///
    /// # Errors
    ///
    /// Fails if the material is not READY.
    pub fn save(&self, rm: &ResourceManager) -> Result<String> {
        if !rm.is_ready(self.key) {
            engine_bail!("nebula3d::Material", "Cannot save {}: material is not ready", self.path);
        }
        let shader = rm.get::<Shader>(self.shader)
            .ok_or_else(|| engine_err!("nebula3d::Material", "Shader of {} is missing", self.path))?;

        let textures = (0..self.texture_count)
            .map(|slot| {
                let texture = self.texture(slot).and_then(|key| rm.get::<Texture>(key));
                match texture {
                    Some(t) => TextureEntry::bound(
                        format!("/{}", t.path()),
                        t.flags(),
                        t.atlas_size(),
                        self.retained_data[slot],
                    ),
                    None => TextureEntry::default(),
                }
            })
            .collect();

        let renderer = rm.renderer();
        let defines = (0..32u8)
            .filter(|idx| self.is_defined(*idx))
            .filter_map(|idx| renderer.shader_define(idx).map(str::to_string))
            .collect();

        let uniforms = shader.uniforms()
            .iter()
            .zip(&self.uniforms)
            .map(|(schema, uniform)| UniformEntry::new(schema.name.clone(), uniform.value.to_entry()))
            .collect();

        let document = MaterialDocument {
            shader: Some(shader.path().to_string()),
            layer_count: (self.layer_count != 1).then_some(self.layer_count),
            textures,
            defines,
            uniforms,
            shininess: Some(self.shininess),
            alpha_ref: Some(self.alpha_ref),
            color: Some(self.color.to_array()),
            unknown_fields: Vec::new(),
        };
        document.to_json()
    }
}

impl Resource for Material {
    fn resource_type(&self) -> ResourceType {
        ResourceType::MATERIAL
    }

    fn load(&mut self, rm: &mut ResourceManager, data: &[u8]) -> Result<()> {
        let document = MaterialDocument::parse(&self.path, data)?;
        for field in &document.unknown_fields {
            crate::engine_warn!("nebula3d::Material", "Unknown parameter {} in material {}", field, self.path);
        }

        if let Err(error) = self.apply_document(rm, document) {
            self.release_all(rm);
            return Err(error);
        }
        Ok(())
    }

    fn unload(&mut self, rm: &mut ResourceManager) {
        self.release_all(rm);
    }

    fn on_before_ready(&mut self, rm: &mut ResourceManager) {
        let Some(shader) = rm.get::<Shader>(self.shader) else { return };

        self.reconcile_uniforms(shader);
        self.render_state = shader.render_states().with_alpha_ref(self.alpha_ref);
        for (slot, schema) in shader.texture_slots().iter().enumerate() {
            if let Some(idx) = schema.define_idx {
                if self.texture(slot).is_some() {
                    self.define_mask |= 1 << idx;
                } else {
                    self.define_mask &= !(1 << idx);
                }
            }
        }

        self.create_command_buffer(rm);
        self.resolve_instance(rm);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
