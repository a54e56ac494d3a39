//! Resource management module
//!
//! Provides the shared resource lifecycle (reference counting, asynchronous
//! loading, dependency tracking) and the built-in shader, texture and
//! material resource types.

mod resource;
mod path;
pub(crate) mod loader;
mod resource_manager;
pub mod shader;
pub mod texture;
pub mod material;
pub mod material_document;

pub use resource::{
    Resource, ResourceFactory, ResourceKey, ResourceState, ResourceType, StateCallback,
};
pub use path::ResourcePath;
pub use resource_manager::{
    ResourceManager, ResourceManagerConfig, TypedManager, DEFAULT_SHADER_PATH,
};
pub use shader::{
    Shader, ShaderInstance, ShaderTextureSlot, ShaderUniform, UniformType,
    uniform_hash, DEFAULT_SHADER_SOURCE,
};
pub use texture::{Texture, TextureFlags, NO_ATLAS};
pub use material::{Material, MaterialUniform, UniformValue, MAX_TEXTURE_COUNT};
pub use material_document::{
    MaterialDocument, TextureEntry, TextureFilter, UniformEntry, UniformEntryValue,
};

#[cfg(test)]
pub(crate) mod test_utils;
