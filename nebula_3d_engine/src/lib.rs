/*!
# Nebula 3D Engine

Resource lifecycle and dependency management for the Nebula 3D engine.

Resources (shaders, textures, materials) are shared by path, reference
counted, read asynchronously and applied on the thread that owns the
resource manager. Materials wait for their shader and textures, then derive
their render state, shader instance and command buffer.

## Architecture

- **Engine**: Singleton owning the renderer and the resource manager
- **Renderer**: Define name table, uniform and texture handle allocation
- **ResourceManager**: Typed caches, loader threads, dependency tracking
- **Shader / Texture / Material**: Built-in resource types
- **FileSystem**: Source of resource bytes (disk or memory)
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod file_system;
pub mod renderer;
pub mod resource;
mod utils;

// Main nebula3d namespace module
pub mod nebula3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Renderer services
    pub use crate::renderer::{Renderer, RendererDesc};

    // File systems
    pub use crate::file_system::{DiskFileSystem, FileSystem, MemoryFileSystem};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }
}

// Re-export math library at crate root
pub use glam;
