//! Fixtures shared by the resource unit tests

use std::io::Cursor;
use std::sync::Arc;
use crate::file_system::MemoryFileSystem;
use crate::renderer::{Renderer, RendererDesc};
use crate::resource::{ResourceManager, ResourceManagerConfig};

/// Define table used by every test renderer
pub const TEST_DEFINES: [&str; 4] = ["ALPHA_CUTOUT", "NORMAL_MAPPING", "SKINNED", "VEGETATION"];

pub fn test_renderer() -> Arc<Renderer> {
    Arc::new(
        Renderer::new(RendererDesc {
            shader_defines: TEST_DEFINES.iter().map(|d| d.to_string()).collect(),
        })
        .unwrap(),
    )
}

/// Resource manager reading inline from a memory file system
pub fn test_manager() -> (ResourceManager, Arc<MemoryFileSystem>) {
    let file_system = Arc::new(MemoryFileSystem::new());
    let rm = ResourceManager::new(
        test_renderer(),
        file_system.clone(),
        ResourceManagerConfig {
            loader_threads: 0,
            ..Default::default()
        },
    )
    .unwrap();
    (rm, file_system)
}

/// PNG encoding of a solid `width` x `height` image
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Shader with a normal map slot toggling NORMAL_MAPPING and three uniforms
pub const LIT_SHADER: &str = r#"{
    "render_states": ["cull_ccw", "depth_test", "depth_write", "alpha_test"],
    "defines": ["ALPHA_CUTOUT"],
    "texture_slots": [
        { "name": "Albedo", "uniform": "u_texColor" },
        { "name": "Normal", "uniform": "u_texNormal", "define": "NORMAL_MAPPING" }
    ],
    "uniforms": [
        { "name": "u_roughness", "type": "float" },
        { "name": "u_tint", "type": "color" },
        { "name": "u_time", "type": "time" }
    ]
}"#;
