/// Renderer module - backend-facing registries and the material command stream

pub mod renderer;
pub mod render_state;
pub mod command_buffer;

pub use renderer::*;
pub use render_state::*;
pub use command_buffer::*;
