/// Material command stream
///
/// A command buffer is a flat byte sequence of typed operations that bind
/// uniforms and textures before a draw. Each command is an opcode byte
/// followed by a fixed-size payload in native byte order. The stream is
/// always terminated by [`CommandType::End`].
///
/// Buffers are produced whole by a [`CommandBufferGenerator`] and are never
/// patched in place. Values are embedded by value, so the length of a buffer
/// depends only on which commands it holds.

use bytemuck::Pod;
use glam::{Mat4, Vec4};
use crate::error::{Error, Result};
use crate::renderer::{TextureHandle, UniformHandle};

// ============================================================================
// Opcodes
// ============================================================================

/// Command opcode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    End = 0,
    SetUniform = 1,
    SetTimeUniform = 2,
    SetTexture = 3,
    SetUniformMatrix = 4,
}

impl CommandType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::End),
            1 => Some(Self::SetUniform),
            2 => Some(Self::SetTimeUniform),
            3 => Some(Self::SetTexture),
            4 => Some(Self::SetUniformMatrix),
            _ => None,
        }
    }
}

/// Decoded command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Set a 4-float uniform
    SetUniform { uniform: UniformHandle, value: Vec4 },
    /// Set a uniform to the frame time, resolved by the consumer
    SetTimeUniform { uniform: UniformHandle },
    /// Bind a texture to a slot
    SetTexture { slot: u8, uniform: UniformHandle, texture: TextureHandle },
    /// Set a 4x4 matrix uniform (column-major)
    SetUniformMatrix { uniform: UniformHandle, value: Mat4 },
    /// End of stream
    End,
}

// ============================================================================
// Generator
// ============================================================================

/// Serializes commands into a byte buffer
///
/// # Example
///
/// ```ignore
/// let mut generator = CommandBufferGenerator::new();
/// generator.set_uniform(handle, Vec4::new(1.0, 0.0, 0.0, 4.0));
/// generator.end();
/// let mut buffer = vec![0u8; generator.size()];
/// generator.data(&mut buffer)?;
/// ```
#[derive(Debug, Default)]
pub struct CommandBufferGenerator {
    buffer: Vec<u8>,
}

impl CommandBufferGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push<T: Pod>(&mut self, value: T) {
        self.buffer.extend_from_slice(bytemuck::bytes_of(&value));
    }

    /// Set a 4-float uniform
    pub fn set_uniform(&mut self, uniform: UniformHandle, value: Vec4) {
        self.buffer.push(CommandType::SetUniform as u8);
        self.push(uniform.0);
        self.push(value.to_array());
    }

    /// Set a uniform to the frame time at consumption
    pub fn set_time_uniform(&mut self, uniform: UniformHandle) {
        self.buffer.push(CommandType::SetTimeUniform as u8);
        self.push(uniform.0);
    }

    /// Bind `texture` to `slot` through `uniform`
    pub fn set_texture(&mut self, slot: u8, uniform: UniformHandle, texture: TextureHandle) {
        self.buffer.push(CommandType::SetTexture as u8);
        self.buffer.push(slot);
        self.push(uniform.0);
        self.push(texture.0);
    }

    /// Set a 4x4 matrix uniform
    pub fn set_uniform_matrix(&mut self, uniform: UniformHandle, value: &Mat4) {
        self.buffer.push(CommandType::SetUniformMatrix as u8);
        self.push(uniform.0);
        self.push(value.to_cols_array());
    }

    /// Terminate the stream
    pub fn end(&mut self) {
        self.buffer.push(CommandType::End as u8);
    }

    /// Number of bytes written so far
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Copy the stream into `out`, which must be exactly [`size`](Self::size) bytes
    pub fn data(&self, out: &mut [u8]) -> Result<()> {
        if out.len() != self.buffer.len() {
            return Err(Error::InvalidResource(format!(
                "Command buffer needs {} bytes, got {}",
                self.buffer.len(),
                out.len()
            )));
        }
        out.copy_from_slice(&self.buffer);
        Ok(())
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Iterates over the commands of a buffer
///
/// Stops after [`Command::End`]. Truncated or unknown data yields an error
/// and ends the iteration.
pub struct CommandBufferReader<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> CommandBufferReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0, done: false }
    }

    fn take<T: Pod>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.data
            .get(self.offset..self.offset + size)
            .ok_or_else(|| Error::InvalidResource(format!("Command buffer truncated at byte {}", self.offset)))?;
        self.offset += size;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    fn read_command(&mut self) -> Result<Command> {
        let opcode: u8 = self.take()?;
        let command_type = CommandType::from_u8(opcode)
            .ok_or_else(|| Error::InvalidResource(format!("Unknown command opcode {}", opcode)))?;

        Ok(match command_type {
            CommandType::End => Command::End,
            CommandType::SetUniform => {
                let uniform = UniformHandle(self.take()?);
                let value: [f32; 4] = self.take()?;
                Command::SetUniform { uniform, value: Vec4::from_array(value) }
            }
            CommandType::SetTimeUniform => Command::SetTimeUniform { uniform: UniformHandle(self.take()?) },
            CommandType::SetTexture => {
                let slot = self.take()?;
                let uniform = UniformHandle(self.take()?);
                let texture = TextureHandle(self.take()?);
                Command::SetTexture { slot, uniform, texture }
            }
            CommandType::SetUniformMatrix => {
                let uniform = UniformHandle(self.take()?);
                let value: [f32; 16] = self.take()?;
                Command::SetUniformMatrix { uniform, value: Mat4::from_cols_array(&value) }
            }
        })
    }
}

impl Iterator for CommandBufferReader<'_> {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }
        let command = self.read_command();
        if matches!(command, Ok(Command::End) | Err(_)) {
            self.done = true;
        }
        Some(command)
    }
}

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
