//! Object-binding state kinds: current program, buffer per target, texture
//! per target. Snapshots are bare object names.

use anyhow::{Context, Result};

use crate::gl::Gl;

use super::{StateKind, StateStack};

/// Program installed by `glUseProgram`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ProgramBinding {
    pub id: u32,
}

impl StateKind for ProgramBinding {
    type Snapshot = u32;
    const NAME: &'static str = "program";

    #[inline]
    fn snapshot(&self) -> u32 {
        self.id
    }

    #[inline]
    fn restore(&mut self, id: &u32) {
        self.id = *id;
    }

    fn commit(&mut self, gl: &dyn Gl) {
        gl.use_program(self.id);
    }
}

impl StateStack<ProgramBinding> {
    pub fn bind(&mut self, program: u32) {
        self.apply_with(|p| p.id = program);
    }
}

/// Buffer bound to one target (`ARRAY_BUFFER`, `ELEMENT_ARRAY_BUFFER`,
/// `UNIFORM_BUFFER`, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferBinding {
    target: u32,
    pub id: u32,
}

impl BufferBinding {
    #[inline]
    pub const fn new(target: u32) -> Self {
        Self { target, id: 0 }
    }

    #[inline]
    pub fn target(&self) -> u32 {
        self.target
    }
}

impl StateKind for BufferBinding {
    type Snapshot = u32;
    const NAME: &'static str = "buffer";

    #[inline]
    fn snapshot(&self) -> u32 {
        self.id
    }

    #[inline]
    fn restore(&mut self, id: &u32) {
        self.id = *id;
    }

    fn commit(&mut self, gl: &dyn Gl) {
        gl.bind_buffer(self.target, self.id);
    }
}

impl StateStack<BufferBinding> {
    pub fn bind(&mut self, buffer: u32) {
        self.apply_with(|b| b.id = buffer);
    }

    /// Creates a buffer object. The binding is not changed.
    pub fn create(&self) -> Result<u32> {
        self.gl()
            .create_buffer()
            .map_err(anyhow::Error::msg)
            .context("failed to create buffer object")
    }

    /// Deletes a buffer object; GL unbinds it if it is current, so the mirror
    /// follows.
    pub fn delete(&mut self, buffer: u32) {
        self.gl().delete_buffer(buffer);
        if self.current().id == buffer {
            self.current_mut().id = 0;
        }
    }
}

/// Texture bound to one target of the active texture unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    target: u32,
    pub id: u32,
}

impl TextureBinding {
    #[inline]
    pub const fn new(target: u32) -> Self {
        Self { target, id: 0 }
    }

    #[inline]
    pub fn target(&self) -> u32 {
        self.target
    }
}

impl StateKind for TextureBinding {
    type Snapshot = u32;
    const NAME: &'static str = "texture";

    #[inline]
    fn snapshot(&self) -> u32 {
        self.id
    }

    #[inline]
    fn restore(&mut self, id: &u32) {
        self.id = *id;
    }

    fn commit(&mut self, gl: &dyn Gl) {
        gl.bind_texture(self.target, self.id);
    }
}

impl StateStack<TextureBinding> {
    pub fn bind(&mut self, texture: u32) {
        self.apply_with(|t| t.id = texture);
    }

    pub fn create(&self) -> Result<u32> {
        self.gl()
            .create_texture()
            .map_err(anyhow::Error::msg)
            .context("failed to create texture object")
    }

    pub fn delete(&mut self, texture: u32) {
        self.gl().delete_texture(texture);
        if self.current().id == texture {
            self.current_mut().id = 0;
        }
    }
}
